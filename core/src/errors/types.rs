//! Validation, invitation and verification error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ob_shared::errors::error_codes;
use ob_shared::utils::PasswordPolicyReport;

/// Validation errors raised before any storage call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Field required: {field}")]
    RequiredField { field: String },

    #[error("Invalid format for field: {field}")]
    InvalidFormat { field: String },

    #[error("Value out of range for field: {field} (min: {min}, max: {max})")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid invitation status: {status}")]
    InvalidStatus { status: String },

    #[error("Lifetime must be positive for {field}, got {value}")]
    InvalidTtl { field: String, value: i64 },

    #[error("No {field} on file for this account")]
    MissingContact { field: String },

    /// Password fails one or more strength rules; each flag names a failed rule
    #[error("Password does not meet the strength policy")]
    WeakPassword {
        too_short: bool,
        missing_lower: bool,
        missing_upper: bool,
        missing_digit: bool,
        missing_symbol: bool,
    },
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::WeakPassword { .. } => error_codes::WEAK_PASSWORD,
            _ => error_codes::VALIDATION_ERROR,
        }
    }
}

impl From<PasswordPolicyReport> for ValidationError {
    fn from(report: PasswordPolicyReport) -> Self {
        ValidationError::WeakPassword {
            too_short: report.too_short,
            missing_lower: report.missing_lower,
            missing_upper: report.missing_upper,
            missing_digit: report.missing_digit,
            missing_symbol: report.missing_symbol,
        }
    }
}

/// Invitation redemption failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvitationError {
    /// Covers unknown tokens, expired, revoked and already accepted
    /// invitations, and lost redemption races alike
    #[error("Invitation not found or expired")]
    NotFoundOrExpired,

    #[error("A user with this email already exists")]
    UserExists,

    #[error("Failed to create user from invitation")]
    UserCreationFailed,
}

impl InvitationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            InvitationError::NotFoundOrExpired => error_codes::INVITATION_NOT_FOUND_OR_EXPIRED,
            InvitationError::UserExists => error_codes::USER_EXISTS,
            InvitationError::UserCreationFailed => error_codes::INTERNAL_ERROR,
        }
    }
}

/// Response codes for rejected issue/confirm calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationErrorCode {
    CodeInvalid,
    CodeExpired,
    TooManyAttempts,
    RateLimited,
}

impl VerificationErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationErrorCode::CodeInvalid => error_codes::CODE_INVALID,
            VerificationErrorCode::CodeExpired => error_codes::CODE_EXPIRED,
            VerificationErrorCode::TooManyAttempts => error_codes::TOO_MANY_ATTEMPTS,
            VerificationErrorCode::RateLimited => error_codes::RATE_LIMITED,
        }
    }

    /// Human-readable message shown to the end user
    pub fn message(&self) -> &'static str {
        match self {
            VerificationErrorCode::CodeInvalid => {
                "Verification token or code is invalid or already used"
            }
            VerificationErrorCode::CodeExpired => "Verification token or code expired",
            VerificationErrorCode::TooManyAttempts => "Maximum verification attempts exceeded",
            VerificationErrorCode::RateLimited => {
                "Too many verification requests in the last hour"
            }
        }
    }
}

impl std::fmt::Display for VerificationErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Types for verification service results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::verification_code::VerificationKind;
use crate::errors::VerificationErrorCode;

/// Result of an issue request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IssueOutcome {
    Issued(IssueReceipt),
    /// The channel was already verified; nothing was issued
    AlreadyVerified { kind: VerificationKind },
    /// The hourly issuance limit was reached; nothing was issued
    RateLimited,
}

impl IssueOutcome {
    /// Response code for a refused issuance
    pub fn error_code(&self) -> Option<VerificationErrorCode> {
        match self {
            IssueOutcome::RateLimited => Some(VerificationErrorCode::RateLimited),
            _ => None,
        }
    }
}

/// Details of a freshly issued code
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueReceipt {
    pub kind: VerificationKind,
    pub expires_at: DateTime<Utc>,
    /// Plaintext SMS code, only in dev mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_code: Option<String>,
    /// Verification link, only in dev mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_verify_url: Option<String>,
}

impl std::fmt::Debug for IssueReceipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueReceipt")
            .field("kind", &self.kind)
            .field("expires_at", &self.expires_at)
            .field("dev_code", &self.dev_code.as_ref().map(|_| "<redacted>"))
            .field("dev_verify_url", &self.dev_verify_url.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Result of a confirm request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConfirmOutcome {
    Verified { kind: VerificationKind },
    AlreadyVerified { kind: VerificationKind },
    Rejected(Rejection),
}

/// Why a confirmation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub code: VerificationErrorCode,
    /// Attempt counter after this call, when a record was evaluated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

impl Rejection {
    pub fn new(code: VerificationErrorCode) -> Self {
        Self {
            code,
            attempts: None,
            max_attempts: None,
        }
    }

    pub fn with_attempts(code: VerificationErrorCode, attempts: u32, max_attempts: u32) -> Self {
        Self {
            code,
            attempts: Some(attempts),
            max_attempts: Some(max_attempts),
        }
    }

    pub fn message(&self) -> &'static str {
        self.code.message()
    }
}

/// Channels a guarded action needs verified
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerificationRequirements {
    pub email: bool,
    pub phone: bool,
}

/// Verified flags for an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStatus {
    pub email_verified: bool,
    pub phone_verified: bool,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub phone_verified_at: Option<DateTime<Utc>>,
}

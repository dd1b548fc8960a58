//! Domain-specific error types and error handling.

mod types;


// Re-export all error types and utilities
pub use types::{InvitationError, ValidationError, VerificationErrorCode};

use ob_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};
use thiserror::Error;

use crate::domain::entities::verification_code::VerificationKind;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Forbidden: {action} requires an administrator membership")]
    Forbidden { action: String },

    #[error("Verification required by policy for this action: {kind}")]
    VerificationRequired { kind: VerificationKind },

    /// Storage failure; the message is for logs, never for callers
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Failed to deliver {channel} message: {message}")]
    Delivery { channel: VerificationKind, message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Invitation(#[from] InvitationError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Stable machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::NotFound { .. } => error_codes::NOT_FOUND,
            DomainError::Unauthorized => error_codes::UNAUTHORIZED,
            DomainError::Forbidden { .. } => error_codes::FORBIDDEN,
            DomainError::VerificationRequired { kind } => match kind {
                VerificationKind::Email => error_codes::VERIFICATION_REQUIRED_EMAIL,
                VerificationKind::Phone => error_codes::VERIFICATION_REQUIRED_PHONE,
            },
            DomainError::Storage { .. } => error_codes::DATABASE_ERROR,
            DomainError::Delivery { .. } => error_codes::DELIVERY_ERROR,
            DomainError::Internal { .. } => error_codes::INTERNAL_ERROR,
            DomainError::Validation(err) => err.error_code(),
            DomainError::Invitation(err) => err.error_code(),
        }
    }

    /// Shorthand used by storage adapters
    pub fn storage(message: impl Into<String>) -> Self {
        DomainError::Storage {
            message: message.into(),
        }
    }
}

impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        let message = match self {
            DomainError::Storage { .. } | DomainError::Internal { .. } => {
                "An internal error occurred".to_string()
            }
            DomainError::Delivery { channel, .. } => {
                format!("Failed to send {} verification", channel)
            }
            DomainError::VerificationRequired { .. } => {
                "Verification required by policy for this action".to_string()
            }
            other => other.to_string(),
        };
        let response = ErrorResponse::new(self.error_code(), message);
        match self {
            DomainError::Validation(ValidationError::WeakPassword {
                too_short,
                missing_lower,
                missing_upper,
                missing_digit,
                missing_symbol,
            }) => response
                .add_detail("too_short", too_short)
                .add_detail("missing_lower", missing_lower)
                .add_detail("missing_upper", missing_upper)
                .add_detail("missing_digit", missing_digit)
                .add_detail("missing_symbol", missing_symbol),
            _ => response,
        }
    }
}

//! Shared error types and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard error response structure returned to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for client identification
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error details (attempt counters, field names, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a detail field to the error response
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Common error codes used across the application
pub mod error_codes {
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const FORBIDDEN: &str = "forbidden";
    pub const NOT_FOUND: &str = "not_found";
    pub const INTERNAL_ERROR: &str = "internal_error";
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const WEAK_PASSWORD: &str = "weak_password";
    pub const DATABASE_ERROR: &str = "database_error";
    pub const DELIVERY_ERROR: &str = "delivery_error";

    // Verification responses
    pub const CODE_INVALID: &str = "code_invalid";
    pub const CODE_EXPIRED: &str = "code_expired";
    pub const TOO_MANY_ATTEMPTS: &str = "too_many_attempts";
    pub const RATE_LIMITED: &str = "rate_limited";
    pub const VERIFICATION_REQUIRED_EMAIL: &str = "verification_required_email";
    pub const VERIFICATION_REQUIRED_PHONE: &str = "verification_required_phone";

    // Invitation responses
    pub const INVITATION_NOT_FOUND_OR_EXPIRED: &str = "invitation_not_found_or_expired";
    pub const USER_EXISTS: &str = "user_exists";
}

/// Trait for converting errors to ErrorResponse
pub trait IntoErrorResponse {
    fn to_error_response(&self) -> ErrorResponse;
}

/// Result type with ErrorResponse as error
pub type ApiResult<T> = Result<T, ErrorResponse>;

//! Configuration for the verification service

use ob_shared::config::verification::{
    VerificationConfig, DEFAULT_APP_URL, DEFAULT_EMAIL_TTL_MINUTES, DEFAULT_PHONE_MAX_ATTEMPTS,
    DEFAULT_PHONE_TTL_MINUTES, DEFAULT_REQUESTS_PER_HOUR,
};

use crate::errors::ValidationError;

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Minutes before an email link expires
    pub email_ttl_minutes: i64,
    /// Minutes before an SMS code expires
    pub phone_ttl_minutes: i64,
    /// Issuances allowed per user and channel in the trailing hour
    pub requests_per_hour: u32,
    /// Wrong guesses allowed on an SMS code
    pub phone_max_attempts: u32,
    /// Echo the plaintext secret back in the issue receipt
    pub dev_mode: bool,
    /// Send every verification email here instead of the account address
    pub email_override: Option<String>,
    /// Base URL for verification links, without trailing slash
    pub app_url: String,
    pub require_email_verified: bool,
    pub require_phone_verified: bool,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            email_ttl_minutes: DEFAULT_EMAIL_TTL_MINUTES,
            phone_ttl_minutes: DEFAULT_PHONE_TTL_MINUTES,
            requests_per_hour: DEFAULT_REQUESTS_PER_HOUR,
            phone_max_attempts: DEFAULT_PHONE_MAX_ATTEMPTS,
            dev_mode: false,
            email_override: None,
            app_url: DEFAULT_APP_URL.to_string(),
            require_email_verified: false,
            require_phone_verified: false,
        }
    }
}

impl From<&VerificationConfig> for VerificationServiceConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            email_ttl_minutes: config.email_ttl_minutes,
            phone_ttl_minutes: config.phone_ttl_minutes,
            requests_per_hour: config.requests_per_hour,
            phone_max_attempts: config.phone_max_attempts,
            dev_mode: config.dev_mode,
            email_override: config.email_override.clone(),
            app_url: config.app_url.clone(),
            require_email_verified: config.require_email_verified,
            require_phone_verified: config.require_phone_verified,
        }
    }
}

impl VerificationServiceConfig {
    /// Reject lifetimes and limits that would make every code dead on arrival
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email_ttl_minutes <= 0 {
            return Err(ValidationError::InvalidTtl {
                field: "email_ttl_minutes".to_string(),
                value: self.email_ttl_minutes,
            });
        }
        if self.phone_ttl_minutes <= 0 {
            return Err(ValidationError::InvalidTtl {
                field: "phone_ttl_minutes".to_string(),
                value: self.phone_ttl_minutes,
            });
        }
        if self.phone_max_attempts == 0 {
            return Err(ValidationError::OutOfRange {
                field: "phone_max_attempts".to_string(),
                min: "1".to_string(),
                max: u32::MAX.to_string(),
            });
        }
        Ok(())
    }
}

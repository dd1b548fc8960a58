//! Verification and invitation lifecycle configuration
//!
//! Numeric options only accept positive integers. Anything else (missing,
//! unparsable, zero or negative) silently falls back to the default so a bad
//! deployment value never disables expiry or rate limiting.

use serde::{Deserialize, Serialize};

pub const DEFAULT_EMAIL_TTL_MINUTES: i64 = 60;
pub const DEFAULT_PHONE_TTL_MINUTES: i64 = 10;
pub const DEFAULT_REQUESTS_PER_HOUR: u32 = 5;
pub const DEFAULT_PHONE_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_INVITATION_TTL_HOURS: i64 = 72;
pub const DEFAULT_APP_URL: &str = "http://localhost:3000";

/// Settings shared by the verification and invitation services
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Lifetime of an email verification link in minutes
    pub email_ttl_minutes: i64,

    /// Lifetime of an SMS code in minutes
    pub phone_ttl_minutes: i64,

    /// Issuances allowed per user and channel in one trailing hour
    pub requests_per_hour: u32,

    /// Failed guesses allowed on a phone code
    pub phone_max_attempts: u32,

    /// Echo plaintext secrets back to the caller instead of relying on delivery
    #[serde(default)]
    pub dev_mode: bool,

    /// Redirect every verification email to this address
    #[serde(default)]
    pub email_override: Option<String>,

    /// Base URL used to build verification and registration links
    pub app_url: String,

    /// Guard sensitive actions behind a verified email
    #[serde(default)]
    pub require_email_verified: bool,

    /// Guard sensitive actions behind a verified phone
    #[serde(default)]
    pub require_phone_verified: bool,

    /// Default invitation lifetime in hours
    pub invitation_ttl_hours: i64,
}

impl Default for VerificationConfig {
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
            invitation_ttl_hours: DEFAULT_INVITATION_TTL_HOURS,
        }
    }
}

impl VerificationConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests pass a map-backed closure instead of
    /// mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            email_ttl_minutes: positive_or(
                lookup("EMAIL_VERIFICATION_TTL_MIN"),
                defaults.email_ttl_minutes,
            ),
            phone_ttl_minutes: positive_or(
                lookup("PHONE_VERIFICATION_TTL_MIN"),
                defaults.phone_ttl_minutes,
            ),
            requests_per_hour: positive_or(
                lookup("VERIFICATION_REQUEST_RATE_LIMIT_PER_HOUR"),
                defaults.requests_per_hour,
            ),
            phone_max_attempts: positive_or(
                lookup("PHONE_VERIFICATION_MAX_ATTEMPTS"),
                defaults.phone_max_attempts,
            ),
            dev_mode: flag(lookup("VERIFICATION_DEV_MODE")),
            email_override: lookup("VERIFICATION_EMAIL_OVERRIDE")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            app_url: lookup("APP_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.app_url),
            require_email_verified: flag(lookup("REQUIRE_VERIFIED_EMAIL")),
            require_phone_verified: flag(lookup("REQUIRE_VERIFIED_PHONE")),
            invitation_ttl_hours: positive_or(
                lookup("INVITATION_EXPIRATION_HOURS"),
                defaults.invitation_ttl_hours,
            ),
        }
    }

    /// Enable dev mode (plaintext echo)
    pub fn with_dev_mode(mut self, enabled: bool) -> Self {
        self.dev_mode = enabled;
        self
    }
}

fn positive_or<T>(raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + PartialOrd + Default,
{
    raw.and_then(|v| v.trim().parse::<T>().ok())
        .filter(|v| *v > T::default())
        .unwrap_or(default)
}

fn flag(raw: Option<String>) -> bool {
    raw.map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

//! Outbound delivery configuration (email and SMS providers)

use serde::{Deserialize, Serialize};

/// Email provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    Resend,
    Mock,
}

/// SMS provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsProvider {
    Twilio,
    Mock,
}

/// Credentials and provider choice for email and SMS delivery
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryConfig {
    pub email_provider: EmailProvider,
    /// Resend API key
    #[serde(default)]
    pub resend_api_key: Option<String>,
    /// Sender address for every outbound email
    pub from_email: String,

    pub sms_provider: SmsProvider,
    #[serde(default)]
    pub twilio_account_sid: Option<String>,
    #[serde(default)]
    pub twilio_auth_token: Option<String>,
    /// Twilio sender number, E.164
    #[serde(default)]
    pub twilio_from_number: Option<String>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            email_provider: EmailProvider::Mock,
            resend_api_key: None,
            from_email: String::from("Onboarding <no-reply@example.com>"),
            sms_provider: SmsProvider::Mock,
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_from_number: None,
        }
    }
}

impl DeliveryConfig {
    /// Create from environment variables.
    ///
    /// A provider is only selected when its credentials are present; the
    /// explicit `EMAIL_PROVIDER` / `SMS_PROVIDER` variables can force `mock`.
    pub fn from_env() -> Self {
        let var = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let resend_api_key = var("RESEND_API_KEY");
        let email_provider = match var("EMAIL_PROVIDER").as_deref() {
            Some("mock") => EmailProvider::Mock,
            Some("resend") => EmailProvider::Resend,
            _ if resend_api_key.is_some() => EmailProvider::Resend,
            _ => EmailProvider::Mock,
        };

        let twilio_account_sid = var("TWILIO_ACCOUNT_SID");
        let sms_provider = match var("SMS_PROVIDER").as_deref() {
            Some("mock") => SmsProvider::Mock,
            Some("twilio") => SmsProvider::Twilio,
            _ if twilio_account_sid.is_some() => SmsProvider::Twilio,
            _ => SmsProvider::Mock,
        };

        Self {
            email_provider,
            resend_api_key,
            from_email: var("RESEND_FROM_EMAIL").unwrap_or(defaults.from_email),
            sms_provider,
            twilio_account_sid,
            twilio_auth_token: var("TWILIO_AUTH_TOKEN"),
            twilio_from_number: var("TWILIO_FROM_NUMBER"),
        }
    }
}

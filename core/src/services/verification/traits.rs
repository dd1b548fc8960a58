//! Traits for outbound email and SMS delivery

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A rendered email ready to hand to a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Trait for email service integration
#[async_trait]
pub trait EmailServiceTrait: Send + Sync {
    /// Send an email, returning the provider message ID
    async fn send_email(&self, message: &EmailMessage) -> Result<String, String>;
}

/// Trait for SMS service integration
#[async_trait]
pub trait SmsServiceTrait: Send + Sync {
    /// Send a text message, returning the provider message ID
    async fn send_sms(&self, phone: &str, message: &str) -> Result<String, String>;
    /// Check if the phone number format is valid
    fn is_valid_phone_number(&self, phone: &str) -> bool;
}

//! Twilio SMS Service Implementation
//!
//! Sends verification codes through the Twilio Messages API with
//! exponential backoff on rate limits and server errors.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use twilio::{Client, OutboundMessage};

use ob_core::services::verification::SmsServiceTrait;
use ob_shared::config::DeliveryConfig;

use super::sms_service::{check_message_length, is_valid_phone_number, mask_phone_number, to_e164};
use crate::InfrastructureError;

/// Twilio SMS service configuration
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number, must be a Twilio number in E.164
    pub from_number: String,
    pub max_retries: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
}

impl TwilioConfig {
    /// Build from the delivery settings, failing when a credential is absent
    pub fn from_delivery(config: &DeliveryConfig) -> Result<Self, InfrastructureError> {
        let required = |value: &Option<String>, name: &str| {
            value
                .clone()
                .ok_or_else(|| InfrastructureError::Config(format!("{} not set", name)))
        };

        let twilio = Self {
            account_sid: required(&config.twilio_account_sid, "TWILIO_ACCOUNT_SID")?,
            auth_token: required(&config.twilio_auth_token, "TWILIO_AUTH_TOKEN")?,
            from_number: required(&config.twilio_from_number, "TWILIO_FROM_NUMBER")?,
            max_retries: env_or("TWILIO_MAX_RETRIES", 3),
            retry_delay_ms: env_or("TWILIO_RETRY_DELAY_MS", 1000),
        };
        twilio.validate()?;
        Ok(twilio)
    }

    fn validate(&self) -> Result<(), InfrastructureError> {
        if !self.from_number.starts_with('+') {
            return Err(InfrastructureError::Config(
                "TWILIO_FROM_NUMBER must be in E.164 format (starting with '+')".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(InfrastructureError::Config(
                "TWILIO_MAX_RETRIES must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Whether a provider failure is worth another attempt
pub(crate) fn is_retryable(error_message: &str) -> bool {
    let message = error_message.to_lowercase();
    if message.contains("400") || message.contains("invalid") {
        return false;
    }
    ["429", "rate", "500", "502", "503", "504", "timed out", "timeout"]
        .iter()
        .any(|marker| message.contains(marker))
}

/// Twilio SMS service implementation
pub struct TwilioSmsService {
    client: Client,
    config: TwilioConfig,
}

impl TwilioSmsService {
    pub fn new(config: TwilioConfig) -> Result<Self, InfrastructureError> {
        config.validate()?;
        let client = Client::new(&config.account_sid, &config.auth_token);

        info!(
            "Twilio SMS service initialized with from number: {}",
            mask_phone_number(&config.from_number)
        );

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &TwilioConfig {
        &self.config
    }

    async fn send_with_retry(&self, to: &str, message: &str) -> Result<String, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = Duration::from_millis(self.config.retry_delay_ms);

        loop {
            attempts += 1;
            debug!(
                "Sending SMS attempt {}/{} to {}",
                attempts,
                self.config.max_retries,
                mask_phone_number(to)
            );

            let msg = OutboundMessage::new(&self.config.from_number, to, message);
            match self.client.send_message(msg).await {
                Ok(response) => {
                    info!(
                        provider = "twilio",
                        phone = %mask_phone_number(to),
                        message_id = %response.sid,
                        attempts,
                        "SMS sent successfully"
                    );
                    return Ok(response.sid);
                }
                Err(e) => {
                    let error_msg = e.to_string();
                    error!(
                        "Failed to send SMS (attempt {}/{}): {}",
                        attempts, self.config.max_retries, error_msg
                    );

                    if !is_retryable(&error_msg) {
                        return Err(InfrastructureError::Sms(format!(
                            "Twilio rejected request: {}",
                            error_msg
                        )));
                    }
                    if attempts >= self.config.max_retries {
                        return Err(InfrastructureError::Sms(format!(
                            "Failed to send SMS after {} attempts: {}",
                            attempts, error_msg
                        )));
                    }

                    warn!("Retryable Twilio error, backing off for {:?}", delay);
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }
}

#[async_trait]
impl SmsServiceTrait for TwilioSmsService {
    async fn send_sms(&self, phone: &str, message: &str) -> Result<String, String> {
        let normalized = to_e164(phone).map_err(|e| e.to_string())?;
        check_message_length(message).map_err(|e| e.to_string())?;

        info!(
            "Sending SMS to {} via Twilio (message length: {} chars)",
            mask_phone_number(&normalized),
            message.len()
        );

        self.send_with_retry(&normalized, message)
            .await
            .map_err(|e| e.to_string())
    }

    fn is_valid_phone_number(&self, phone: &str) -> bool {
        is_valid_phone_number(phone)
    }
}

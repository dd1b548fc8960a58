//! SMS Service Module
//!
//! Implementations of the core `SmsServiceTrait`: Twilio for production
//! delivery and a logging mock for development.

use std::sync::Arc;

use ob_core::services::verification::SmsServiceTrait;
use ob_shared::config::{DeliveryConfig, SmsProvider};

pub mod mock_sms;
pub mod sms_service;

// Twilio SMS service (feature-gated)
#[cfg(feature = "twilio-sms")]
pub mod twilio;

pub use mock_sms::MockSmsService;
pub use sms_service::{is_valid_phone_number, mask_phone_number, to_e164};

#[cfg(feature = "twilio-sms")]
pub use twilio::{TwilioConfig, TwilioSmsService};

#[cfg(test)]
mod tests;

/// Create an SMS service based on configuration
///
/// Falls back to the mock implementation when the selected provider cannot
/// be initialized.
pub fn create_sms_service(config: &DeliveryConfig) -> Arc<dyn SmsServiceTrait> {
    match config.sms_provider {
        SmsProvider::Mock => Arc::new(MockSmsService::new()),
        #[cfg(feature = "twilio-sms")]
        SmsProvider::Twilio => {
            match TwilioConfig::from_delivery(config).and_then(TwilioSmsService::new) {
                Ok(service) => Arc::new(service),
                Err(e) => {
                    tracing::error!("Failed to initialize Twilio SMS service: {}", e);
                    tracing::warn!("Falling back to mock SMS service");
                    Arc::new(MockSmsService::new())
                }
            }
        }
        #[cfg(not(feature = "twilio-sms"))]
        SmsProvider::Twilio => {
            tracing::warn!("Twilio requested but the twilio-sms feature is disabled, using mock");
            Arc::new(MockSmsService::new())
        }
    }
}

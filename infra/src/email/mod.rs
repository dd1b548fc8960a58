//! Email delivery
//!
//! Implementations of the core `EmailServiceTrait`: Resend over HTTPS for
//! production and a logging mock for development.

use std::sync::Arc;

use ob_core::services::verification::EmailServiceTrait;
use ob_shared::config::{DeliveryConfig, EmailProvider};

pub mod mock_email;
pub mod resend;

pub use mock_email::MockEmailService;
pub use resend::{ResendConfig, ResendEmailService};


/// Create an email service based on configuration
///
/// Falls back to the mock implementation when Resend is selected without
/// an API key.
pub fn create_email_service(config: &DeliveryConfig) -> Arc<dyn EmailServiceTrait> {
    match config.email_provider {
        EmailProvider::Mock => Arc::new(MockEmailService::new()),
        EmailProvider::Resend => match ResendConfig::from_delivery(config)
            .and_then(ResendEmailService::new)
        {
            Ok(service) => Arc::new(service),
            Err(e) => {
                tracing::error!("Failed to initialize Resend email service: {}", e);
                tracing::warn!("Falling back to mock email service");
                Arc::new(MockEmailService::new())
            }
        },
    }
}

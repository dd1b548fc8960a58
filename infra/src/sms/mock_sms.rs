//! Mock SMS Service Implementation
//!
//! Logs text messages instead of sending them. Used in development and
//! whenever no SMS provider is configured.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use ob_core::services::verification::SmsServiceTrait;

use super::sms_service::{check_message_length, is_valid_phone_number, mask_phone_number};
use crate::InfrastructureError;

/// Mock SMS service for development and testing
#[derive(Clone)]
pub struct MockSmsService {
    message_count: Arc<AtomicU64>,
    last_message: Arc<Mutex<Option<(String, String)>>>,
    simulate_failure: bool,
    console_output: bool,
}

impl MockSmsService {
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    /// Create a mock service with configurable options
    pub fn with_options(console_output: bool, simulate_failure: bool) -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
            last_message: Arc::new(Mutex::new(None)),
            simulate_failure,
            console_output,
        }
    }

    /// Get the total number of messages sent
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    pub fn reset_counter(&self) {
        self.message_count.store(0, Ordering::SeqCst);
    }

    /// Recipient and body of the most recent message
    pub fn last_message(&self) -> Option<(String, String)> {
        self.last_message.lock().ok().and_then(|m| m.clone())
    }

    pub fn set_simulate_failure(&mut self, simulate: bool) {
        self.simulate_failure = simulate;
    }

    async fn deliver(&self, phone: &str, message: &str) -> Result<String, InfrastructureError> {
        if !is_valid_phone_number(phone) {
            return Err(InfrastructureError::Sms(format!(
                "Invalid phone number format: {}",
                mask_phone_number(phone)
            )));
        }
        check_message_length(message)?;

        if self.simulate_failure {
            warn!(
                "Mock SMS service simulating failure for phone: {}",
                mask_phone_number(phone)
            );
            return Err(InfrastructureError::Sms(
                "Simulated SMS sending failure".to_string(),
            ));
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut last) = self.last_message.lock() {
            *last = Some((phone.to_string(), message.to_string()));
        }

        let masked_phone = mask_phone_number(phone);
        if self.console_output {
            // Full body on stdout so a developer can read the code
            println!("\n{}", "=".repeat(60));
            println!("MOCK SMS SERVICE - MESSAGE #{}", count);
            println!("To: {}", masked_phone);
            println!("Message ID: {}", message_id);
            println!("Content: {}", message);
            println!("{}\n", "=".repeat(60));
        }

        info!(
            target: "sms_service",
            provider = "mock",
            phone = %masked_phone,
            message_id = %message_id,
            message_length = message.len(),
            "SMS sent successfully (mock)"
        );

        Ok(message_id)
    }
}

impl Default for MockSmsService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SmsServiceTrait for MockSmsService {
    async fn send_sms(&self, phone: &str, message: &str) -> Result<String, String> {
        self.deliver(phone, message).await.map_err(|e| e.to_string())
    }

    fn is_valid_phone_number(&self, phone: &str) -> bool {
        is_valid_phone_number(phone)
    }
}

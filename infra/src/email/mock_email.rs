//! Mock email service that logs instead of sending

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

use ob_core::services::verification::{EmailMessage, EmailServiceTrait};
use ob_shared::utils::mask_email;

#[derive(Clone)]
pub struct MockEmailService {
    message_count: Arc<AtomicU64>,
    last_message: Arc<Mutex<Option<EmailMessage>>>,
    simulate_failure: bool,
    console_output: bool,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    pub fn with_options(console_output: bool, simulate_failure: bool) -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
            last_message: Arc::new(Mutex::new(None)),
            simulate_failure,
            console_output,
        }
    }

    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    pub fn last_message(&self) -> Option<EmailMessage> {
        self.last_message.lock().ok().and_then(|m| m.clone())
    }
}

impl Default for MockEmailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailServiceTrait for MockEmailService {
    async fn send_email(&self, message: &EmailMessage) -> Result<String, String> {
        let masked = mask_email(&message.to);

        if self.simulate_failure {
            warn!(to = %masked, "Mock email service simulating failure");
            return Err("Simulated email sending failure".to_string());
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut last) = self.last_message.lock() {
            *last = Some(message.clone());
        }

        if self.console_output {
            println!("\n{}", "=".repeat(60));
            println!("MOCK EMAIL SERVICE - MESSAGE #{}", count);
            println!("To: {}", masked);
            println!("Subject: {}", message.subject);
            println!("{}", message.text);
            println!("{}\n", "=".repeat(60));
        }

        info!(
            target: "email_service",
            provider = "mock",
            to = %masked,
            message_id = %message_id,
            "Email sent successfully (mock)"
        );
        Ok(message_id)
    }
}

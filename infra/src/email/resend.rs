//! Resend email provider

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use ob_core::services::verification::{EmailMessage, EmailServiceTrait};
use ob_shared::config::DeliveryConfig;
use ob_shared::utils::mask_email;

use crate::InfrastructureError;

pub const RESEND_API_URL: &str = "https://api.resend.com";

#[derive(Debug, Clone)]
pub struct ResendConfig {
    pub api_key: String,
    /// Sender, e.g. `Onboarding <no-reply@example.com>`
    pub from: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl ResendConfig {
    pub fn from_delivery(config: &DeliveryConfig) -> Result<Self, InfrastructureError> {
        let api_key = config
            .resend_api_key
            .clone()
            .ok_or_else(|| InfrastructureError::Config("RESEND_API_KEY not set".to_string()))?;

        Ok(Self {
            api_key,
            from: config.from_email.clone(),
            base_url: RESEND_API_URL.to_string(),
            request_timeout_secs: 15,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SendEmailBody<'a> {
    pub from: &'a str,
    pub to: [&'a str; 1],
    pub subject: &'a str,
    pub html: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

/// Sends through the Resend `/emails` endpoint
pub struct ResendEmailService {
    http: Client,
    config: ResendConfig,
}

impl ResendEmailService {
    pub fn new(config: ResendConfig) -> Result<Self, InfrastructureError> {
        if config.api_key.trim().is_empty() {
            return Err(InfrastructureError::Config(
                "RESEND_API_KEY must not be empty".to_string(),
            ));
        }
        if config.from.trim().is_empty() {
            return Err(InfrastructureError::Config(
                "RESEND_FROM_EMAIL must not be empty".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    pub(crate) fn body<'a>(&'a self, message: &'a EmailMessage) -> SendEmailBody<'a> {
        SendEmailBody {
            from: &self.config.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
            text: &message.text,
        }
    }

    async fn send(&self, message: &EmailMessage) -> Result<String, InfrastructureError> {
        let url = format!("{}/emails", self.config.base_url.trim_end_matches('/'));

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&self.body(message))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(InfrastructureError::Email(format!(
                "Resend request failed with status {}: {}",
                status, text
            )));
        }

        let parsed: SendEmailResponse = response.json().await?;
        Ok(parsed.id)
    }
}

#[async_trait]
impl EmailServiceTrait for ResendEmailService {
    async fn send_email(&self, message: &EmailMessage) -> Result<String, String> {
        match self.send(message).await {
            Ok(id) => {
                info!(
                    provider = "resend",
                    to = %mask_email(&message.to),
                    message_id = %id,
                    "Email sent"
                );
                Ok(id)
            }
            Err(e) => {
                error!(
                    provider = "resend",
                    to = %mask_email(&message.to),
                    error = %e,
                    "Email delivery failed"
                );
                Err(e.to_string())
            }
        }
    }
}

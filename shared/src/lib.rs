//! Shared configuration, error envelopes and helpers for the onboarding services
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration loaded once from the environment
//! - Error codes and the API error envelope
//! - Masking and normalization helpers for emails and phone numbers

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, DatabaseConfig, DeliveryConfig, EmailProvider, Environment, LogFormat,
    LoggingConfig, SmsProvider, VerificationConfig,
};
pub use errors::{error_codes, ApiResult, ErrorResponse, IntoErrorResponse};
pub use utils::{email, phone};

//! Verification service module for email and phone ownership checks
//!
//! This module provides the issue/confirm workflow for both channels:
//! - Secret generation, hashing and persistence (plaintext is never stored)
//! - Supersession of older codes so only the newest one can succeed
//! - Per-user hourly issuance limits
//! - Attempt counting and expiry on confirmation
//! - Delivery through pluggable email and SMS services

mod config;
mod service;
mod traits;
mod types;


pub use config::VerificationServiceConfig;
pub use service::VerificationService;
pub use traits::{EmailMessage, EmailServiceTrait, SmsServiceTrait};
pub use types::{
    ConfirmOutcome, IssueOutcome, IssueReceipt, Rejection, VerificationRequirements,
    VerificationStatus,
};

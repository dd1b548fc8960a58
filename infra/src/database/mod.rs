//! Database module - MySQL implementations using SQLx
//!
//! This module provides database access layer implementations including:
//! - Connection pool management
//! - Repository implementations for every core repository trait
//! - Transactions around the multi-row lifecycle steps

pub mod connection;
pub mod mysql;


// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{
    MySqlInvitationRepository, MySqlMembershipRepository, MySqlUserRepository,
    MySqlVerificationCodeRepository,
};

//! Invitation service module for admin-issued, single-use registration links
//!
//! Administrators issue invitations bound to a department and position.
//! Redeeming one creates the account and its membership in a single
//! atomic step; revocation and expiry close the invitation for good.

mod config;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::InvitationServiceConfig;
pub use service::InvitationService;
pub use traits::PasswordHasherTrait;
pub use types::{IssuedInvitation, InvitationRequest, RedeemRequest, RevokedInvitation};

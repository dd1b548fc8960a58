//! Invitation repository trait.
//!
//! State changes out of `pending` are conditional on the row still being
//! pending, which is what makes redemption and revocation race-safe.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::invitation::{Invitation, InvitationFilter, NewInvitation};
use crate::domain::entities::membership::NewMembership;
use crate::domain::entities::user::{NewUser, User};
use crate::errors::DomainError;

/// Everything written when an invitation is redeemed
#[derive(Debug, Clone)]
pub struct Redemption {
    pub invitation_id: Uuid,
    pub user: NewUser,
    pub membership: NewMembership,
    pub accepted_at: DateTime<Utc>,
}

/// Repository trait for invitation persistence
#[async_trait]
pub trait InvitationRepository: Send + Sync {
    /// Persist a new pending invitation
    async fn insert(&self, invitation: NewInvitation) -> Result<Invitation, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invitation>, DomainError>;

    /// Find an invitation by token hash that is pending and not past its
    /// deadline at `now`
    async fn find_pending_by_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Invitation>, DomainError>;

    /// Create the user and membership and accept the invitation as one unit.
    ///
    /// The accept step only applies while the invitation is still pending
    /// and unexpired at `accepted_at`; it also records the consuming user
    /// and clears the retained plaintext token.
    ///
    /// # Returns
    /// * `Ok(Some(User))` - All three writes committed
    /// * `Ok(None)` - The invitation was no longer pending; nothing was written
    /// * `Err(DomainError)` - Storage failure, or `InvitationError::UserExists`
    ///   when the email is already taken
    async fn redeem(&self, redemption: Redemption) -> Result<Option<User>, DomainError>;

    /// Move a pending invitation to revoked, clearing the plaintext token.
    ///
    /// # Returns
    /// * `Ok(Some(Invitation))` - The revoked invitation
    /// * `Ok(None)` - Not found or not pending
    async fn mark_revoked(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Invitation>, DomainError>;

    /// Invitations matching the filter, newest first
    async fn list(&self, filter: &InvitationFilter) -> Result<Vec<Invitation>, DomainError>;
}

//! Membership lookups used for admin authorization.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::membership::Membership;
use crate::errors::DomainError;

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// All memberships held by a user
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Membership>, DomainError>;
}

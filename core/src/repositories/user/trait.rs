//! User repository trait defining the read side of account persistence.
//!
//! Accounts are written by invitation redemption and verification
//! confirmation, both of which go through their own repositories so the
//! multi-row updates stay atomic.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Repository trait for User lookups
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with this ID
    /// * `Err(DomainError)` - Storage failure
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Find a user by email. Callers pass the lower-cased address.
    ///
    /// # Example
    /// ```no_run
    /// # use ob_core::repositories::UserRepository;
    /// # async fn example(repo: &impl UserRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// if repo.find_by_email("ada@example.com").await?.is_some() {
    ///     println!("account already provisioned");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
}

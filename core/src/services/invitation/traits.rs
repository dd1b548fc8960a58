//! Traits for invitation service collaborators

use async_trait::async_trait;

/// Trait for password hashing integration
#[async_trait]
pub trait PasswordHasherTrait: Send + Sync {
    /// Hash a plaintext password for storage
    async fn hash_password(&self, password: &str) -> Result<String, String>;
}

//! bcrypt-backed `PasswordHasherTrait`
//!
//! Hashing is CPU bound, so it runs on the blocking thread pool.

use async_trait::async_trait;

use ob_core::services::invitation::PasswordHasherTrait;

use crate::InfrastructureError;

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// Work factor used when none is configured
pub const DEFAULT_COST: u32 = 10;

#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Result<Self, InfrastructureError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(InfrastructureError::Config(format!(
                "bcrypt cost must be between {} and {}",
                MIN_COST,
                MAX_COST
            )));
        }
        Ok(Self { cost })
    }

    /// Reads `BCRYPT_COST`, defaulting to `DEFAULT_COST`
    pub fn from_env() -> Result<Self, InfrastructureError> {
        let cost = std::env::var("BCRYPT_COST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_COST);
        Self::new(cost)
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Check a password against a stored hash
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, InfrastructureError> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| InfrastructureError::General(format!("hashing task failed: {}", e)))?
            .map_err(|e| InfrastructureError::General(format!("bcrypt verify failed: {}", e)))
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self {
            cost: DEFAULT_COST,
        }
    }
}

#[async_trait]
impl PasswordHasherTrait for BcryptPasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, String> {
        let password = password.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| format!("hashing task failed: {}", e))?
            .map_err(|e| format!("bcrypt hash failed: {}", e))
    }
}

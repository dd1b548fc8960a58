//! MySQL implementation of the UserRepository trait.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use ob_core::domain::entities::user::User;
use ob_core::errors::DomainError;
use ob_core::repositories::UserRepository;

use super::{column, storage_error, uuid_column};

pub(crate) const USER_COLUMNS: &str = "id, email, first_name, last_name, phone, password_hash, \
     email_verified_at, phone_verified_at, created_at, updated_at";

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to User entity
    pub(crate) fn row_to_user(row: &MySqlRow) -> Result<User, DomainError> {
        Ok(User {
            id: uuid_column(row, "id")?,
            email: column(row, "email")?,
            first_name: column(row, "first_name")?,
            last_name: column(row, "last_name")?,
            phone: column(row, "phone")?,
            password_hash: column(row, "password_hash")?,
            email_verified_at: column(row, "email_verified_at")?,
            phone_verified_at: column(row, "phone_verified_at")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE id = ? LIMIT 1", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("find user by id", e))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {} FROM users WHERE email = ? LIMIT 1", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("find user by email", e))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }
}

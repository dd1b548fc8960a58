//! MySQL implementation of the MembershipRepository trait.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use ob_core::domain::entities::membership::{Membership, MembershipRole};
use ob_core::errors::DomainError;
use ob_core::repositories::MembershipRepository;

use super::{column, optional_uuid_column, storage_error, uuid_column};

/// MySQL implementation of MembershipRepository
pub struct MySqlMembershipRepository {
    pool: MySqlPool,
}

impl MySqlMembershipRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_membership(row: &MySqlRow) -> Result<Membership, DomainError> {
        let role: Option<String> = column(row, "role")?;
        // Unknown roles carry no privileges
        let role = role.and_then(|r| r.parse::<MembershipRole>().ok());

        Ok(Membership {
            user_id: uuid_column(row, "user_id")?,
            department_id: uuid_column(row, "department_id")?,
            position_id: uuid_column(row, "position_id")?,
            role,
            assigned_by: optional_uuid_column(row, "assigned_by")?,
            assigned_at: column(row, "assigned_at")?,
        })
    }
}

#[async_trait]
impl MembershipRepository for MySqlMembershipRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Membership>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, department_id, position_id, role, assigned_by, assigned_at
            FROM memberships
            WHERE user_id = ?
            ORDER BY assigned_at
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("find memberships", e))?;

        rows.iter().map(Self::row_to_membership).collect()
    }
}

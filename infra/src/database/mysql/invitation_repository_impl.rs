//! MySQL implementation of the InvitationRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, QueryBuilder, Transaction};
use uuid::Uuid;

use ob_core::domain::entities::invitation::{
    Invitation, InvitationFilter, InvitationStatus, NewInvitation,
};
use ob_core::domain::entities::user::User;
use ob_core::errors::{DomainError, InvitationError};
use ob_core::repositories::{InvitationRepository, Redemption};

use super::{column, optional_uuid_column, storage_error, uuid_column};

const INVITATION_COLUMNS: &str = "id, token_hash, token_plaintext, email, phone, first_name, \
     last_name, department_id, position_id, invited_by, status, expires_at, accepted_at, \
     revoked_at, consumed_by_user_id, created_at";

/// MySQL implementation of InvitationRepository
pub struct MySqlInvitationRepository {
    pool: MySqlPool,
}

impl MySqlInvitationRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_invitation(row: &MySqlRow) -> Result<Invitation, DomainError> {
        let status: String = column(row, "status")?;
        let status = status
            .parse::<InvitationStatus>()
            .map_err(|e| DomainError::storage(e.to_string()))?;

        Ok(Invitation {
            id: uuid_column(row, "id")?,
            token_hash: column(row, "token_hash")?,
            token_plaintext: column(row, "token_plaintext")?,
            email: column(row, "email")?,
            phone: column(row, "phone")?,
            first_name: column(row, "first_name")?,
            last_name: column(row, "last_name")?,
            department_id: uuid_column(row, "department_id")?,
            position_id: uuid_column(row, "position_id")?,
            invited_by: uuid_column(row, "invited_by")?,
            status,
            expires_at: column(row, "expires_at")?,
            accepted_at: column(row, "accepted_at")?,
            revoked_at: column(row, "revoked_at")?,
            consumed_by_user_id: optional_uuid_column(row, "consumed_by_user_id")?,
            created_at: column(row, "created_at")?,
        })
    }

    async fn rollback(tx: Transaction<'_, MySql>) -> Result<(), DomainError> {
        tx.rollback()
            .await
            .map_err(|e| storage_error("roll back transaction", e))
    }

    fn is_unique_violation(error: &sqlx::Error) -> bool {
        error
            .as_database_error()
            .map(|e| e.is_unique_violation())
            .unwrap_or(false)
    }
}

#[async_trait]
impl InvitationRepository for MySqlInvitationRepository {
    async fn insert(&self, invitation: NewInvitation) -> Result<Invitation, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO invitations (
                id, token_hash, token_plaintext, email, phone, first_name, last_name,
                department_id, position_id, invited_by, status, expires_at, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?)
            "#,
        )
        .bind(invitation.id.to_string())
        .bind(&invitation.token_hash)
        .bind(&invitation.token_plaintext)
        .bind(&invitation.email)
        .bind(&invitation.phone)
        .bind(&invitation.first_name)
        .bind(&invitation.last_name)
        .bind(invitation.department_id.to_string())
        .bind(invitation.position_id.to_string())
        .bind(invitation.invited_by.to_string())
        .bind(invitation.expires_at)
        .bind(invitation.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("insert invitation", e))?;

        Ok(Invitation::from_new(invitation))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invitation>, DomainError> {
        let query = format!(
            "SELECT {} FROM invitations WHERE id = ? LIMIT 1",
            INVITATION_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("find invitation by id", e))?;

        row.as_ref().map(Self::row_to_invitation).transpose()
    }

    async fn find_pending_by_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Invitation>, DomainError> {
        let query = format!(
            "SELECT {} FROM invitations \
             WHERE token_hash = ? AND status = 'pending' \
             AND (expires_at IS NULL OR expires_at > ?) LIMIT 1",
            INVITATION_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(token_hash)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("find invitation by hash", e))?;

        row.as_ref().map(Self::row_to_invitation).transpose()
    }

    async fn redeem(&self, redemption: Redemption) -> Result<Option<User>, DomainError> {
        let Redemption {
            invitation_id,
            user,
            membership,
            accepted_at,
        } = redemption;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("begin transaction", e))?;

        // Lock the row so concurrent redeemers serialize here
        let locked = sqlx::query(
            r#"
            SELECT id FROM invitations
            WHERE id = ? AND status = 'pending'
              AND (expires_at IS NULL OR expires_at > ?)
            FOR UPDATE
            "#,
        )
        .bind(invitation_id.to_string())
        .bind(accepted_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| storage_error("lock invitation", e))?;

        if locked.is_none() {
            Self::rollback(tx).await?;
            return Ok(None);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (
                id, email, first_name, last_name, phone, password_hash,
                email_verified_at, phone_verified_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, NULL, NULL, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(accepted_at)
        .bind(accepted_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            if Self::is_unique_violation(&e) {
                Self::rollback(tx).await?;
                return Err(InvitationError::UserExists.into());
            }
            return Err(storage_error("insert invited user", e));
        }

        sqlx::query(
            r#"
            INSERT INTO memberships (
                user_id, department_id, position_id, role, assigned_by, assigned_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(membership.user_id.to_string())
        .bind(membership.department_id.to_string())
        .bind(membership.position_id.to_string())
        .bind(membership.role.as_str())
        .bind(membership.assigned_by.to_string())
        .bind(accepted_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| storage_error("insert membership", e))?;

        let accepted = sqlx::query(
            r#"
            UPDATE invitations
            SET status = 'accepted', accepted_at = ?, consumed_by_user_id = ?,
                token_plaintext = NULL
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(accepted_at)
        .bind(user.id.to_string())
        .bind(invitation_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| storage_error("accept invitation", e))?;

        if accepted.rows_affected() == 0 {
            Self::rollback(tx).await?;
            return Ok(None);
        }

        tx.commit()
            .await
            .map_err(|e| storage_error("commit redemption", e))?;

        tracing::debug!(
            invitation_id = %invitation_id,
            user_id = %user.id,
            "Invitation redemption committed"
        );
        Ok(Some(User::new(user, accepted_at)))
    }

    async fn mark_revoked(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Invitation>, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET status = 'revoked', revoked_at = ?, token_plaintext = NULL
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(at)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("revoke invitation", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn list(&self, filter: &InvitationFilter) -> Result<Vec<Invitation>, DomainError> {
        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(format!(
            "SELECT {} FROM invitations WHERE 1 = 1",
            INVITATION_COLUMNS
        ));

        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(needle) = filter.email_contains.as_deref() {
            builder
                .push(" AND LOWER(email) LIKE ")
                .push_bind(format!("%{}%", escape_like(&needle.to_lowercase())))
                .push(" ESCAPE '!'");
        }
        builder.push(" ORDER BY created_at DESC");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("list invitations", e))?;

        rows.iter().map(Self::row_to_invitation).collect()
    }
}

/// Escape `LIKE` wildcards so the needle matches as a plain substring.
/// `!` is the escape character, paired with `ESCAPE '!'` in the query.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '!') {
            escaped.push('!');
        }
        escaped.push(c);
    }
    escaped
}

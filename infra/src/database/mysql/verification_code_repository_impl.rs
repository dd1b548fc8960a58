//! MySQL implementation of the VerificationCodeRepository trait.
//!
//! Only SHA-256 digests of the secrets are stored. Supersession and
//! confirmation each run in a single transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, Row, Transaction};
use uuid::Uuid;

use ob_core::domain::entities::verification_code::{
    NewVerificationCode, VerificationCode, VerificationKind,
};
use ob_core::domain::value_objects::RequestMetadata;
use ob_core::errors::DomainError;
use ob_core::repositories::VerificationCodeRepository;

use super::{column, storage_error, uuid_column};

const CODE_COLUMNS: &str = "id, user_id, kind, sent_to, token_hash, expires_at, attempts, \
     max_attempts, used_at, requested_ip, requested_user_agent, confirmed_ip, \
     confirmed_user_agent, created_at";

/// MySQL implementation of VerificationCodeRepository
pub struct MySqlVerificationCodeRepository {
    pool: MySqlPool,
}

impl MySqlVerificationCodeRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_code(row: &MySqlRow) -> Result<VerificationCode, DomainError> {
        let kind: String = column(row, "kind")?;
        let kind = kind.parse::<VerificationKind>().map_err(DomainError::storage)?;

        Ok(VerificationCode {
            id: uuid_column(row, "id")?,
            user_id: uuid_column(row, "user_id")?,
            kind,
            sent_to: column(row, "sent_to")?,
            token_hash: column(row, "token_hash")?,
            expires_at: column(row, "expires_at")?,
            attempts: column(row, "attempts")?,
            max_attempts: column(row, "max_attempts")?,
            used_at: column(row, "used_at")?,
            requested_ip: column(row, "requested_ip")?,
            requested_user_agent: column(row, "requested_user_agent")?,
            confirmed_ip: column(row, "confirmed_ip")?,
            confirmed_user_agent: column(row, "confirmed_user_agent")?,
            created_at: column(row, "created_at")?,
        })
    }

    async fn insert_in<'c, E>(executor: E, code: &NewVerificationCode) -> Result<(), DomainError>
    where
        E: sqlx::Executor<'c, Database = MySql>,
    {
        sqlx::query(
            r#"
            INSERT INTO verification_codes (
                id, user_id, kind, sent_to, token_hash, expires_at, attempts,
                max_attempts, used_at, requested_ip, requested_user_agent, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, 0, ?, NULL, ?, ?, ?)
            "#,
        )
        .bind(code.id.to_string())
        .bind(code.user_id.to_string())
        .bind(code.kind.as_str())
        .bind(&code.sent_to)
        .bind(&code.token_hash)
        .bind(code.expires_at)
        .bind(code.max_attempts)
        .bind(&code.requested_ip)
        .bind(&code.requested_user_agent)
        .bind(code.created_at)
        .execute(executor)
        .await
        .map_err(|e| storage_error("insert verification code", e))?;
        Ok(())
    }

    async fn deactivate_in<'c, E>(
        executor: E,
        user_id: Uuid,
        kind: VerificationKind,
        at: DateTime<Utc>,
    ) -> Result<u64, DomainError>
    where
        E: sqlx::Executor<'c, Database = MySql>,
    {
        let result = sqlx::query(
            r#"
            UPDATE verification_codes
            SET used_at = ?
            WHERE user_id = ? AND kind = ? AND used_at IS NULL
            "#,
        )
        .bind(at)
        .bind(user_id.to_string())
        .bind(kind.as_str())
        .execute(executor)
        .await
        .map_err(|e| storage_error("supersede verification codes", e))?;
        Ok(result.rows_affected())
    }

    async fn rollback(tx: Transaction<'_, MySql>) -> Result<(), DomainError> {
        tx.rollback()
            .await
            .map_err(|e| storage_error("roll back transaction", e))
    }
}

#[async_trait]
impl VerificationCodeRepository for MySqlVerificationCodeRepository {
    async fn insert(&self, code: NewVerificationCode) -> Result<VerificationCode, DomainError> {
        Self::insert_in(&self.pool, &code).await?;
        Ok(VerificationCode::from_new(code))
    }

    async fn find_active_by_hash(
        &self,
        kind: VerificationKind,
        token_hash: &str,
    ) -> Result<Option<VerificationCode>, DomainError> {
        let query = format!(
            "SELECT {} FROM verification_codes \
             WHERE kind = ? AND token_hash = ? AND used_at IS NULL \
             ORDER BY created_at DESC LIMIT 1",
            CODE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(kind.as_str())
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("find verification code by hash", e))?;

        row.as_ref().map(Self::row_to_code).transpose()
    }

    async fn find_latest_active(
        &self,
        user_id: Uuid,
        kind: VerificationKind,
    ) -> Result<Option<VerificationCode>, DomainError> {
        let query = format!(
            "SELECT {} FROM verification_codes \
             WHERE user_id = ? AND kind = ? AND used_at IS NULL \
             ORDER BY created_at DESC LIMIT 1",
            CODE_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(kind.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("find latest verification code", e))?;

        row.as_ref().map(Self::row_to_code).transpose()
    }

    async fn deactivate_active(
        &self,
        user_id: Uuid,
        kind: VerificationKind,
        at: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        Self::deactivate_in(&self.pool, user_id, kind, at).await
    }

    async fn replace_active(
        &self,
        code: NewVerificationCode,
    ) -> Result<VerificationCode, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("begin transaction", e))?;

        let superseded =
            Self::deactivate_in(&mut *tx, code.user_id, code.kind, code.created_at).await?;
        Self::insert_in(&mut *tx, &code).await?;

        tx.commit()
            .await
            .map_err(|e| storage_error("commit verification code", e))?;

        tracing::debug!(
            user_id = %code.user_id,
            kind = %code.kind,
            superseded,
            "Replaced active verification code"
        );
        Ok(VerificationCode::from_new(code))
    }

    async fn update_attempts(&self, id: Uuid, attempts: u32) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE verification_codes SET attempts = ? WHERE id = ?")
            .bind(attempts)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("update verification attempts", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound {
                resource: format!("verification code {}", id),
            });
        }
        Ok(())
    }

    async fn count_recent(
        &self,
        user_id: Uuid,
        kind: VerificationKind,
        since: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS issued
            FROM verification_codes
            WHERE user_id = ? AND kind = ? AND created_at >= ?
            "#,
        )
        .bind(user_id.to_string())
        .bind(kind.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("count recent verification codes", e))?;

        let issued: i64 = row
            .try_get("issued")
            .map_err(|e| DomainError::storage(format!("Failed to get issued: {}", e)))?;
        Ok(u64::try_from(issued).unwrap_or(0))
    }

    async fn confirm(
        &self,
        code_id: Uuid,
        user_id: Uuid,
        kind: VerificationKind,
        at: DateTime<Utc>,
        metadata: &RequestMetadata,
    ) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("begin transaction", e))?;

        let used = sqlx::query(
            r#"
            UPDATE verification_codes
            SET used_at = ?, confirmed_ip = ?, confirmed_user_agent = ?
            WHERE id = ? AND used_at IS NULL
            "#,
        )
        .bind(at)
        .bind(&metadata.ip)
        .bind(&metadata.user_agent)
        .bind(code_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| storage_error("mark verification code used", e))?;

        if used.rows_affected() == 0 {
            Self::rollback(tx).await?;
            return Ok(false);
        }

        let user_update = match kind {
            VerificationKind::Email => {
                "UPDATE users SET email_verified_at = ?, updated_at = ? WHERE id = ?"
            }
            VerificationKind::Phone => {
                "UPDATE users SET phone_verified_at = ?, updated_at = ? WHERE id = ?"
            }
        };
        let verified = sqlx::query(user_update)
            .bind(at)
            .bind(at)
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("mark user verified", e))?;

        if verified.rows_affected() == 0 {
            Self::rollback(tx).await?;
            return Err(DomainError::NotFound {
                resource: format!("user {}", user_id),
            });
        }

        tx.commit()
            .await
            .map_err(|e| storage_error("commit verification", e))?;
        Ok(true)
    }
}

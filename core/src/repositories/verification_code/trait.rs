//! Verification code repository trait.
//!
//! Only hashes are ever handed to the repository. At most one active
//! (unused) code exists per user and kind; `replace_active` maintains that.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::verification_code::{
    NewVerificationCode, VerificationCode, VerificationKind,
};
use crate::domain::value_objects::RequestMetadata;
use crate::errors::DomainError;

/// Repository trait for verification code persistence
#[async_trait]
pub trait VerificationCodeRepository: Send + Sync {
    /// Persist a new code with zero attempts
    async fn insert(&self, code: NewVerificationCode) -> Result<VerificationCode, DomainError>;

    /// Find the unused code of this kind with the given hash
    async fn find_active_by_hash(
        &self,
        kind: VerificationKind,
        token_hash: &str,
    ) -> Result<Option<VerificationCode>, DomainError>;

    /// Most recently issued unused code for a user and kind
    async fn find_latest_active(
        &self,
        user_id: Uuid,
        kind: VerificationKind,
    ) -> Result<Option<VerificationCode>, DomainError>;

    /// Mark every unused code for this user and kind as used at `at`.
    ///
    /// # Returns
    /// Number of codes superseded
    async fn deactivate_active(
        &self,
        user_id: Uuid,
        kind: VerificationKind,
        at: DateTime<Utc>,
    ) -> Result<u64, DomainError>;

    /// Supersede the active codes for the new code's user and kind, then
    /// insert it.
    ///
    /// The default runs two independent calls, so two concurrent issuances
    /// can both end up active. Implementations backed by a transactional
    /// store should override this and run both steps in one transaction.
    async fn replace_active(
        &self,
        code: NewVerificationCode,
    ) -> Result<VerificationCode, DomainError> {
        self.deactivate_active(code.user_id, code.kind, code.created_at)
            .await?;
        self.insert(code).await
    }

    /// Persist the attempt counter after a failed guess
    async fn update_attempts(&self, id: Uuid, attempts: u32) -> Result<(), DomainError>;

    /// Codes of this kind issued to the user at or after `since`
    async fn count_recent(
        &self,
        user_id: Uuid,
        kind: VerificationKind,
        since: DateTime<Utc>,
    ) -> Result<u64, DomainError>;

    /// Atomically mark the code used (recording `metadata`) and set the
    /// user's verified timestamp for `kind`.
    ///
    /// # Returns
    /// * `Ok(true)` - Both writes applied
    /// * `Ok(false)` - The code was already used; nothing changed
    async fn confirm(
        &self,
        code_id: Uuid,
        user_id: Uuid,
        kind: VerificationKind,
        at: DateTime<Utc>,
        metadata: &RequestMetadata,
    ) -> Result<bool, DomainError>;
}

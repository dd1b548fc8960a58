//! MySQL repository implementations.
//!
//! Identifiers are stored as `CHAR(36)` strings and timestamps as
//! `DATETIME(6)` in UTC.

mod invitation_repository_impl;
mod membership_repository_impl;
mod user_repository_impl;
mod verification_code_repository_impl;

pub use invitation_repository_impl::MySqlInvitationRepository;
pub use membership_repository_impl::MySqlMembershipRepository;
pub use user_repository_impl::MySqlUserRepository;
pub use verification_code_repository_impl::MySqlVerificationCodeRepository;

use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Row};
use uuid::Uuid;

use ob_core::errors::DomainError;

/// Wrap a SQLx error with the operation that failed
pub(crate) fn storage_error(operation: &str, error: sqlx::Error) -> DomainError {
    tracing::error!(operation, error = %error, "Database operation failed");
    DomainError::storage(format!("Failed to {}: {}", operation, error))
}

/// Read a typed column
pub(crate) fn column<'r, T>(row: &'r MySqlRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get(name)
        .map_err(|e| DomainError::storage(format!("Failed to get {}: {}", name, e)))
}

/// Read a `CHAR(36)` identifier column
pub(crate) fn uuid_column(row: &MySqlRow, name: &str) -> Result<Uuid, DomainError> {
    let value: String = column(row, name)?;
    Uuid::parse_str(&value)
        .map_err(|e| DomainError::storage(format!("Invalid UUID in {}: {}", name, e)))
}

/// Read a nullable `CHAR(36)` identifier column
pub(crate) fn optional_uuid_column(
    row: &MySqlRow,
    name: &str,
) -> Result<Option<Uuid>, DomainError> {
    let value: Option<String> = column(row, name)?;
    value
        .map(|v| {
            Uuid::parse_str(&v)
                .map_err(|e| DomainError::storage(format!("Invalid UUID in {}: {}", name, e)))
        })
        .transpose()
}

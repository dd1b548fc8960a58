//! Verification code entity for email links and SMS codes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Email links are single-shot: one wrong token burns nothing, but there is
/// no second guess at a 64-character secret either
pub const EMAIL_MAX_ATTEMPTS: u32 = 1;

/// Length of the numeric SMS code
pub const PHONE_CODE_LENGTH: usize = 6;

/// Channel a verification code proves ownership of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationKind {
    Email,
    Phone,
}

impl VerificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationKind::Email => "email",
            VerificationKind::Phone => "phone",
        }
    }
}

impl std::fmt::Display for VerificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VerificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(VerificationKind::Email),
            "phone" => Ok(VerificationKind::Phone),
            other => Err(format!("Unknown verification kind: {}", other)),
        }
    }
}

/// A persisted verification secret. Only the hash of the secret is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    /// Unique identifier for the verification code
    pub id: Uuid,

    /// Account the code was issued for
    pub user_id: Uuid,

    pub kind: VerificationKind,

    /// Address or number the account had when the code was issued
    pub sent_to: String,

    /// SHA-256 hex of the plaintext secret
    pub token_hash: String,

    /// Timestamp when the code expires
    pub expires_at: DateTime<Utc>,

    /// Failed guesses so far
    pub attempts: u32,

    pub max_attempts: u32,

    /// Set on successful confirmation or when superseded by a newer code
    pub used_at: Option<DateTime<Utc>>,

    pub requested_ip: Option<String>,
    pub requested_user_agent: Option<String>,
    pub confirmed_ip: Option<String>,
    pub confirmed_user_agent: Option<String>,

    /// Timestamp when the code was issued
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    /// Materialize a record from an insert request
    pub fn from_new(new: NewVerificationCode) -> Self {
        Self {
            id: new.id,
            user_id: new.user_id,
            kind: new.kind,
            sent_to: new.sent_to,
            token_hash: new.token_hash,
            expires_at: new.expires_at,
            attempts: 0,
            max_attempts: new.max_attempts,
            used_at: None,
            requested_ip: new.requested_ip,
            requested_user_agent: new.requested_user_agent,
            confirmed_ip: None,
            confirmed_user_agent: None,
            created_at: new.created_at,
        }
    }

    /// A code is active until it is used or superseded; expiry is judged
    /// separately by the attempt evaluator
    pub fn is_active(&self) -> bool {
        self.used_at.is_none()
    }
}

/// Insert request for a fresh verification code; attempts always start at zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVerificationCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: VerificationKind,
    pub sent_to: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub max_attempts: u32,
    pub requested_ip: Option<String>,
    pub requested_user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_code() -> NewVerificationCode {
        let now = Utc::now();
        NewVerificationCode {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: VerificationKind::Phone,
            sent_to: "+14155552671".to_string(),
            token_hash: "ab".repeat(32),
            expires_at: now + Duration::minutes(10),
            max_attempts: 5,
            requested_ip: Some("10.0.0.1".to_string()),
            requested_user_agent: None,
            created_at: now,
        }
    }

    #[test]
    fn test_from_new_starts_fresh() {
        let new = new_code();
        let code = VerificationCode::from_new(new.clone());

        assert_eq!(code.id, new.id);
        assert_eq!(code.attempts, 0);
        assert!(code.is_active());
        assert!(code.confirmed_ip.is_none());
        assert_eq!(code.requested_ip.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        assert_eq!("email".parse::<VerificationKind>().unwrap(), VerificationKind::Email);
        assert_eq!(VerificationKind::Phone.to_string(), "phone");
        assert!("sms".parse::<VerificationKind>().is_err());
    }
}

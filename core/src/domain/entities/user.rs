//! User entity. Accounts are only ever created by redeeming an invitation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::verification_code::VerificationKind;

/// User entity representing a provisioned account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Lower-cased, unique
    pub email: String,

    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub email_verified_at: Option<DateTime<Utc>>,
    pub phone_verified_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new, unverified user
    pub fn new(new: NewUser, now: DateTime<Utc>) -> Self {
        Self {
            id: new.id,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            phone: new.phone,
            password_hash: new.password_hash,
            email_verified_at: None,
            phone_verified_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the given channel has been verified
    pub fn is_verified(&self, kind: VerificationKind) -> bool {
        self.verified_at(kind).is_some()
    }

    pub fn verified_at(&self, kind: VerificationKind) -> Option<DateTime<Utc>> {
        match kind {
            VerificationKind::Email => self.email_verified_at,
            VerificationKind::Phone => self.phone_verified_at,
        }
    }

    /// Address or number codes of this kind are delivered to
    pub fn contact(&self, kind: VerificationKind) -> Option<&str> {
        match kind {
            VerificationKind::Email => Some(self.email.as_str()).filter(|e| !e.is_empty()),
            VerificationKind::Phone => self.phone.as_deref().filter(|p| !p.trim().is_empty()),
        }
    }

    /// Marks the channel as verified
    pub fn mark_verified(&mut self, kind: VerificationKind, at: DateTime<Utc>) {
        match kind {
            VerificationKind::Email => self.email_verified_at = Some(at),
            VerificationKind::Phone => self.phone_verified_at = Some(at),
        }
        self.updated_at = at;
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Account fields supplied by invitation redemption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User::new(
            NewUser {
                id: Uuid::new_v4(),
                email: "ada@example.com".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                phone: Some("+14155552671".to_string()),
                password_hash: "$2b$10$hash".to_string(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_new_user_is_unverified() {
        let user = sample_user();
        assert!(!user.is_verified(VerificationKind::Email));
        assert!(!user.is_verified(VerificationKind::Phone));
        assert_eq!(user.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_mark_verified_is_per_channel() {
        let mut user = sample_user();
        let now = Utc::now();
        user.mark_verified(VerificationKind::Phone, now);

        assert!(user.is_verified(VerificationKind::Phone));
        assert!(!user.is_verified(VerificationKind::Email));
        assert_eq!(user.updated_at, now);
    }

    #[test]
    fn test_contact_ignores_blank_phone() {
        let mut user = sample_user();
        user.phone = Some("  ".to_string());
        assert_eq!(user.contact(VerificationKind::Phone), None);
        assert_eq!(user.contact(VerificationKind::Email), Some("ada@example.com"));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}

//! Invitation entity: a single-use token bound to a department and position.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::lifecycle::status::derive_invitation_status;
use crate::errors::ValidationError;

/// Default invitation lifetime
pub const DEFAULT_INVITATION_TTL_HOURS: i64 = 72;

/// Upper bound accepted for a requested lifetime (one year)
pub const MAX_INVITATION_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
    Revoked,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Expired => "expired",
            InvitationStatus::Revoked => "revoked",
        }
    }

    /// Statuses that never change once reached
    pub fn is_terminal(&self) -> bool {
        !matches!(self, InvitationStatus::Pending)
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InvitationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "expired" => Ok(InvitationStatus::Expired),
            "revoked" => Ok(InvitationStatus::Revoked),
            _ => Err(ValidationError::InvalidStatus {
                status: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: Uuid,
    /// SHA-256 hex of the token, unique
    pub token_hash: String,
    /// Retained only while pending so admins can re-share the link
    #[serde(skip_serializing)]
    pub token_plaintext: Option<String>,
    /// Lower-cased
    pub email: String,
    pub phone: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub department_id: Uuid,
    pub position_id: Uuid,
    pub invited_by: Uuid,
    pub status: InvitationStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub consumed_by_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn from_new(new: NewInvitation) -> Self {
        Self {
            id: new.id,
            token_hash: new.token_hash,
            token_plaintext: Some(new.token_plaintext),
            email: new.email,
            phone: new.phone,
            first_name: new.first_name,
            last_name: new.last_name,
            department_id: new.department_id,
            position_id: new.position_id,
            invited_by: new.invited_by,
            status: InvitationStatus::Pending,
            expires_at: Some(new.expires_at),
            accepted_at: None,
            revoked_at: None,
            consumed_by_user_id: None,
            created_at: new.created_at,
        }
    }

    /// Status as seen at `now`, accounting for lazy expiry
    pub fn effective_status(&self, now: DateTime<Utc>) -> InvitationStatus {
        derive_invitation_status(self.status, self.expires_at, now)
    }

    /// Redeemable iff still pending and not past its deadline
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == InvitationStatus::Pending
    }
}

/// Insert request for a new pending invitation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvitation {
    pub id: Uuid,
    pub token_hash: String,
    pub token_plaintext: String,
    pub email: String,
    pub phone: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub department_id: Uuid,
    pub position_id: Uuid,
    pub invited_by: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Admin listing filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvitationFilter {
    /// Matched against the persisted status
    pub status: Option<InvitationStatus>,
    /// Case-insensitive substring of the invitee email
    pub email_contains: Option<String>,
}

impl InvitationFilter {
    /// Build a filter from raw query parameters
    pub fn parse(status: Option<&str>, email: Option<&str>) -> Result<Self, ValidationError> {
        let status = status
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .transpose()?;
        let email_contains = email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());
        Ok(Self {
            status,
            email_contains,
        })
    }

    pub fn matches(&self, invitation: &Invitation) -> bool {
        if let Some(status) = self.status {
            if invitation.status != status {
                return false;
            }
        }
        if let Some(needle) = &self.email_contains {
            if !invitation.email.to_lowercase().contains(needle.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Invitation as shown to administrators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationView {
    pub id: Uuid,
    pub email: String,
    pub phone: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub department_id: Uuid,
    pub position_id: Uuid,
    pub invited_by: Uuid,
    /// Derived status, not the stored one
    pub status: InvitationStatus,
    /// Present only while the invitation is still pending
    pub token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub consumed_by_user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl InvitationView {
    pub fn from_invitation(invitation: Invitation, now: DateTime<Utc>) -> Self {
        let status = invitation.effective_status(now);
        let token = if status == InvitationStatus::Pending {
            invitation.token_plaintext
        } else {
            None
        };
        Self {
            id: invitation.id,
            email: invitation.email,
            phone: invitation.phone,
            first_name: invitation.first_name,
            last_name: invitation.last_name,
            department_id: invitation.department_id,
            position_id: invitation.position_id,
            invited_by: invitation.invited_by,
            status,
            token,
            expires_at: invitation.expires_at,
            accepted_at: invitation.accepted_at,
            revoked_at: invitation.revoked_at,
            consumed_by_user_id: invitation.consumed_by_user_id,
            created_at: invitation.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pending(now: DateTime<Utc>, ttl_hours: i64) -> Invitation {
        Invitation::from_new(NewInvitation {
            id: Uuid::new_v4(),
            token_hash: "cd".repeat(32),
            token_plaintext: "plain-token".to_string(),
            email: "new.hire@example.com".to_string(),
            phone: None,
            first_name: "New".to_string(),
            last_name: "Hire".to_string(),
            department_id: Uuid::new_v4(),
            position_id: Uuid::new_v4(),
            invited_by: Uuid::new_v4(),
            expires_at: now + Duration::hours(ttl_hours),
            created_at: now,
        })
    }

    #[test]
    fn test_view_exposes_token_only_while_pending() {
        let now = Utc::now();
        let invitation = pending(now, 72);

        let view = InvitationView::from_invitation(invitation.clone(), now);
        assert_eq!(view.status, InvitationStatus::Pending);
        assert_eq!(view.token.as_deref(), Some("plain-token"));

        let later = now + Duration::hours(73);
        let view = InvitationView::from_invitation(invitation, later);
        assert_eq!(view.status, InvitationStatus::Expired);
        assert!(view.token.is_none());
    }

    #[test]
    fn test_filter_parse_and_match() {
        let now = Utc::now();
        let invitation = pending(now, 72);

        let filter = InvitationFilter::parse(Some("Pending"), Some("NEW.HIRE")).unwrap();
        assert!(filter.matches(&invitation));

        let filter = InvitationFilter::parse(Some("revoked"), None).unwrap();
        assert!(!filter.matches(&invitation));

        let filter = InvitationFilter::parse(Some(""), Some("  ")).unwrap();
        assert_eq!(filter, InvitationFilter::default());

        assert!(matches!(
            InvitationFilter::parse(Some("archived"), None),
            Err(ValidationError::InvalidStatus { .. })
        ));
    }

    #[test]
    fn test_plaintext_not_serialized() {
        let json = serde_json::to_value(pending(Utc::now(), 1)).unwrap();
        assert!(json.get("token_plaintext").is_none());
    }
}

//! Request and result types for the invitation service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::value_objects::RequestMetadata;

/// Admin request to invite a new member
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InvitationRequest {
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub department_id: Uuid,
    pub position_id: Uuid,
    /// Falls back to the configured default
    #[validate(range(min = 1, max = 8760))]
    pub expires_in_hours: Option<i64>,
    /// Email the registration link to the invitee
    #[serde(default)]
    pub deliver: bool,
}

/// A freshly issued invitation. The token is only ever returned here and
/// in the pending admin listing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedInvitation {
    pub invitation_id: Uuid,
    pub token: String,
    pub register_url: String,
    pub expires_at: DateTime<Utc>,
    pub delivered: bool,
}

impl std::fmt::Debug for IssuedInvitation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedInvitation")
            .field("invitation_id", &self.invitation_id)
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("delivered", &self.delivered)
            .finish()
    }
}

/// Registration through an invitation link
#[derive(Clone, Deserialize)]
pub struct RedeemRequest {
    pub token: String,
    pub password: String,
    #[serde(default)]
    pub metadata: RequestMetadata,
}

impl std::fmt::Debug for RedeemRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedeemRequest")
            .field("token", &"<redacted>")
            .field("password", &"<redacted>")
            .field("metadata", &self.metadata)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokedInvitation {
    pub invitation_id: Uuid,
    pub revoked_at: DateTime<Utc>,
}

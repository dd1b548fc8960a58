//! Configuration for the invitation service

use ob_shared::config::verification::{
    VerificationConfig, DEFAULT_APP_URL, DEFAULT_INVITATION_TTL_HOURS,
};

use crate::domain::entities::invitation::MAX_INVITATION_TTL_HOURS;
use crate::domain::entities::membership::MembershipRole;
use crate::errors::ValidationError;

#[derive(Debug, Clone)]
pub struct InvitationServiceConfig {
    /// Lifetime used when a request does not name one
    pub default_ttl_hours: i64,
    /// Base URL for registration links, without trailing slash
    pub app_url: String,
    /// Send every invitation email here instead of the invitee address
    pub email_override: Option<String>,
    /// Role given to the membership created on redemption
    pub member_role: MembershipRole,
}

impl Default for InvitationServiceConfig {
    fn default() -> Self {
        Self {
            default_ttl_hours: DEFAULT_INVITATION_TTL_HOURS,
            app_url: DEFAULT_APP_URL.to_string(),
            email_override: None,
            member_role: MembershipRole::Manager,
        }
    }
}

impl From<&VerificationConfig> for InvitationServiceConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            default_ttl_hours: config.invitation_ttl_hours,
            app_url: config.app_url.clone(),
            email_override: config.email_override.clone(),
            ..Self::default()
        }
    }
}

impl InvitationServiceConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_ttl_hours <= 0 {
            return Err(ValidationError::InvalidTtl {
                field: "default_ttl_hours".to_string(),
                value: self.default_ttl_hours,
            });
        }
        if self.default_ttl_hours > MAX_INVITATION_TTL_HOURS {
            return Err(ValidationError::OutOfRange {
                field: "default_ttl_hours".to_string(),
                min: "1".to_string(),
                max: MAX_INVITATION_TTL_HOURS.to_string(),
            });
        }
        Ok(())
    }
}

//! Department/position membership. Admin rights derive from the role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRole {
    SuperAdmin,
    Admin,
    Manager,
}

impl MembershipRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::SuperAdmin => "super_admin",
            MembershipRole::Admin => "admin",
            MembershipRole::Manager => "manager",
        }
    }

    /// Roles allowed to issue, revoke and list invitations
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            MembershipRole::SuperAdmin | MembershipRole::Admin | MembershipRole::Manager
        )
    }
}

impl std::str::FromStr for MembershipRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(MembershipRole::SuperAdmin),
            "admin" => Ok(MembershipRole::Admin),
            "manager" => Ok(MembershipRole::Manager),
            other => Err(format!("Unknown membership role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: Uuid,
    pub department_id: Uuid,
    pub position_id: Uuid,
    pub role: Option<MembershipRole>,
    pub assigned_by: Option<Uuid>,
    pub assigned_at: DateTime<Utc>,
}

impl Membership {
    pub fn is_admin(&self) -> bool {
        self.role.map(|r| r.is_admin()).unwrap_or(false)
    }
}

/// Membership created alongside a redeemed invitation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMembership {
    pub user_id: Uuid,
    pub department_id: Uuid,
    pub position_id: Uuid,
    pub role: MembershipRole,
    pub assigned_by: Uuid,
}

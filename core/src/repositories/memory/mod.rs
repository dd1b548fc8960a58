//! In-memory implementation of every repository trait.
//!
//! All state sits behind one lock, so the multi-row operations
//! (`replace_active`, `confirm`, `redeem`) are atomic the same way a
//! database transaction would make them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::invitation::{
    Invitation, InvitationFilter, InvitationStatus, NewInvitation,
};
use crate::domain::entities::membership::Membership;
use crate::domain::entities::user::User;
use crate::domain::entities::verification_code::{
    NewVerificationCode, VerificationCode, VerificationKind,
};
use crate::domain::value_objects::RequestMetadata;
use crate::errors::{DomainError, InvitationError};

use super::invitation::{InvitationRepository, Redemption};
use super::membership::MembershipRepository;
use super::user::UserRepository;
use super::verification_code::VerificationCodeRepository;


#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    memberships: Vec<Membership>,
    codes: HashMap<Uuid, VerificationCode>,
    invitations: HashMap<Uuid, Invitation>,
}

/// Shared in-process store; clones share the same data
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a storage error
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::storage("simulated write failure"));
        }
        Ok(())
    }

    /// Seed a user directly
    pub async fn put_user(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    /// Seed a membership directly
    pub async fn put_membership(&self, membership: Membership) {
        self.state.write().await.memberships.push(membership);
    }

    /// Seed an invitation directly, bypassing the insert path
    pub async fn put_invitation(&self, invitation: Invitation) {
        self.state
            .write()
            .await
            .invitations
            .insert(invitation.id, invitation);
    }

    pub async fn user(&self, id: Uuid) -> Option<User> {
        self.state.read().await.users.get(&id).cloned()
    }

    pub async fn invitation(&self, id: Uuid) -> Option<Invitation> {
        self.state.read().await.invitations.get(&id).cloned()
    }

    pub async fn memberships_of(&self, user_id: Uuid) -> Vec<Membership> {
        self.state
            .read()
            .await
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    /// Every code issued to a user for a kind, oldest first
    pub async fn codes_for(&self, user_id: Uuid, kind: VerificationKind) -> Vec<VerificationCode> {
        let state = self.state.read().await;
        let mut codes: Vec<VerificationCode> = state
            .codes
            .values()
            .filter(|c| c.user_id == user_id && c.kind == kind)
            .cloned()
            .collect();
        codes.sort_by_key(|c| c.created_at);
        codes
    }
}

fn deactivate(state: &mut State, user_id: Uuid, kind: VerificationKind, at: DateTime<Utc>) -> u64 {
    let mut count = 0;
    for code in state
        .codes
        .values_mut()
        .filter(|c| c.user_id == user_id && c.kind == kind && c.used_at.is_none())
    {
        code.used_at = Some(at);
        count += 1;
    }
    count
}

fn insert_code(state: &mut State, new: NewVerificationCode) -> Result<VerificationCode, DomainError> {
    if state.codes.contains_key(&new.id) {
        return Err(DomainError::storage("duplicate verification code id"));
    }
    let code = VerificationCode::from_new(new);
    state.codes.insert(code.id, code.clone());
    Ok(code)
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let email = email.to_lowercase();
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[async_trait]
impl MembershipRepository for InMemoryStore {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Vec<Membership>, DomainError> {
        Ok(self.memberships_of(user_id).await)
    }
}

#[async_trait]
impl VerificationCodeRepository for InMemoryStore {
    async fn insert(&self, code: NewVerificationCode) -> Result<VerificationCode, DomainError> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        insert_code(&mut state, code)
    }

    async fn find_active_by_hash(
        &self,
        kind: VerificationKind,
        token_hash: &str,
    ) -> Result<Option<VerificationCode>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .codes
            .values()
            .find(|c| c.kind == kind && c.used_at.is_none() && c.token_hash == token_hash)
            .cloned())
    }

    async fn find_latest_active(
        &self,
        user_id: Uuid,
        kind: VerificationKind,
    ) -> Result<Option<VerificationCode>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .codes
            .values()
            .filter(|c| c.user_id == user_id && c.kind == kind && c.used_at.is_none())
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn deactivate_active(
        &self,
        user_id: Uuid,
        kind: VerificationKind,
        at: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        Ok(deactivate(&mut state, user_id, kind, at))
    }

    async fn replace_active(
        &self,
        code: NewVerificationCode,
    ) -> Result<VerificationCode, DomainError> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        deactivate(&mut state, code.user_id, code.kind, code.created_at);
        insert_code(&mut state, code)
    }

    async fn update_attempts(&self, id: Uuid, attempts: u32) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        match state.codes.get_mut(&id) {
            Some(code) => {
                code.attempts = attempts;
                Ok(())
            }
            None => Err(DomainError::NotFound {
                resource: format!("verification code {}", id),
            }),
        }
    }

    async fn count_recent(
        &self,
        user_id: Uuid,
        kind: VerificationKind,
        since: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .codes
            .values()
            .filter(|c| c.user_id == user_id && c.kind == kind && c.created_at >= since)
            .count() as u64)
    }

    async fn confirm(
        &self,
        code_id: Uuid,
        user_id: Uuid,
        kind: VerificationKind,
        at: DateTime<Utc>,
        metadata: &RequestMetadata,
    ) -> Result<bool, DomainError> {
        self.check_writable()?;
        let mut state = self.state.write().await;

        if !state.users.contains_key(&user_id) {
            return Err(DomainError::NotFound {
                resource: format!("user {}", user_id),
            });
        }

        match state.codes.get_mut(&code_id) {
            Some(code) if code.used_at.is_none() => {
                code.used_at = Some(at);
                code.confirmed_ip = metadata.ip.clone();
                code.confirmed_user_agent = metadata.user_agent.clone();
            }
            _ => return Ok(false),
        }

        if let Some(user) = state.users.get_mut(&user_id) {
            user.mark_verified(kind, at);
        }
        Ok(true)
    }
}

#[async_trait]
impl InvitationRepository for InMemoryStore {
    async fn insert(&self, invitation: NewInvitation) -> Result<Invitation, DomainError> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        if state
            .invitations
            .values()
            .any(|i| i.token_hash == invitation.token_hash)
        {
            return Err(DomainError::storage("duplicate invitation token hash"));
        }
        let invitation = Invitation::from_new(invitation);
        state.invitations.insert(invitation.id, invitation.clone());
        Ok(invitation)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invitation>, DomainError> {
        Ok(self.invitation(id).await)
    }

    async fn find_pending_by_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Invitation>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .invitations
            .values()
            .find(|i| i.token_hash == token_hash && i.is_redeemable(now))
            .cloned())
    }

    async fn redeem(&self, redemption: Redemption) -> Result<Option<User>, DomainError> {
        self.check_writable()?;
        let mut state = self.state.write().await;

        let redeemable = state
            .invitations
            .get(&redemption.invitation_id)
            .map(|i| i.is_redeemable(redemption.accepted_at))
            .unwrap_or(false);
        if !redeemable {
            return Ok(None);
        }

        if state
            .users
            .values()
            .any(|u| u.email == redemption.user.email)
        {
            return Err(InvitationError::UserExists.into());
        }

        let user = User::new(redemption.user, redemption.accepted_at);
        let membership = Membership {
            user_id: user.id,
            department_id: redemption.membership.department_id,
            position_id: redemption.membership.position_id,
            role: Some(redemption.membership.role),
            assigned_by: Some(redemption.membership.assigned_by),
            assigned_at: redemption.accepted_at,
        };

        if let Some(invitation) = state.invitations.get_mut(&redemption.invitation_id) {
            invitation.status = InvitationStatus::Accepted;
            invitation.accepted_at = Some(redemption.accepted_at);
            invitation.consumed_by_user_id = Some(user.id);
            invitation.token_plaintext = None;
        }
        state.users.insert(user.id, user.clone());
        state.memberships.push(membership);
        Ok(Some(user))
    }

    async fn mark_revoked(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Invitation>, DomainError> {
        self.check_writable()?;
        let mut state = self.state.write().await;
        match state.invitations.get_mut(&id) {
            Some(invitation) if invitation.status == InvitationStatus::Pending => {
                invitation.status = InvitationStatus::Revoked;
                invitation.revoked_at = Some(at);
                invitation.token_plaintext = None;
                Ok(Some(invitation.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list(&self, filter: &InvitationFilter) -> Result<Vec<Invitation>, DomainError> {
        let state = self.state.read().await;
        let mut invitations: Vec<Invitation> = state
            .invitations
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invitations)
    }
}

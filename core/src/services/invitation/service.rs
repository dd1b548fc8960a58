//! Main invitation service implementation

use std::sync::Arc;

use ob_shared::utils::{
    check_password_policy, mask_email, normalize_email, normalize_phone_number,
};
use uuid::Uuid;
use validator::Validate;

use crate::clock::Clock;
use crate::domain::entities::invitation::{
    Invitation, InvitationFilter, InvitationView, NewInvitation, MAX_INVITATION_TTL_HOURS,
};
use crate::domain::entities::membership::{Membership, NewMembership};
use crate::domain::entities::user::{NewUser, User};
use crate::domain::entities::verification_code::VerificationKind;
use crate::domain::lifecycle::{expires_at_from, generate_invitation_token, hash_secret};
use crate::errors::{DomainError, DomainResult, InvitationError, ValidationError};
use crate::repositories::{
    InvitationRepository, MembershipRepository, Redemption, UserRepository,
};
use crate::services::verification::{EmailMessage, EmailServiceTrait};

use super::config::InvitationServiceConfig;
use super::traits::PasswordHasherTrait;
use super::types::{InvitationRequest, IssuedInvitation, RedeemRequest, RevokedInvitation};

/// Invitation service for issuing, redeeming, revoking and listing invitations
pub struct InvitationService<I, U, M, E, P, K>
where
    I: InvitationRepository + ?Sized,
    U: UserRepository + ?Sized,
    M: MembershipRepository + ?Sized,
    E: EmailServiceTrait + ?Sized,
    P: PasswordHasherTrait + ?Sized,
    K: Clock + ?Sized,
{
    invitations: Arc<I>,
    users: Arc<U>,
    memberships: Arc<M>,
    email_service: Arc<E>,
    password_hasher: Arc<P>,
    clock: Arc<K>,
    config: InvitationServiceConfig,
}

impl<I, U, M, E, P, K> InvitationService<I, U, M, E, P, K>
where
    I: InvitationRepository + ?Sized,
    U: UserRepository + ?Sized,
    M: MembershipRepository + ?Sized,
    E: EmailServiceTrait + ?Sized,
    P: PasswordHasherTrait + ?Sized,
    K: Clock + ?Sized,
{
    /// Create a new invitation service
    ///
    /// # Errors
    ///
    /// Returns a validation error when the default lifetime is out of range
    pub fn new(
        invitations: Arc<I>,
        users: Arc<U>,
        memberships: Arc<M>,
        email_service: Arc<E>,
        password_hasher: Arc<P>,
        clock: Arc<K>,
        config: InvitationServiceConfig,
    ) -> DomainResult<Self> {
        config.validate()?;
        Ok(Self {
            invitations,
            users,
            memberships,
            email_service,
            password_hasher,
            clock,
            config,
        })
    }

    pub fn config(&self) -> &InvitationServiceConfig {
        &self.config
    }

    /// Return the caller's first administrator membership, or `Forbidden`
    pub async fn require_admin(&self, user_id: Uuid) -> DomainResult<Membership> {
        let memberships = self.memberships.find_by_user_id(user_id).await?;
        memberships
            .into_iter()
            .find(Membership::is_admin)
            .ok_or_else(|| {
                tracing::warn!(
                    user_id = %user_id,
                    event = "invitation_admin_denied",
                    "Invitation management refused for non-admin"
                );
                DomainError::Forbidden {
                    action: "invitation management".to_string(),
                }
            })
    }

    /// Issue a new pending invitation on behalf of an administrator
    pub async fn issue_invitation(
        &self,
        inviter_id: Uuid,
        request: InvitationRequest,
    ) -> DomainResult<IssuedInvitation> {
        self.require_admin(inviter_id).await?;
        Self::validate_request(&request)?;

        let now = self.clock.now();
        let ttl_hours = request.expires_in_hours.unwrap_or(self.config.default_ttl_hours);
        let expires_at = expires_at_from(now, ttl_hours.saturating_mul(60));
        let secret = generate_invitation_token();

        let invitation = self
            .invitations
            .insert(NewInvitation {
                id: Uuid::new_v4(),
                token_hash: secret.hash.clone(),
                token_plaintext: secret.plaintext.clone(),
                email: normalize_email(&request.email),
                phone: request
                    .phone
                    .as_deref()
                    .map(normalize_phone_number)
                    .filter(|p| !p.is_empty()),
                first_name: request.first_name.trim().to_string(),
                last_name: request.last_name.trim().to_string(),
                department_id: request.department_id,
                position_id: request.position_id,
                invited_by: inviter_id,
                expires_at,
                created_at: now,
            })
            .await?;

        tracing::info!(
            invitation_id = %invitation.id,
            inviter_id = %inviter_id,
            email = %mask_email(&invitation.email),
            expires_at = %expires_at,
            event = "invitation_issued",
            "Issued invitation"
        );

        let register_url = self.register_url(&secret.plaintext);
        if request.deliver {
            self.deliver_invitation(&invitation, &register_url).await?;
        }

        Ok(IssuedInvitation {
            invitation_id: invitation.id,
            token: secret.plaintext.clone(),
            register_url,
            expires_at,
            delivered: request.deliver,
        })
    }

    /// Redeem an invitation token, creating the account and its membership
    pub async fn redeem_invitation(&self, request: RedeemRequest) -> DomainResult<User> {
        let token = request.token.trim();
        if token.is_empty() {
            return Err(ValidationError::RequiredField {
                field: "token".to_string(),
            }
            .into());
        }
        let policy = check_password_policy(&request.password);
        if !policy.is_ok() {
            tracing::info!(
                too_short = policy.too_short,
                missing_lower = policy.missing_lower,
                missing_upper = policy.missing_upper,
                missing_digit = policy.missing_digit,
                missing_symbol = policy.missing_symbol,
                event = "invitation_weak_password",
                "Redemption refused by password policy"
            );
            return Err(ValidationError::from(policy).into());
        }

        let now = self.clock.now();
        let invitation = self
            .invitations
            .find_pending_by_hash(&hash_secret(token), now)
            .await?
            .ok_or(InvitationError::NotFoundOrExpired)?;

        if self.users.find_by_email(&invitation.email).await?.is_some() {
            tracing::warn!(
                invitation_id = %invitation.id,
                email = %mask_email(&invitation.email),
                event = "invitation_user_exists",
                "Invitation redeemed for an existing account"
            );
            return Err(InvitationError::UserExists.into());
        }

        let password_hash = self
            .password_hasher
            .hash_password(&request.password)
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("password hashing failed: {}", e),
            })?;

        let user_id = Uuid::new_v4();
        let redemption = Redemption {
            invitation_id: invitation.id,
            user: NewUser {
                id: user_id,
                email: invitation.email.clone(),
                first_name: invitation.first_name.clone(),
                last_name: invitation.last_name.clone(),
                phone: invitation.phone.clone(),
                password_hash,
            },
            membership: NewMembership {
                user_id,
                department_id: invitation.department_id,
                position_id: invitation.position_id,
                role: self.config.member_role,
                assigned_by: invitation.invited_by,
            },
            accepted_at: now,
        };

        let user = self.invitations.redeem(redemption).await?.ok_or_else(|| {
            // Accepted, revoked or expired between lookup and commit
            tracing::info!(
                invitation_id = %invitation.id,
                event = "invitation_redeem_lost",
                "Invitation no longer pending at commit"
            );
            DomainError::from(InvitationError::NotFoundOrExpired)
        })?;

        tracing::info!(
            invitation_id = %invitation.id,
            user_id = %user.id,
            ip = request.metadata.ip.as_deref().unwrap_or("-"),
            event = "invitation_redeemed",
            "Invitation redeemed"
        );
        Ok(user)
    }

    /// Revoke a pending invitation
    pub async fn revoke_invitation(
        &self,
        admin_id: Uuid,
        invitation_id: Uuid,
    ) -> DomainResult<RevokedInvitation> {
        self.require_admin(admin_id).await?;

        let now = self.clock.now();
        let invitation = self
            .invitations
            .mark_revoked(invitation_id, now)
            .await?
            .ok_or(InvitationError::NotFoundOrExpired)?;

        tracing::info!(
            invitation_id = %invitation.id,
            admin_id = %admin_id,
            event = "invitation_revoked",
            "Invitation revoked"
        );

        Ok(RevokedInvitation {
            invitation_id: invitation.id,
            revoked_at: invitation.revoked_at.unwrap_or(now),
        })
    }

    /// Admin listing, newest first, with lazily derived statuses
    pub async fn list_invitations(
        &self,
        admin_id: Uuid,
        filter: InvitationFilter,
    ) -> DomainResult<Vec<InvitationView>> {
        self.require_admin(admin_id).await?;

        let now = self.clock.now();
        let invitations = self.invitations.list(&filter).await?;
        Ok(invitations
            .into_iter()
            .map(|invitation| InvitationView::from_invitation(invitation, now))
            .collect())
    }

    fn validate_request(request: &InvitationRequest) -> DomainResult<()> {
        if let Err(errors) = request.validate() {
            let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
            fields.sort_unstable();
            let error = match fields.first().copied() {
                Some("email") => ValidationError::InvalidEmail,
                Some("expires_in_hours") => ValidationError::OutOfRange {
                    field: "expires_in_hours".to_string(),
                    min: "1".to_string(),
                    max: MAX_INVITATION_TTL_HOURS.to_string(),
                },
                Some(field) => ValidationError::InvalidFormat {
                    field: field.to_string(),
                },
                None => ValidationError::InvalidFormat {
                    field: "invitation".to_string(),
                },
            };
            return Err(error.into());
        }

        for (field, value) in [
            ("first_name", &request.first_name),
            ("last_name", &request.last_name),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::RequiredField {
                    field: field.to_string(),
                }
                .into());
            }
        }
        Ok(())
    }

    fn register_url(&self, token: &str) -> String {
        format!(
            "{}/register?token={}",
            self.config.app_url.trim_end_matches('/'),
            token
        )
    }

    async fn deliver_invitation(
        &self,
        invitation: &Invitation,
        register_url: &str,
    ) -> DomainResult<()> {
        let to = self
            .config
            .email_override
            .clone()
            .unwrap_or_else(|| invitation.email.clone());
        let message = EmailMessage {
            to: to.clone(),
            subject: "You have been invited to register".to_string(),
            html: format!(
                "<p>You have been invited to register. Follow the link: \
                 <a href=\"{url}\">{url}</a></p>",
                url = register_url
            ),
            text: format!("You have been invited to register: {}", register_url),
        };

        let message_id = self
            .email_service
            .send_email(&message)
            .await
            .map_err(|e| {
                tracing::error!(
                    invitation_id = %invitation.id,
                    to = %mask_email(&to),
                    error = %e,
                    event = "invitation_email_failed",
                    "Failed to send invitation email"
                );
                DomainError::Delivery {
                    channel: VerificationKind::Email,
                    message: e,
                }
            })?;

        tracing::debug!(
            invitation_id = %invitation.id,
            message_id = %message_id,
            "Invitation email sent"
        );
        Ok(())
    }
}

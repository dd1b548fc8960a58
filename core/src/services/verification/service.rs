//! Main verification service implementation

use std::sync::Arc;

use ob_shared::utils::{mask_email, mask_phone_number};
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::entities::user::User;
use crate::domain::entities::verification_code::{
    NewVerificationCode, VerificationCode, VerificationKind, EMAIL_MAX_ATTEMPTS,
};
use crate::domain::lifecycle::{
    evaluate_attempt, expires_at_from, generate_email_token, generate_phone_code, hash_secret,
    is_rate_limited, window_start, AttemptInput, AttemptOutcome, GeneratedSecret,
};
use crate::domain::value_objects::RequestMetadata;
use crate::errors::{DomainError, DomainResult, ValidationError, VerificationErrorCode};
use crate::repositories::{UserRepository, VerificationCodeRepository};

use super::config::VerificationServiceConfig;
use super::traits::{EmailMessage, EmailServiceTrait, SmsServiceTrait};
use super::types::{
    ConfirmOutcome, IssueOutcome, IssueReceipt, Rejection, VerificationRequirements,
    VerificationStatus,
};

/// Verification service for email links and SMS codes
pub struct VerificationService<U, C, E, S, K>
where
    U: UserRepository + ?Sized,
    C: VerificationCodeRepository + ?Sized,
    E: EmailServiceTrait + ?Sized,
    S: SmsServiceTrait + ?Sized,
    K: Clock + ?Sized,
{
    users: Arc<U>,
    codes: Arc<C>,
    email_service: Arc<E>,
    sms_service: Arc<S>,
    clock: Arc<K>,
    config: VerificationServiceConfig,
}

impl<U, C, E, S, K> VerificationService<U, C, E, S, K>
where
    U: UserRepository + ?Sized,
    C: VerificationCodeRepository + ?Sized,
    E: EmailServiceTrait + ?Sized,
    S: SmsServiceTrait + ?Sized,
    K: Clock + ?Sized,
{
    /// Create a new verification service
    ///
    /// # Errors
    ///
    /// Returns a validation error when a configured lifetime is not positive
    pub fn new(
        users: Arc<U>,
        codes: Arc<C>,
        email_service: Arc<E>,
        sms_service: Arc<S>,
        clock: Arc<K>,
        config: VerificationServiceConfig,
    ) -> DomainResult<Self> {
        config.validate()?;
        Ok(Self {
            users,
            codes,
            email_service,
            sms_service,
            clock,
            config,
        })
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    /// Issue an email verification link for the account
    pub async fn request_email_verification(
        &self,
        user_id: Uuid,
        metadata: &RequestMetadata,
    ) -> DomainResult<IssueOutcome> {
        self.issue(user_id, VerificationKind::Email, metadata).await
    }

    /// Issue an SMS code to the phone number on the account
    pub async fn request_phone_verification(
        &self,
        user_id: Uuid,
        metadata: &RequestMetadata,
    ) -> DomainResult<IssueOutcome> {
        self.issue(user_id, VerificationKind::Phone, metadata).await
    }

    /// Confirm an email link token. Tokens are globally unique, so the
    /// record is found by hash alone.
    pub async fn confirm_email_verification(
        &self,
        token: &str,
        metadata: &RequestMetadata,
    ) -> DomainResult<ConfirmOutcome> {
        let provided_hash = Self::hash_input(token, "token")?;
        let record = self
            .codes
            .find_active_by_hash(VerificationKind::Email, &provided_hash)
            .await?;
        self.confirm(record, None, &provided_hash, metadata).await
    }

    /// Confirm an SMS code for the account. Codes are short and not unique,
    /// so only the newest active code for this user is considered.
    pub async fn confirm_phone_verification(
        &self,
        user_id: Uuid,
        code: &str,
        metadata: &RequestMetadata,
    ) -> DomainResult<ConfirmOutcome> {
        let provided_hash = Self::hash_input(code, "code")?;
        let user = self.load_user(user_id).await?;
        if user.is_verified(VerificationKind::Phone) {
            return Ok(ConfirmOutcome::AlreadyVerified {
                kind: VerificationKind::Phone,
            });
        }
        let record = self
            .codes
            .find_latest_active(user_id, VerificationKind::Phone)
            .await?;
        self.confirm(record, Some(user), &provided_hash, metadata)
            .await
    }

    /// Verified flags for an account
    pub async fn verification_status(&self, user_id: Uuid) -> DomainResult<VerificationStatus> {
        let user = self.load_user(user_id).await?;
        Ok(VerificationStatus {
            email_verified: user.is_verified(VerificationKind::Email),
            phone_verified: user.is_verified(VerificationKind::Phone),
            email_verified_at: user.email_verified_at,
            phone_verified_at: user.phone_verified_at,
        })
    }

    /// Requirements configured for guarded actions
    pub fn policy_requirements(&self) -> VerificationRequirements {
        VerificationRequirements {
            email: self.config.require_email_verified,
            phone: self.config.require_phone_verified,
        }
    }

    /// Fail with `VerificationRequired` unless every required channel is
    /// verified. Email is checked first.
    pub async fn ensure_verified(
        &self,
        user_id: Uuid,
        requirements: VerificationRequirements,
    ) -> DomainResult<()> {
        if !requirements.email && !requirements.phone {
            return Ok(());
        }
        let user = self.load_user(user_id).await?;
        for (required, kind) in [
            (requirements.email, VerificationKind::Email),
            (requirements.phone, VerificationKind::Phone),
        ] {
            if required && !user.is_verified(kind) {
                tracing::info!(
                    user_id = %user_id,
                    kind = %kind,
                    event = "verification_required",
                    "Action blocked until channel is verified"
                );
                return Err(DomainError::VerificationRequired { kind });
            }
        }
        Ok(())
    }

    async fn issue(
        &self,
        user_id: Uuid,
        kind: VerificationKind,
        metadata: &RequestMetadata,
    ) -> DomainResult<IssueOutcome> {
        let user = self.load_user(user_id).await?;

        if user.is_verified(kind) {
            return Ok(IssueOutcome::AlreadyVerified { kind });
        }

        let destination = self.destination(&user, kind)?;

        let now = self.clock.now();
        let issued = self
            .codes
            .count_recent(user.id, kind, window_start(now))
            .await?;
        if is_rate_limited(issued, u64::from(self.config.requests_per_hour)) {
            tracing::warn!(
                user_id = %user.id,
                kind = %kind,
                issued_in_window = issued,
                limit = self.config.requests_per_hour,
                event = "verification_rate_limited",
                "Verification request rate limit exceeded"
            );
            return Ok(IssueOutcome::RateLimited);
        }

        let (secret, ttl_minutes, max_attempts) = match kind {
            VerificationKind::Email => (
                generate_email_token(),
                self.config.email_ttl_minutes,
                EMAIL_MAX_ATTEMPTS,
            ),
            VerificationKind::Phone => (
                generate_phone_code(),
                self.config.phone_ttl_minutes,
                self.config.phone_max_attempts,
            ),
        };
        let expires_at = expires_at_from(now, ttl_minutes);

        let record = self
            .codes
            .replace_active(NewVerificationCode {
                id: Uuid::new_v4(),
                user_id: user.id,
                kind,
                sent_to: destination.clone(),
                token_hash: secret.hash.clone(),
                expires_at,
                max_attempts,
                requested_ip: metadata.ip.clone(),
                requested_user_agent: metadata.user_agent.clone(),
                created_at: now,
            })
            .await?;

        tracing::info!(
            user_id = %user.id,
            kind = %kind,
            code_id = %record.id,
            expires_at = %expires_at,
            event = "verification_issued",
            "Issued verification code"
        );

        let receipt = match kind {
            VerificationKind::Email => {
                let verify_url = self.verify_url(&secret);
                self.deliver_email(&destination, &verify_url).await?;
                IssueReceipt {
                    kind,
                    expires_at,
                    dev_code: None,
                    dev_verify_url: self.config.dev_mode.then_some(verify_url),
                }
            }
            VerificationKind::Phone => {
                self.deliver_sms(&destination, &secret.plaintext).await?;
                IssueReceipt {
                    kind,
                    expires_at,
                    dev_code: self.config.dev_mode.then(|| secret.plaintext.clone()),
                    dev_verify_url: None,
                }
            }
        };

        Ok(IssueOutcome::Issued(receipt))
    }

    /// Evaluate a candidate record; `owner` is the already loaded account
    /// when the caller identified it up front
    async fn confirm(
        &self,
        record: Option<VerificationCode>,
        owner: Option<User>,
        provided_hash: &str,
        metadata: &RequestMetadata,
    ) -> DomainResult<ConfirmOutcome> {
        let Some(record) = record else {
            return Ok(ConfirmOutcome::Rejected(Rejection::new(
                VerificationErrorCode::CodeInvalid,
            )));
        };

        let user = match owner {
            Some(user) => user,
            None => self.load_user(record.user_id).await?,
        };
        if user.is_verified(record.kind) {
            return Ok(ConfirmOutcome::AlreadyVerified { kind: record.kind });
        }

        let now = self.clock.now();
        let outcome = evaluate_attempt(&AttemptInput {
            stored_hash: &record.token_hash,
            provided_hash,
            attempts: record.attempts,
            max_attempts: record.max_attempts,
            expires_at: record.expires_at,
            used_at: record.used_at,
            now,
        });

        match outcome {
            AttemptOutcome::Verified => {
                let applied = self
                    .codes
                    .confirm(record.id, user.id, record.kind, now, metadata)
                    .await?;
                if !applied {
                    // Consumed by a concurrent confirmation or superseded
                    return Ok(ConfirmOutcome::Rejected(Rejection::new(
                        VerificationErrorCode::CodeInvalid,
                    )));
                }
                tracing::info!(
                    user_id = %user.id,
                    kind = %record.kind,
                    code_id = %record.id,
                    event = "verification_confirmed",
                    "Verification confirmed"
                );
                Ok(ConfirmOutcome::Verified { kind: record.kind })
            }
            AttemptOutcome::Invalid {
                next_attempts,
                max_attempts,
            } => {
                if next_attempts != record.attempts {
                    self.codes.update_attempts(record.id, next_attempts).await?;
                }
                tracing::warn!(
                    user_id = %user.id,
                    kind = %record.kind,
                    attempts = next_attempts,
                    max_attempts = max_attempts,
                    event = "verification_invalid",
                    "Invalid verification attempt"
                );
                Ok(ConfirmOutcome::Rejected(Rejection::with_attempts(
                    VerificationErrorCode::CodeInvalid,
                    next_attempts,
                    max_attempts,
                )))
            }
            AttemptOutcome::Expired => {
                tracing::info!(
                    user_id = %user.id,
                    kind = %record.kind,
                    event = "verification_expired",
                    "Verification code expired"
                );
                Ok(ConfirmOutcome::Rejected(Rejection::new(
                    VerificationErrorCode::CodeExpired,
                )))
            }
            AttemptOutcome::TooManyAttempts {
                attempts,
                max_attempts,
            } => {
                tracing::warn!(
                    user_id = %user.id,
                    kind = %record.kind,
                    attempts = attempts,
                    event = "verification_attempts_exhausted",
                    "Maximum verification attempts exceeded"
                );
                Ok(ConfirmOutcome::Rejected(Rejection::with_attempts(
                    VerificationErrorCode::TooManyAttempts,
                    attempts,
                    max_attempts,
                )))
            }
        }
    }

    async fn load_user(&self, user_id: Uuid) -> DomainResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                resource: format!("user {}", user_id),
            })
    }

    fn hash_input(secret: &str, field: &str) -> DomainResult<String> {
        if secret.trim().is_empty() {
            return Err(ValidationError::RequiredField {
                field: field.to_string(),
            }
            .into());
        }
        Ok(hash_secret(secret))
    }

    /// Address or number recorded as `sent_to`
    fn destination(&self, user: &User, kind: VerificationKind) -> DomainResult<String> {
        let contact = user
            .contact(kind)
            .ok_or_else(|| ValidationError::MissingContact {
                field: kind.as_str().to_string(),
            })?;
        if kind == VerificationKind::Phone && !self.sms_service.is_valid_phone_number(contact) {
            return Err(ValidationError::InvalidFormat {
                field: "phone".to_string(),
            }
            .into());
        }
        Ok(contact.to_string())
    }

    fn verify_url(&self, secret: &GeneratedSecret) -> String {
        format!(
            "{}/auth/email/verify?token={}",
            self.config.app_url.trim_end_matches('/'),
            secret.plaintext
        )
    }

    async fn deliver_email(&self, address: &str, verify_url: &str) -> DomainResult<()> {
        let to = self
            .config
            .email_override
            .clone()
            .unwrap_or_else(|| address.to_string());
        let message = EmailMessage {
            to: to.clone(),
            subject: "Verify your email address".to_string(),
            html: format!(
                "<p>Confirm your email address by opening the link below.</p>\
                 <p><a href=\"{url}\">{url}</a></p>\
                 <p>The link expires in {ttl} minutes.</p>",
                url = verify_url,
                ttl = self.config.email_ttl_minutes
            ),
            text: format!(
                "Confirm your email address: {}\nThe link expires in {} minutes.",
                verify_url, self.config.email_ttl_minutes
            ),
        };

        let message_id = self
            .email_service
            .send_email(&message)
            .await
            .map_err(|e| {
                tracing::error!(
                    to = %mask_email(&to),
                    error = %e,
                    event = "verification_email_failed",
                    "Failed to send verification email"
                );
                DomainError::Delivery {
                    channel: VerificationKind::Email,
                    message: e,
                }
            })?;

        tracing::debug!(to = %mask_email(&to), message_id = %message_id, "Verification email sent");
        Ok(())
    }

    async fn deliver_sms(&self, phone: &str, code: &str) -> DomainResult<()> {
        let body = format!(
            "Your verification code is {}. It expires in {} minutes.",
            code, self.config.phone_ttl_minutes
        );
        let message_id = self
            .sms_service
            .send_sms(phone, &body)
            .await
            .map_err(|e| {
                tracing::error!(
                    phone = %mask_phone_number(phone),
                    error = %e,
                    event = "verification_sms_failed",
                    "Failed to send verification SMS"
                );
                DomainError::Delivery {
                    channel: VerificationKind::Phone,
                    message: e,
                }
            })?;

        tracing::debug!(
            phone = %mask_phone_number(phone),
            message_id = %message_id,
            "Verification SMS sent"
        );
        Ok(())
    }
}

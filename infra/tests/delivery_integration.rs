//! Onboarding flow wired with the infrastructure delivery adapters and the
//! bcrypt hasher, backed by the in-memory store

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

use ob_core::clock::{Clock, FixedClock};
use ob_core::domain::entities::membership::{Membership, MembershipRole};
use ob_core::domain::value_objects::RequestMetadata;
use ob_core::repositories::InMemoryStore;
use ob_core::services::invitation::{
    InvitationRequest, InvitationService, InvitationServiceConfig, RedeemRequest,
};
use ob_core::services::verification::{
    ConfirmOutcome, IssueOutcome, VerificationService, VerificationServiceConfig,
};
use ob_infra::email::MockEmailService;
use ob_infra::security::BcryptPasswordHasher;
use ob_infra::sms::MockSmsService;
use ob_infra::{create_delivery, effective_verification_config, load_config};
use ob_shared::config::{AppConfig, Environment};

fn invitation_request() -> InvitationRequest {
    InvitationRequest {
        email: "Grace.Hopper@Example.com".to_string(),
        phone: Some("+1 (415) 555-2671".to_string()),
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        department_id: Uuid::new_v4(),
        position_id: Uuid::new_v4(),
        expires_in_hours: None,
        deliver: true,
    }
}

#[tokio::test]
async fn test_onboarding_with_mock_providers() {
    let store = Arc::new(InMemoryStore::new());
    let email = Arc::new(MockEmailService::with_options(false, false));
    let sms = Arc::new(MockSmsService::with_options(false, false));
    let hasher = Arc::new(BcryptPasswordHasher::new(4).unwrap());
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 11, 4, 10, 0, 0).unwrap(),
    ));

    let admin_id = Uuid::new_v4();
    store
        .put_membership(Membership {
            user_id: admin_id,
            department_id: Uuid::new_v4(),
            position_id: Uuid::new_v4(),
            role: Some(MembershipRole::Admin),
            assigned_by: None,
            assigned_at: clock.now(),
        })
        .await;

    let invitations = InvitationService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        email.clone(),
        hasher.clone(),
        clock.clone(),
        InvitationServiceConfig {
            app_url: "https://app.example.com".to_string(),
            ..InvitationServiceConfig::default()
        },
    )
    .unwrap();
    let verification = VerificationService::new(
        store.clone(),
        store.clone(),
        email.clone(),
        sms.clone(),
        clock.clone(),
        VerificationServiceConfig {
            app_url: "https://app.example.com".to_string(),
            ..VerificationServiceConfig::default()
        },
    )
    .unwrap();

    let issued = invitations
        .issue_invitation(admin_id, invitation_request())
        .await
        .unwrap();
    let invite_mail = email.last_message().unwrap();
    assert_eq!(invite_mail.to, "grace.hopper@example.com");
    assert!(invite_mail.text.contains(&issued.register_url));

    let metadata = RequestMetadata::new(Some("198.51.100.4".to_string()), Some("test".to_string()));
    let user = invitations
        .redeem_invitation(RedeemRequest {
            token: issued.token.clone(),
            password: "Hunter2-but-longer".to_string(),
            metadata: metadata.clone(),
        })
        .await
        .unwrap();
    assert_eq!(user.phone.as_deref(), Some("+14155552671"));
    assert!(hasher
        .verify("Hunter2-but-longer", &user.password_hash)
        .await
        .unwrap());

    // Email link, read back from the mock outbox
    let outcome = verification
        .request_email_verification(user.id, &metadata)
        .await
        .unwrap();
    let receipt = match outcome {
        IssueOutcome::Issued(receipt) => receipt,
        other => panic!("unexpected {:?}", other),
    };
    assert!(receipt.dev_verify_url.is_none());
    let mail = email.last_message().unwrap();
    let token = mail
        .text
        .split("token=")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap()
        .to_string();

    clock.advance(Duration::minutes(5));
    let confirmed = verification
        .confirm_email_verification(&token, &metadata)
        .await
        .unwrap();
    assert!(matches!(confirmed, ConfirmOutcome::Verified { .. }));

    // SMS code, read back from the mock outbox
    verification
        .request_phone_verification(user.id, &metadata)
        .await
        .unwrap();
    let (to, body) = sms.last_message().unwrap();
    assert_eq!(to, "+14155552671");
    let code: String = body.chars().filter(|c| c.is_ascii_digit()).take(6).collect();
    assert_eq!(code.len(), 6);

    let confirmed = verification
        .confirm_phone_verification(user.id, &code, &metadata)
        .await
        .unwrap();
    assert!(matches!(confirmed, ConfirmOutcome::Verified { .. }));

    let status = verification.verification_status(user.id).await.unwrap();
    assert!(status.email_verified);
    assert!(status.phone_verified);
    assert_eq!(email.get_message_count(), 2);
    assert_eq!(sms.get_message_count(), 1);
}

#[tokio::test]
async fn test_default_config_uses_mock_delivery() {
    let (email, sms) = create_delivery(&AppConfig::default());

    assert!(sms.is_valid_phone_number("+14155552671"));
    assert!(!sms.is_valid_phone_number("555-2671"));
    let id = sms.send_sms("+14155552671", "hello").await.unwrap();
    assert!(id.starts_with("mock_"));
    assert!(email
        .send_email(&ob_core::services::verification::EmailMessage {
            to: "a@example.com".to_string(),
            subject: "s".to_string(),
            html: String::new(),
            text: String::new(),
        })
        .await
        .is_ok());
}

#[test]
fn test_dev_mode_is_disabled_in_production() {
    let mut config = AppConfig::production();
    config.verification.dev_mode = true;
    assert!(!effective_verification_config(&config).dev_mode);

    let mut config = AppConfig::development();
    config.environment = Environment::Development;
    assert!(effective_verification_config(&config).dev_mode);
}

#[test]
fn test_load_config_without_dotenv() {
    let config = load_config();
    assert!(config.verification.requests_per_hour > 0);
}

//! Unit tests for invitation service

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::{Clock, FixedClock};
use crate::domain::entities::invitation::{InvitationFilter, InvitationStatus};
use crate::domain::entities::membership::MembershipRole;
use crate::domain::lifecycle::hash_secret;
use crate::domain::value_objects::RequestMetadata;
use crate::errors::{DomainError, InvitationError, ValidationError};
use crate::repositories::InMemoryStore;
use crate::services::invitation::{
    InvitationRequest, InvitationService, InvitationServiceConfig, RedeemRequest,
};

use super::mocks::{membership, MockEmailService, MockPasswordHasher};

type TestService = InvitationService<
    InMemoryStore,
    InMemoryStore,
    InMemoryStore,
    MockEmailService,
    MockPasswordHasher,
    FixedClock,
>;

struct Harness {
    store: Arc<InMemoryStore>,
    email: Arc<MockEmailService>,
    hasher: Arc<MockPasswordHasher>,
    clock: Arc<FixedClock>,
    service: Arc<TestService>,
    admin_id: Uuid,
}

async fn harness_with(config: InvitationServiceConfig, email_fails: bool) -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let email = Arc::new(MockEmailService::new(email_fails));
    let hasher = Arc::new(MockPasswordHasher::new(false));
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap(),
    ));
    let admin_id = Uuid::new_v4();
    store
        .put_membership(membership(admin_id, Some(MembershipRole::Admin)))
        .await;

    let service = InvitationService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        email.clone(),
        hasher.clone(),
        clock.clone(),
        config,
    )
    .unwrap();

    Harness {
        store,
        email,
        hasher,
        clock,
        service: Arc::new(service),
        admin_id,
    }
}

async fn harness() -> Harness {
    harness_with(InvitationServiceConfig::default(), false).await
}

fn request(email: &str) -> InvitationRequest {
    InvitationRequest {
        email: email.to_string(),
        phone: Some("+1 (415) 555-2671".to_string()),
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        department_id: Uuid::new_v4(),
        position_id: Uuid::new_v4(),
        expires_in_hours: None,
        deliver: false,
    }
}

fn redeem(token: &str) -> RedeemRequest {
    RedeemRequest {
        token: token.to_string(),
        password: "Correct horse battery 9".to_string(),
        metadata: RequestMetadata::new(Some("198.51.100.4".to_string()), None),
    }
}

fn is_not_found_or_expired(err: &DomainError) -> bool {
    matches!(
        err,
        DomainError::Invitation(InvitationError::NotFoundOrExpired)
    )
}

#[tokio::test]
async fn test_issue_invitation_stores_hash_and_returns_token_once() {
    let h = harness().await;

    let issued = h
        .service
        .issue_invitation(h.admin_id, request("Grace@Example.com"))
        .await
        .unwrap();

    assert_eq!(issued.token.len(), 64);
    assert_eq!(issued.expires_at, h.clock.now() + Duration::hours(72));
    assert_eq!(
        issued.register_url,
        format!("http://localhost:3000/register?token={}", issued.token)
    );
    assert!(!issued.delivered);
    assert_eq!(h.email.sent_count(), 0);

    let stored = h.store.invitation(issued.invitation_id).await.unwrap();
    assert_eq!(stored.token_hash, hash_secret(&issued.token));
    assert_eq!(stored.email, "grace@example.com");
    assert_eq!(stored.phone.as_deref(), Some("+14155552671"));
    assert_eq!(stored.status, InvitationStatus::Pending);
    assert_eq!(stored.invited_by, h.admin_id);
    assert!(!format!("{:?}", issued).contains(&issued.token));
}

#[tokio::test]
async fn test_issue_invitation_requires_admin() {
    let h = harness().await;
    let member = Uuid::new_v4();
    h.store.put_membership(membership(member, None)).await;

    let err = h
        .service
        .issue_invitation(member, request("grace@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    let err = h
        .service
        .issue_invitation(Uuid::new_v4(), request("grace@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "forbidden");

    let all = h
        .service
        .list_invitations(h.admin_id, InvitationFilter::default())
        .await
        .unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_issue_invitation_validates_request() {
    let h = harness().await;

    let err = h
        .service
        .issue_invitation(h.admin_id, request("not-an-email"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::InvalidEmail)
    ));

    let mut zero_ttl = request("grace@example.com");
    zero_ttl.expires_in_hours = Some(0);
    let err = h
        .service
        .issue_invitation(h.admin_id, zero_ttl)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::OutOfRange { .. })
    ));

    let mut blank_name = request("grace@example.com");
    blank_name.first_name = "   ".to_string();
    let err = h
        .service
        .issue_invitation(h.admin_id, blank_name)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::RequiredField { .. })
    ));
}

#[tokio::test]
async fn test_issue_invitation_with_delivery() {
    let config = InvitationServiceConfig {
        app_url: "https://onboard.example.com/".to_string(),
        ..InvitationServiceConfig::default()
    };
    let h = harness_with(config, false).await;
    let mut req = request("grace@example.com");
    req.deliver = true;
    req.expires_in_hours = Some(1);

    let issued = h.service.issue_invitation(h.admin_id, req).await.unwrap();

    assert!(issued.delivered);
    assert_eq!(issued.expires_at, h.clock.now() + Duration::hours(1));
    let message = h.email.last().unwrap();
    assert_eq!(message.to, "grace@example.com");
    assert!(message
        .text
        .contains("https://onboard.example.com/register?token="));
    assert_eq!(h.email.last_token().unwrap(), issued.token);
}

#[tokio::test]
async fn test_invitation_email_override() {
    let config = InvitationServiceConfig {
        email_override: Some("qa-inbox@example.com".to_string()),
        ..InvitationServiceConfig::default()
    };
    let h = harness_with(config, false).await;
    let mut req = request("grace@example.com");
    req.deliver = true;

    let issued = h.service.issue_invitation(h.admin_id, req).await.unwrap();

    assert_eq!(h.email.last().unwrap().to, "qa-inbox@example.com");
    let stored = h.store.invitation(issued.invitation_id).await.unwrap();
    assert_eq!(stored.email, "grace@example.com");
}

#[tokio::test]
async fn test_invitation_delivery_failure_keeps_invitation() {
    let h = harness_with(InvitationServiceConfig::default(), true).await;
    let mut req = request("grace@example.com");
    req.deliver = true;

    let err = h
        .service
        .issue_invitation(h.admin_id, req)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Delivery { .. }));

    let pending = h
        .service
        .list_invitations(
            h.admin_id,
            InvitationFilter::parse(Some("pending"), None).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert!(pending[0].token.is_some());
}

#[tokio::test]
async fn test_redeem_creates_account_and_membership() {
    let h = harness().await;
    let req = request("grace@example.com");
    let (department_id, position_id) = (req.department_id, req.position_id);
    let issued = h.service.issue_invitation(h.admin_id, req).await.unwrap();

    h.clock.advance(Duration::hours(1));
    let user = h
        .service
        .redeem_invitation(redeem(&format!("  {}  ", issued.token)))
        .await
        .unwrap();

    assert_eq!(user.email, "grace@example.com");
    assert_eq!(user.first_name, "Grace");
    assert_eq!(user.phone.as_deref(), Some("+14155552671"));
    assert_eq!(user.password_hash, "hashed:Correct horse battery 9");
    assert!(user.email_verified_at.is_none());

    let memberships = h.store.memberships_of(user.id).await;
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0].department_id, department_id);
    assert_eq!(memberships[0].position_id, position_id);
    assert_eq!(memberships[0].role, Some(MembershipRole::Manager));
    assert_eq!(memberships[0].assigned_by, Some(h.admin_id));

    let stored = h.store.invitation(issued.invitation_id).await.unwrap();
    assert_eq!(stored.status, InvitationStatus::Accepted);
    assert_eq!(stored.accepted_at, Some(h.clock.now()));
    assert_eq!(stored.consumed_by_user_id, Some(user.id));
    assert!(stored.token_plaintext.is_none());

    // Single use
    let err = h
        .service
        .redeem_invitation(redeem(&issued.token))
        .await
        .unwrap_err();
    assert!(is_not_found_or_expired(&err));
}

#[tokio::test]
async fn test_redeem_after_expiry_is_not_found_or_expired() {
    let h = harness().await;
    let mut req = request("grace@example.com");
    req.expires_in_hours = Some(72);
    let issued = h.service.issue_invitation(h.admin_id, req).await.unwrap();

    h.clock.advance(Duration::hours(72) + Duration::seconds(1));
    let err = h
        .service
        .redeem_invitation(redeem(&issued.token))
        .await
        .unwrap_err();

    assert!(is_not_found_or_expired(&err));
    assert_eq!(err.error_code(), "invitation_not_found_or_expired");
    assert_eq!(h.hasher.call_count(), 0);
    // Expiry is derived on read; the stored row is untouched
    let stored = h.store.invitation(issued.invitation_id).await.unwrap();
    assert_eq!(stored.status, InvitationStatus::Pending);

    let views = h
        .service
        .list_invitations(h.admin_id, InvitationFilter::default())
        .await
        .unwrap();
    assert_eq!(views[0].status, InvitationStatus::Expired);
    assert!(views[0].token.is_none());
}

#[tokio::test]
async fn test_redeem_rejects_unknown_and_blank_tokens() {
    let h = harness().await;

    let err = h
        .service
        .redeem_invitation(redeem("ab".repeat(32).as_str()))
        .await
        .unwrap_err();
    assert!(is_not_found_or_expired(&err));

    let err = h.service.redeem_invitation(redeem(" ")).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::RequiredField { .. })
    ));

    let issued = h
        .service
        .issue_invitation(h.admin_id, request("grace@example.com"))
        .await
        .unwrap();
    let mut no_password = redeem(&issued.token);
    no_password.password = String::new();
    let err = h.service.redeem_invitation(no_password).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::WeakPassword {
            too_short: true,
            missing_lower: true,
            missing_upper: true,
            missing_digit: true,
            missing_symbol: true,
        })
    ));
}

#[tokio::test]
async fn test_redeem_reports_each_failed_password_rule() {
    let h = harness().await;
    let issued = h
        .service
        .issue_invitation(h.admin_id, request("grace@example.com"))
        .await
        .unwrap();

    let cases = [
        ("Short-pw-1", (true, false, false, false, false)),
        ("ALL-UPPER-CASE-1", (false, true, false, false, false)),
        ("all-lower-case-1", (false, false, true, false, false)),
        ("No-Digits-At-All", (false, false, false, true, false)),
        ("NoSymbolsHere1234", (false, false, false, false, true)),
    ];

    for (password, expected) in cases {
        let mut req = redeem(&issued.token);
        req.password = password.to_string();
        let err = h.service.redeem_invitation(req).await.unwrap_err();
        assert_eq!(err.error_code(), "weak_password", "password {:?}", password);
        match err {
            DomainError::Validation(ValidationError::WeakPassword {
                too_short,
                missing_lower,
                missing_upper,
                missing_digit,
                missing_symbol,
            }) => assert_eq!(
                (too_short, missing_lower, missing_upper, missing_digit, missing_symbol),
                expected,
                "password {:?}",
                password
            ),
            other => panic!("unexpected error for {:?}: {:?}", password, other),
        }
    }
}

#[tokio::test]
async fn test_weak_password_leaves_invitation_pending_and_writes_nothing() {
    let h = harness().await;
    let issued = h
        .service
        .issue_invitation(h.admin_id, request("grace@example.com"))
        .await
        .unwrap();

    let mut weak = redeem(&issued.token);
    weak.password = "password".to_string();
    h.service.redeem_invitation(weak).await.unwrap_err();

    assert_eq!(h.hasher.call_count(), 0);
    assert_eq!(h.store.user_count().await, 0);
    let stored = h.store.invitation(issued.invitation_id).await.unwrap();
    assert_eq!(stored.status, InvitationStatus::Pending);
    assert!(stored.consumed_by_user_id.is_none());

    // The same token still redeems with a compliant password
    let user = h
        .service
        .redeem_invitation(redeem(&issued.token))
        .await
        .unwrap();
    assert_eq!(user.email, "grace@example.com");
}

#[tokio::test]
async fn test_redeem_for_existing_account_is_rejected() {
    let h = harness().await;
    let first = h
        .service
        .issue_invitation(h.admin_id, request("grace@example.com"))
        .await
        .unwrap();
    let second = h
        .service
        .issue_invitation(h.admin_id, request("grace@example.com"))
        .await
        .unwrap();

    h.service
        .redeem_invitation(redeem(&first.token))
        .await
        .unwrap();
    let err = h
        .service
        .redeem_invitation(redeem(&second.token))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::Invitation(InvitationError::UserExists)
    ));
    assert_eq!(h.store.user_count().await, 1);
    let stored = h.store.invitation(second.invitation_id).await.unwrap();
    assert_eq!(stored.status, InvitationStatus::Pending);
}

#[tokio::test]
async fn test_concurrent_redeem_has_single_winner() {
    let h = harness().await;
    let issued = h
        .service
        .issue_invitation(h.admin_id, request("grace@example.com"))
        .await
        .unwrap();

    // Both calls pass the pending lookup before either commits
    let (first, second) = tokio::join!(
        h.service.redeem_invitation(redeem(&issued.token)),
        h.service.redeem_invitation(redeem(&issued.token)),
    );

    assert_eq!(h.hasher.call_count(), 2);
    let (winner, loser) = match (first, second) {
        (Ok(user), Err(err)) | (Err(err), Ok(user)) => (user, err),
        other => panic!("expected exactly one winner, got {:?}", other),
    };
    assert!(is_not_found_or_expired(&loser));
    assert_eq!(h.store.user_count().await, 1);
    assert_eq!(h.store.memberships_of(winner.id).await.len(), 1);

    let stored = h.store.invitation(issued.invitation_id).await.unwrap();
    assert_eq!(stored.consumed_by_user_id, Some(winner.id));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_redeem_creates_one_account() {
    let h = harness().await;
    let issued = h
        .service
        .issue_invitation(h.admin_id, request("grace@example.com"))
        .await
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = h.service.clone();
            let token = issued.token.clone();
            tokio::spawn(async move { service.redeem_invitation(redeem(&token)).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(err) => assert!(matches!(err, DomainError::Invitation(_))),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(h.store.user_count().await, 1);
}

#[tokio::test]
async fn test_revoke_is_terminal() {
    let h = harness().await;
    let issued = h
        .service
        .issue_invitation(h.admin_id, request("grace@example.com"))
        .await
        .unwrap();

    h.clock.advance(Duration::minutes(5));
    let revoked = h
        .service
        .revoke_invitation(h.admin_id, issued.invitation_id)
        .await
        .unwrap();
    assert_eq!(revoked.invitation_id, issued.invitation_id);
    assert_eq!(revoked.revoked_at, h.clock.now());

    let stored = h.store.invitation(issued.invitation_id).await.unwrap();
    assert_eq!(stored.status, InvitationStatus::Revoked);
    assert!(stored.token_plaintext.is_none());

    h.clock.advance(Duration::minutes(5));
    let err = h
        .service
        .revoke_invitation(h.admin_id, issued.invitation_id)
        .await
        .unwrap_err();
    assert!(is_not_found_or_expired(&err));
    let unchanged = h.store.invitation(issued.invitation_id).await.unwrap();
    assert_eq!(unchanged, stored);

    let err = h
        .service
        .redeem_invitation(redeem(&issued.token))
        .await
        .unwrap_err();
    assert!(is_not_found_or_expired(&err));
}

#[tokio::test]
async fn test_revoke_requires_admin_and_known_invitation() {
    let h = harness().await;

    let err = h
        .service
        .revoke_invitation(h.admin_id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(is_not_found_or_expired(&err));

    let issued = h
        .service
        .issue_invitation(h.admin_id, request("grace@example.com"))
        .await
        .unwrap();
    let err = h
        .service
        .revoke_invitation(Uuid::new_v4(), issued.invitation_id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));
}

#[tokio::test]
async fn test_list_invitations_filters_and_exposes_pending_tokens() {
    let h = harness().await;
    let first = h
        .service
        .issue_invitation(h.admin_id, request("alice@example.com"))
        .await
        .unwrap();
    h.clock.advance(Duration::minutes(1));
    let second = h
        .service
        .issue_invitation(h.admin_id, request("bob@corp.example.com"))
        .await
        .unwrap();
    h.service
        .revoke_invitation(h.admin_id, first.invitation_id)
        .await
        .unwrap();

    let all = h
        .service
        .list_invitations(h.admin_id, InvitationFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second.invitation_id);
    assert_eq!(all[0].token.as_deref(), Some(second.token.as_str()));
    assert_eq!(all[1].status, InvitationStatus::Revoked);
    assert!(all[1].token.is_none());

    let corp = h
        .service
        .list_invitations(h.admin_id, InvitationFilter::parse(None, Some("CORP")).unwrap())
        .await
        .unwrap();
    assert_eq!(corp.len(), 1);
    assert_eq!(corp[0].email, "bob@corp.example.com");

    let err = h
        .service
        .list_invitations(Uuid::new_v4(), InvitationFilter::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));
}

#[tokio::test]
async fn test_require_admin_returns_admin_membership() {
    let h = harness().await;
    let manager = Uuid::new_v4();
    h.store.put_membership(membership(manager, None)).await;
    h.store
        .put_membership(membership(manager, Some(MembershipRole::Manager)))
        .await;

    let found = h.service.require_admin(manager).await.unwrap();
    assert_eq!(found.role, Some(MembershipRole::Manager));
}

#[tokio::test]
async fn test_invalid_default_ttl_rejected_at_construction() {
    let store = Arc::new(InMemoryStore::new());
    let result = InvitationService::new(
        store.clone(),
        store.clone(),
        store,
        Arc::new(MockEmailService::new(false)),
        Arc::new(MockPasswordHasher::new(false)),
        Arc::new(FixedClock::new(Utc::now())),
        InvitationServiceConfig {
            default_ttl_hours: -1,
            ..InvitationServiceConfig::default()
        },
    );
    assert!(matches!(
        result,
        Err(DomainError::Validation(ValidationError::InvalidTtl { .. }))
    ));
}

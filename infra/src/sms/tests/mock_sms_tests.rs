//! Tests for the mock SMS service

use ob_core::services::verification::SmsServiceTrait;

use crate::sms::MockSmsService;

#[tokio::test]
async fn test_mock_sms_send_success() {
    let service = MockSmsService::with_options(false, false);
    let result = service.send_sms("+14155552671", "Your code is 123456").await;

    let message_id = result.unwrap();
    assert!(message_id.starts_with("mock_"));
    assert_eq!(service.get_message_count(), 1);
    assert_eq!(
        service.last_message(),
        Some(("+14155552671".to_string(), "Your code is 123456".to_string()))
    );
}

#[tokio::test]
async fn test_mock_sms_invalid_phone() {
    let service = MockSmsService::with_options(false, false);
    let result = service.send_sms("4155552671", "Test message").await;

    let err = result.unwrap_err();
    assert!(err.contains("Invalid phone number"));
    assert_eq!(service.get_message_count(), 0);
}

#[tokio::test]
async fn test_mock_sms_simulate_failure() {
    let mut service = MockSmsService::with_options(false, false);
    service.set_simulate_failure(true);

    let result = service.send_sms("+14155552671", "Test message").await;
    assert!(result.unwrap_err().contains("Simulated"));
    assert!(service.last_message().is_none());
}

#[tokio::test]
async fn test_mock_sms_counter() {
    let service = MockSmsService::with_options(false, false);

    for i in 1..=3 {
        service
            .send_sms("+14155552671", &format!("Message {}", i))
            .await
            .unwrap();
        assert_eq!(service.get_message_count(), i);
    }

    service.reset_counter();
    assert_eq!(service.get_message_count(), 0);
}

#[tokio::test]
async fn test_clones_share_counter() {
    let service = MockSmsService::with_options(false, false);
    let clone = service.clone();

    clone.send_sms("+14155552671", "hello").await.unwrap();
    assert_eq!(service.get_message_count(), 1);
}

#[test]
fn test_trait_phone_validation() {
    let service = MockSmsService::new();
    assert!(service.is_valid_phone_number("+14155552671"));
    assert!(!service.is_valid_phone_number("not a number"));
}

//! Phone number helpers shared by the SMS providers

use phonenumber::{Mode, PhoneNumber};

use crate::InfrastructureError;

pub use ob_shared::utils::mask_phone_number;

/// Longest message body accepted by the providers
pub const MAX_SMS_LENGTH: usize = 1600;

/// Validate phone number format (E.164)
///
/// ```ignore
/// assert!(is_valid_phone_number("+14155552671"));
/// assert!(!is_valid_phone_number("4155552671")); // Missing '+'
/// ```
pub fn is_valid_phone_number(phone: &str) -> bool {
    ob_shared::utils::is_valid_international_phone(phone)
}

/// Parse a number and render it in canonical E.164 form
pub fn to_e164(phone: &str) -> Result<String, InfrastructureError> {
    let normalized = ob_shared::utils::normalize_phone_number(phone);
    if !normalized.starts_with('+') {
        return Err(InfrastructureError::Sms(
            "Phone number must be in E.164 format (e.g., +14155552671)".to_string(),
        ));
    }

    let parsed = normalized
        .parse::<PhoneNumber>()
        .map_err(|e| InfrastructureError::Sms(format!("Invalid phone number format: {}", e)))?;
    Ok(parsed.format().mode(Mode::E164).to_string())
}

/// Reject bodies the providers would refuse
pub fn check_message_length(message: &str) -> Result<(), InfrastructureError> {
    if message.chars().count() > MAX_SMS_LENGTH {
        return Err(InfrastructureError::Sms(format!(
            "Message exceeds maximum length of {} characters",
            MAX_SMS_LENGTH
        )));
    }
    Ok(())
}

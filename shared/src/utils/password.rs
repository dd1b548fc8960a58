//! Password strength rules applied before an account is created

use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum password length in characters
pub const MIN_PASSWORD_LENGTH: usize = 12;

static LOWERCASE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]").unwrap());
static UPPERCASE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]").unwrap());
static DIGIT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]").unwrap());
static SYMBOL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]").unwrap());

/// Per-rule result of a policy check; every flag `false` means the password passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PasswordPolicyReport {
    pub too_short: bool,
    pub missing_lower: bool,
    pub missing_upper: bool,
    pub missing_digit: bool,
    pub missing_symbol: bool,
}

impl PasswordPolicyReport {
    pub fn is_ok(&self) -> bool {
        !(self.too_short
            || self.missing_lower
            || self.missing_upper
            || self.missing_digit
            || self.missing_symbol)
    }
}

/// Check a password against the length and character-class rules
pub fn check_password_policy(password: &str) -> PasswordPolicyReport {
    PasswordPolicyReport {
        too_short: password.chars().count() < MIN_PASSWORD_LENGTH,
        missing_lower: !LOWERCASE_REGEX.is_match(password),
        missing_upper: !UPPERCASE_REGEX.is_match(password),
        missing_digit: !DIGIT_REGEX.is_match(password),
        missing_symbol: !SYMBOL_REGEX.is_match(password),
    }
}

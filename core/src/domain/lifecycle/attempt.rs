//! Decides the outcome of a single confirmation attempt

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::hashing::hashes_match;
use crate::errors::VerificationErrorCode;

/// Snapshot of a stored secret plus the caller's guess
#[derive(Debug, Clone)]
pub struct AttemptInput<'a> {
    pub stored_hash: &'a str,
    pub provided_hash: &'a str,
    pub attempts: u32,
    pub max_attempts: u32,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Verified,
    /// `next_attempts` is what the caller should persist
    Invalid {
        next_attempts: u32,
        max_attempts: u32,
    },
    Expired,
    TooManyAttempts {
        attempts: u32,
        max_attempts: u32,
    },
}

impl AttemptOutcome {
    /// Response code for a rejected attempt, `None` when verified
    pub fn error_code(&self) -> Option<VerificationErrorCode> {
        match self {
            AttemptOutcome::Verified => None,
            AttemptOutcome::Invalid { .. } => Some(VerificationErrorCode::CodeInvalid),
            AttemptOutcome::Expired => Some(VerificationErrorCode::CodeExpired),
            AttemptOutcome::TooManyAttempts { .. } => Some(VerificationErrorCode::TooManyAttempts),
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, AttemptOutcome::Verified)
    }
}

/// Classify an attempt. Checks run in a fixed order and the first match wins:
/// used, expired, attempt cap, hash mismatch, verified.
///
/// A used record reports `Invalid` with the attempt counter unchanged, so
/// replaying a consumed secret never burns attempts.
pub fn evaluate_attempt(input: &AttemptInput<'_>) -> AttemptOutcome {
    if input.used_at.is_some() {
        return AttemptOutcome::Invalid {
            next_attempts: input.attempts,
            max_attempts: input.max_attempts,
        };
    }

    if input.now >= input.expires_at {
        return AttemptOutcome::Expired;
    }

    if input.attempts >= input.max_attempts {
        return AttemptOutcome::TooManyAttempts {
            attempts: input.attempts,
            max_attempts: input.max_attempts,
        };
    }

    if !hashes_match(input.stored_hash, input.provided_hash) {
        return AttemptOutcome::Invalid {
            next_attempts: input.attempts.saturating_add(1).min(input.max_attempts),
            max_attempts: input.max_attempts,
        };
    }

    AttemptOutcome::Verified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lifecycle::hashing::hash_secret;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn input<'a>(stored: &'a str, provided: &'a str) -> AttemptInput<'a> {
        AttemptInput {
            stored_hash: stored,
            provided_hash: provided,
            attempts: 0,
            max_attempts: 5,
            expires_at: now() + Duration::minutes(10),
            used_at: None,
            now: now(),
        }
    }

    #[test]
    fn test_matching_hash_verifies() {
        let h = hash_secret("123456");
        assert_eq!(evaluate_attempt(&input(&h, &h)), AttemptOutcome::Verified);
    }

    #[test]
    fn test_mismatch_increments() {
        let stored = hash_secret("123456");
        let provided = hash_secret("000000");
        let mut attempt = input(&stored, &provided);
        attempt.attempts = 2;

        assert_eq!(
            evaluate_attempt(&attempt),
            AttemptOutcome::Invalid {
                next_attempts: 3,
                max_attempts: 5
            }
        );
    }

    #[test]
    fn test_used_dominates_everything() {
        let h = hash_secret("123456");
        let mut attempt = input(&h, &h);
        attempt.used_at = Some(now() - Duration::minutes(1));
        attempt.expires_at = now() - Duration::minutes(5);
        attempt.attempts = 9;

        assert_eq!(
            evaluate_attempt(&attempt),
            AttemptOutcome::Invalid {
                next_attempts: 9,
                max_attempts: 5
            }
        );
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let h = hash_secret("123456");
        let mut attempt = input(&h, &h);
        attempt.expires_at = now();
        assert_eq!(evaluate_attempt(&attempt), AttemptOutcome::Expired);

        attempt.expires_at = now() + Duration::milliseconds(1);
        assert_eq!(evaluate_attempt(&attempt), AttemptOutcome::Verified);
    }

    #[test]
    fn test_expired_beats_attempt_cap() {
        let h = hash_secret("123456");
        let mut attempt = input(&h, &h);
        attempt.expires_at = now() - Duration::seconds(1);
        attempt.attempts = 5;
        assert_eq!(evaluate_attempt(&attempt), AttemptOutcome::Expired);
    }

    #[test]
    fn test_cap_reached_rejects_correct_secret() {
        let h = hash_secret("123456");
        let mut attempt = input(&h, &h);
        attempt.attempts = 5;
        assert_eq!(
            evaluate_attempt(&attempt),
            AttemptOutcome::TooManyAttempts {
                attempts: 5,
                max_attempts: 5
            }
        );
    }

    #[test]
    fn test_next_attempts_never_exceeds_max() {
        let stored = hash_secret("123456");
        let provided = hash_secret("999999");
        for max in 1..=6u32 {
            for attempts in 0..max {
                let mut attempt = input(&stored, &provided);
                attempt.attempts = attempts;
                attempt.max_attempts = max;
                match evaluate_attempt(&attempt) {
                    AttemptOutcome::Invalid { next_attempts, .. } => {
                        assert!(next_attempts <= max);
                        assert_eq!(next_attempts, attempts + 1);
                    }
                    other => panic!("unexpected outcome {:?}", other),
                }
            }
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AttemptOutcome::Verified.error_code(), None);
        assert_eq!(
            AttemptOutcome::Expired.error_code(),
            Some(VerificationErrorCode::CodeExpired)
        );
        assert_eq!(
            AttemptOutcome::TooManyAttempts {
                attempts: 1,
                max_attempts: 1
            }
            .error_code(),
            Some(VerificationErrorCode::TooManyAttempts)
        );
    }
}

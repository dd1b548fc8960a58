//! Absolute expiry instants from an issue time and a lifetime in minutes

use chrono::{DateTime, Utc};

const MS_PER_MINUTE: i64 = 60_000;

/// `issued_at_ms + ttl_minutes * 60_000` as a UTC instant.
///
/// Total: arithmetic saturates and instants outside chrono's range clamp to
/// its bounds. Non-positive lifetimes are accepted here and rejected by the
/// services that own the configuration.
pub fn compute_expires_at(issued_at_ms: i64, ttl_minutes: i64) -> DateTime<Utc> {
    let expires_ms = issued_at_ms.saturating_add(ttl_minutes.saturating_mul(MS_PER_MINUTE));
    DateTime::<Utc>::from_timestamp_millis(expires_ms).unwrap_or(if expires_ms < 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

/// Convenience wrapper over an instant rather than epoch milliseconds
pub fn expires_at_from(issued_at: DateTime<Utc>, ttl_minutes: i64) -> DateTime<Utc> {
    compute_expires_at(issued_at.timestamp_millis(), ttl_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_adds_minutes() {
        let issued = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let expires = compute_expires_at(issued.timestamp_millis(), 60);
        assert_eq!(expires, issued + Duration::hours(1));
        assert_eq!(
            expires.timestamp_millis() - issued.timestamp_millis(),
            60 * 60_000
        );
    }

    #[test]
    fn test_zero_ttl_is_issue_time() {
        let issued = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        assert_eq!(expires_at_from(issued, 0), issued);
    }

    #[test]
    fn test_monotonic_in_ttl() {
        let issued = 1_700_000_000_000;
        let mut previous = compute_expires_at(issued, -5);
        for ttl in -4..=120 {
            let next = compute_expires_at(issued, ttl);
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_extremes_clamp() {
        assert_eq!(compute_expires_at(i64::MAX, i64::MAX), DateTime::<Utc>::MAX_UTC);
        assert_eq!(compute_expires_at(i64::MIN, i64::MIN), DateTime::<Utc>::MIN_UTC);
    }
}

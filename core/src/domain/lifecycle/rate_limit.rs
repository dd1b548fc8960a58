//! Per-user issuance limit over a trailing window

use chrono::{DateTime, Duration, Utc};

/// Issuances are counted over the trailing hour
pub const RATE_LIMIT_WINDOW_MINUTES: i64 = 60;

/// True when another issuance would exceed the limit
pub fn is_rate_limited(issued_in_window: u64, limit: u64) -> bool {
    issued_in_window >= limit
}

/// Start of the counting window ending at `now`
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::minutes(RATE_LIMIT_WINDOW_MINUTES)
}

//! Pure lifecycle functions shared by invitations and verification codes.
//!
//! Nothing here touches storage or the clock; callers pass `now` in.

pub mod attempt;
pub mod expiry;
pub mod generator;
pub mod hashing;
pub mod rate_limit;
pub mod status;

pub use attempt::{evaluate_attempt, AttemptInput, AttemptOutcome};
pub use expiry::{compute_expires_at, expires_at_from};
pub use generator::{
    generate_email_token, generate_invitation_token, generate_phone_code, GeneratedSecret,
};
pub use hashing::{hash_secret, hashes_match};
pub use rate_limit::{is_rate_limited, window_start, RATE_LIMIT_WINDOW_MINUTES};
pub use status::derive_invitation_status;

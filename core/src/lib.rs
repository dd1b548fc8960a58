//! # Onboarding Core
//!
//! Domain layer for invitation-gated onboarding: entities, the pure lifecycle
//! functions behind invitation tokens and verification codes, repository
//! interfaces, and the services that orchestrate them.

pub mod clock;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;

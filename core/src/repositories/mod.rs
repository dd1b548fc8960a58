//! Repository interfaces for the onboarding aggregates.
//!
//! Storage engines live in the infrastructure crate; `memory` provides an
//! in-process implementation of every trait for tests and local runs.

pub mod invitation;
pub mod membership;
pub mod memory;
pub mod user;
pub mod verification_code;

pub use invitation::{InvitationRepository, Redemption};
pub use membership::MembershipRepository;
pub use memory::InMemoryStore;
pub use user::UserRepository;
pub use verification_code::VerificationCodeRepository;

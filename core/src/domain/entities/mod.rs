//! Domain entities representing core business objects.

pub mod invitation;
pub mod membership;
pub mod user;
pub mod verification_code;

// Re-export commonly used types
pub use invitation::{
    Invitation, InvitationFilter, InvitationStatus, InvitationView, NewInvitation,
    DEFAULT_INVITATION_TTL_HOURS, MAX_INVITATION_TTL_HOURS,
};
pub use membership::{Membership, MembershipRole, NewMembership};
pub use user::{NewUser, User};
pub use verification_code::{
    NewVerificationCode, VerificationCode, VerificationKind, EMAIL_MAX_ATTEMPTS,
    PHONE_CODE_LENGTH,
};

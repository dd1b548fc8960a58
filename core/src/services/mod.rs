//! Business services containing the onboarding and verification use cases.

pub mod invitation;
pub mod verification;

// Re-export commonly used types
pub use invitation::{
    InvitationRequest, InvitationService, InvitationServiceConfig, IssuedInvitation,
    PasswordHasherTrait, RedeemRequest, RevokedInvitation,
};
pub use verification::{
    ConfirmOutcome, EmailMessage, EmailServiceTrait, IssueOutcome, IssueReceipt, Rejection,
    SmsServiceTrait, VerificationRequirements, VerificationService, VerificationServiceConfig,
    VerificationStatus,
};

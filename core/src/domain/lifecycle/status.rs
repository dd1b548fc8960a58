//! Effective invitation status with lazy expiry

use chrono::{DateTime, Utc};

use crate::domain::entities::invitation::InvitationStatus;

/// Terminal statuses are returned as-is. A pending invitation past its
/// deadline reads as expired; one without a deadline never expires.
pub fn derive_invitation_status(
    status: InvitationStatus,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> InvitationStatus {
    match status {
        InvitationStatus::Accepted | InvitationStatus::Revoked | InvitationStatus::Expired => {
            status
        }
        InvitationStatus::Pending => match expires_at {
            Some(deadline) if deadline <= now => InvitationStatus::Expired,
            _ => InvitationStatus::Pending,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_terminal_statuses_are_sticky() {
        let now = Utc::now();
        let deadlines = [
            None,
            Some(now - Duration::days(1)),
            Some(now + Duration::days(1)),
        ];
        for status in [
            InvitationStatus::Accepted,
            InvitationStatus::Revoked,
            InvitationStatus::Expired,
        ] {
            for deadline in deadlines {
                assert_eq!(derive_invitation_status(status, deadline, now), status);
            }
        }
    }

    #[test]
    fn test_pending_expires_at_deadline() {
        let now = Utc::now();
        assert_eq!(
            derive_invitation_status(InvitationStatus::Pending, Some(now), now),
            InvitationStatus::Expired
        );
        assert_eq!(
            derive_invitation_status(
                InvitationStatus::Pending,
                Some(now + Duration::seconds(1)),
                now
            ),
            InvitationStatus::Pending
        );
    }

    #[test]
    fn test_pending_without_deadline_stays_pending() {
        assert_eq!(
            derive_invitation_status(InvitationStatus::Pending, None, Utc::now()),
            InvitationStatus::Pending
        );
    }
}

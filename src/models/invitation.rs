//! Invitation models.
//!
//! An invitation offers a pre-assigned role to an email address. It is
//! consumed at most once: acceptance stamps `accepted_at`, which is never
//! cleared, and it expires on its own seven days after creation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::role::Role;

/// Days an invitation stays valid after creation.
pub const INVITATION_EXPIRY_DAYS: i64 = 7;

/// Row of the `user_invitations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Invitation {
    pub id: Uuid,
    pub token: String,
    pub email: String,
    pub role: Role,
    pub invited_by: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    /// Expiry for an invitation created at `now`.
    pub fn expiry_from(now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::days(INVITATION_EXPIRY_DAYS)
    }

    /// Whether this invitation can still be accepted at `now`.
    ///
    /// A used invitation reports `InvitationAlreadyUsed` even when it has
    /// also expired since.
    pub fn ensure_acceptable(&self, now: DateTime<Utc>) -> Result<(), AppError> {
        if self.accepted_at.is_some() {
            return Err(AppError::InvitationAlreadyUsed);
        }
        if self.expires_at < now {
            return Err(AppError::InvitationExpired);
        }
        Ok(())
    }

    /// Whether the invitation is addressed to `email` (case-insensitive).
    pub fn is_for(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }
}

/// Request body for `POST /api/v1/invitations`.
///
/// ```json
/// { "email": "new.hire@example.com", "role": "moderator" }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateInvitationRequest {
    pub email: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

/// Invitation as shown to admins. Includes the token so the dashboard can
/// build the invite link.
#[derive(Debug, Serialize)]
pub struct InvitationResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub token: String,
    /// Admin who sent the invitation
    pub invited_by: Option<Uuid>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Invitation> for InvitationResponse {
    fn from(inv: Invitation) -> Self {
        Self {
            id: inv.id,
            email: inv.email,
            role: inv.role,
            token: inv.token,
            invited_by: inv.invited_by,
            expires_at: inv.expires_at,
            accepted_at: inv.accepted_at,
            created_at: inv.created_at,
        }
    }
}

/// Public view returned when validating an invite link.
#[derive(Debug, Serialize)]
pub struct InvitationPreview {
    pub email: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl From<&Invitation> for InvitationPreview {
    fn from(inv: &Invitation) -> Self {
        Self {
            email: inv.email.clone(),
            role: inv.role,
            expires_at: inv.expires_at,
        }
    }
}

/// Result of a successful acceptance.
#[derive(Debug, Serialize)]
pub struct AcceptedInvitation {
    pub user_id: Uuid,
    pub role: Role,
    pub accepted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation(accepted_at: Option<DateTime<Utc>>, expires_at: DateTime<Utc>) -> Invitation {
        Invitation {
            id: Uuid::new_v4(),
            token: "T".to_string(),
            email: "a@x.com".to_string(),
            role: Role::User,
            invited_by: None,
            expires_at,
            accepted_at,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn pending_invitation_is_acceptable() {
        let now = Utc::now();
        let inv = invitation(None, Invitation::expiry_from(now));
        assert!(inv.ensure_acceptable(now).is_ok());
    }

    #[test]
    fn accepted_invitation_reports_already_used() {
        let now = Utc::now();
        let inv = invitation(Some(now), Invitation::expiry_from(now));
        assert!(matches!(
            inv.ensure_acceptable(now),
            Err(AppError::InvitationAlreadyUsed)
        ));
    }

    #[test]
    fn used_wins_over_expired() {
        let now = Utc::now();
        let inv = invitation(Some(now - Duration::days(10)), now - Duration::days(3));
        assert!(matches!(
            inv.ensure_acceptable(now),
            Err(AppError::InvitationAlreadyUsed)
        ));
    }

    #[test]
    fn expires_after_seven_days() {
        let created = Utc::now();
        let inv = invitation(None, Invitation::expiry_from(created));

        assert!(inv.ensure_acceptable(created + Duration::days(6)).is_ok());
        assert!(matches!(
            inv.ensure_acceptable(created + Duration::days(8)),
            Err(AppError::InvitationExpired)
        ));
    }

    #[test]
    fn response_carries_the_inviter() {
        let admin = Uuid::new_v4();
        let mut inv = invitation(None, Utc::now());
        inv.invited_by = Some(admin);

        assert_eq!(InvitationResponse::from(inv).invited_by, Some(admin));
    }

    #[test]
    fn email_match_ignores_case() {
        let inv = invitation(None, Utc::now());
        assert!(inv.is_for("A@X.com"));
        assert!(!inv.is_for("b@x.com"));
    }
}

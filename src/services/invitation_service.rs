//! Invitation lifecycle: create, list, cancel, validate and accept.
//!
//! # Single Use
//!
//! Acceptance runs in one database transaction holding a row lock on the
//! invitation. The profile, the role assignment and main-team membership are
//! written and `accepted_at` is stamped together; a second attempt
//! (sequential or concurrent) sees the stamp and fails with
//! `InvitationAlreadyUsed` without writing anything.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::invitation::{
        AcceptedInvitation, CreateInvitationRequest, Invitation, InvitationPreview,
        InvitationResponse,
    },
};

/// Create an invitation valid for seven days.
///
/// # Errors
///
/// - `InvalidRequest`: malformed email, or a pending invitation for the same
///   email already exists
pub async fn create_invitation(
    pool: &DbPool,
    invited_by: Uuid,
    request: CreateInvitationRequest,
) -> Result<InvitationResponse, AppError> {
    let email = normalize_email(&request.email)?;

    let pending: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM user_invitations WHERE email = $1 AND accepted_at IS NULL AND expires_at > NOW())",
    )
    .bind(&email)
    .fetch_one(pool)
    .await?;

    if pending {
        return Err(AppError::InvalidRequest(
            "This email already has a pending invitation".to_string(),
        ));
    }

    let invitation = sqlx::query_as::<_, Invitation>(
        r#"
        INSERT INTO user_invitations (token, email, role, invited_by, expires_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(generate_token())
    .bind(&email)
    .bind(request.role)
    .bind(invited_by)
    .bind(Invitation::expiry_from(Utc::now()))
    .fetch_one(pool)
    .await?;

    tracing::info!(
        "Invitation {} created for {} with role {}",
        invitation.id,
        invitation.email,
        invitation.role
    );

    Ok(invitation.into())
}

/// Pending (unaccepted, unexpired) invitations, newest first.
pub async fn list_pending(pool: &DbPool) -> Result<Vec<InvitationResponse>, AppError> {
    let invitations = sqlx::query_as::<_, Invitation>(
        r#"
        SELECT * FROM user_invitations
        WHERE accepted_at IS NULL AND expires_at > NOW()
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(invitations.into_iter().map(Into::into).collect())
}

/// Delete a pending invitation. Accepted invitations are kept as a record.
pub async fn cancel_invitation(pool: &DbPool, invitation_id: Uuid) -> Result<(), AppError> {
    let result =
        sqlx::query("DELETE FROM user_invitations WHERE id = $1 AND accepted_at IS NULL")
            .bind(invitation_id)
            .execute(pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Invitation"));
    }

    Ok(())
}

/// Check an invite link before showing the signup form.
pub async fn validate_token(pool: &DbPool, token: &str) -> Result<InvitationPreview, AppError> {
    let invitation = find_by_token(pool, token)
        .await?
        .ok_or(AppError::NotFound("Invitation"))?;

    invitation.ensure_acceptable(Utc::now())?;

    Ok(InvitationPreview::from(&invitation))
}

/// Accept an invitation on behalf of the authenticated account.
///
/// # Process
///
/// 1. Lock the invitation row (`FOR UPDATE`)
/// 2. Reject if already accepted, expired, or addressed to another email
/// 3. Create the profile if the account has none yet
/// 4. Assign the invited role (no-op if already held)
/// 5. Join the main team, if one exists
/// 6. Stamp `accepted_at` and commit
pub async fn accept_invitation(
    pool: &DbPool,
    auth: &AuthContext,
    token: &str,
) -> Result<AcceptedInvitation, AppError> {
    let email = auth.email.as_deref().ok_or_else(|| {
        AppError::Authentication("User not authenticated or email not available".to_string())
    })?;

    let mut tx = pool.begin().await?;

    let invitation = sqlx::query_as::<_, Invitation>(
        "SELECT * FROM user_invitations WHERE token = $1 FOR UPDATE",
    )
    .bind(token)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AppError::NotFound("Invitation"))?;

    let now = Utc::now();
    if let Err(e) = check_acceptance(&invitation, email, now) {
        tx.rollback().await?;
        tracing::warn!("Rejected acceptance of invitation {}: {}", invitation.id, e);
        return Err(e);
    }

    sqlx::query(
        r#"
        INSERT INTO profiles (user_id, email, full_name)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(auth.user_id)
    .bind(&invitation.email)
    .bind(default_full_name(&invitation.email))
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO user_roles (user_id, role)
        VALUES ($1, $2)
        ON CONFLICT (user_id, role) DO NOTHING
        "#,
    )
    .bind(auth.user_id)
    .bind(invitation.role)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO team_members (team_id, user_id, role, invited_email, accepted_at)
        SELECT id, $1, 'member', $2, $3 FROM teams
        ORDER BY created_at ASC
        LIMIT 1
        ON CONFLICT (team_id, user_id) DO NOTHING
        "#,
    )
    .bind(auth.user_id)
    .bind(&invitation.email)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let stamped = sqlx::query(
        "UPDATE user_invitations SET accepted_at = $2 WHERE id = $1 AND accepted_at IS NULL",
    )
    .bind(invitation.id)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if let Err(e) = ensure_stamped(stamped) {
        tx.rollback().await?;
        return Err(e);
    }

    tx.commit().await?;

    tracing::info!(
        "Invitation {} accepted by user {} with role {}",
        invitation.id,
        auth.user_id,
        invitation.role
    );

    Ok(AcceptedInvitation {
        user_id: auth.user_id,
        role: invitation.role,
        accepted_at: now,
    })
}

/// Decide whether `email` may accept `invitation` at `now`.
///
/// Checks run in order: already used, expired, addressed to another email.
fn check_acceptance(
    invitation: &Invitation,
    email: &str,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    invitation.ensure_acceptable(now)?;

    if !invitation.is_for(email) {
        return Err(AppError::InvalidRequest(
            "This invitation was issued to a different email address".to_string(),
        ));
    }

    Ok(())
}

/// The `accepted_at` stamp must hit exactly the locked row; zero rows means
/// another acceptance got there first.
fn ensure_stamped(rows_affected: u64) -> Result<(), AppError> {
    if rows_affected == 0 {
        Err(AppError::InvitationAlreadyUsed)
    } else {
        Ok(())
    }
}

async fn find_by_token(pool: &DbPool, token: &str) -> Result<Option<Invitation>, AppError> {
    let invitation =
        sqlx::query_as::<_, Invitation>("SELECT * FROM user_invitations WHERE token = $1")
            .bind(token)
            .fetch_optional(pool)
            .await?;

    Ok(invitation)
}

/// Trim and lower-case an email, rejecting obviously invalid input.
fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AppError::InvalidRequest(
            "Please enter a valid email address".to_string(),
        )),
    }
}

/// Display name for a profile created from an invitation: the email's local part.
fn default_full_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

/// 64 hex characters (32 random bytes).
fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

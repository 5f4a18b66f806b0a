//! Invitation HTTP handlers.
//!
//! Admin only:
//! - GET /api/v1/invitations - List pending invitations
//! - POST /api/v1/invitations - Invite an email with a role
//! - DELETE /api/v1/invitations/{id} - Cancel a pending invitation
//!
//! Invitees:
//! - GET /api/v1/invitations/token/{token} - Validate an invite link (public)
//! - POST /api/v1/invitations/token/{token}/accept - Accept (signed in)

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::invitation::{
        AcceptedInvitation, CreateInvitationRequest, InvitationPreview, InvitationResponse,
    },
    services::{invitation_service, role_service},
    state::AppState,
};

pub async fn list_invitations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<InvitationResponse>>, AppError> {
    role_service::require_admin(&state.pool, auth.user_id).await?;

    let invitations = invitation_service::list_pending(&state.pool).await?;
    Ok(Json(invitations))
}

/// Invite an email address.
///
/// # Request Body
///
/// ```json
/// { "email": "new.hire@example.com", "role": "moderator" }
/// ```
///
/// `role` defaults to `user`.
///
/// # Response
///
/// - **Success (201 Created)**: the invitation, including its token
/// - **Error (400)**: invalid email or already pending
/// - **Error (403)**: caller is not an admin
pub async fn create_invitation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>), AppError> {
    role_service::require_admin(&state.pool, auth.user_id).await?;

    let invitation =
        invitation_service::create_invitation(&state.pool, auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

pub async fn cancel_invitation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(invitation_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    role_service::require_admin(&state.pool, auth.user_id).await?;

    invitation_service::cancel_invitation(&state.pool, invitation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Validate an invite link.
///
/// # Response
///
/// - **Success (200 OK)**: `{ "email": "...", "role": "...", "expires_at": "..." }`
/// - **Error (404)**: unknown token
/// - **Error (409)**: already used
/// - **Error (410)**: expired
pub async fn validate_invitation(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<InvitationPreview>, AppError> {
    let preview = invitation_service::validate_token(&state.pool, &token).await?;
    Ok(Json(preview))
}

/// Accept an invitation as the signed-in account. Succeeds at most once per
/// invitation; later attempts get 409.
pub async fn accept_invitation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(token): Path<String>,
) -> Result<Json<AcceptedInvitation>, AppError> {
    let accepted = invitation_service::accept_invitation(&state.pool, &auth, &token).await?;
    Ok(Json(accepted))
}

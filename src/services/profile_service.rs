//! Account profile reads and the global provider key setting.

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::profile::{Profile, ProfileResponse, UpdateProfileRequest},
};

/// The caller's profile, or an unsaved view when no row exists yet.
pub async fn get_profile(pool: &DbPool, auth: &AuthContext) -> Result<ProfileResponse, AppError> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
        .bind(auth.user_id)
        .fetch_optional(pool)
        .await?;

    Ok(profile.map_or_else(|| ProfileResponse::unsaved(auth), Into::into))
}

/// Update the display name and/or the global provider key, creating the
/// profile row on first use.
///
/// An empty `retell_api_key` clears the key; widgets without their own key
/// then resolve to the environment default.
pub async fn update_profile(
    pool: &DbPool,
    auth: &AuthContext,
    request: UpdateProfileRequest,
) -> Result<ProfileResponse, AppError> {
    let retell_api_key = request.retell_api_key.map(|k| k.trim().to_string());
    let clearing_key = retell_api_key.as_deref() == Some("");

    let profile = sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profiles (user_id, email, full_name, retell_api_key)
        VALUES ($1, COALESCE($2, ''), $3, NULLIF($4, ''))
        ON CONFLICT (user_id) DO UPDATE
        SET full_name = COALESCE($3, profiles.full_name),
            retell_api_key = CASE WHEN $4::text IS NULL THEN profiles.retell_api_key ELSE NULLIF($4, '') END,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(auth.user_id)
    .bind(auth.email.as_deref())
    .bind(request.full_name)
    .bind(retell_api_key)
    .fetch_one(pool)
    .await?;

    if clearing_key {
        tracing::info!("Global Retell API key cleared for user {}", auth.user_id);
    }

    Ok(profile.into())
}

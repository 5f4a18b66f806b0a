//! Role lookups and role gates.

use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::role::{Role, highest},
};

/// All role tags assigned to `user_id`, in no particular order.
pub async fn fetch_roles(pool: &DbPool, user_id: Uuid) -> Result<Vec<Role>, AppError> {
    let roles = sqlx::query_scalar::<_, Role>("SELECT role FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(roles)
}

/// Fail with `Forbidden` unless the account's highest role is admin or above.
pub async fn require_admin(pool: &DbPool, user_id: Uuid) -> Result<Role, AppError> {
    require_role(pool, user_id, Role::Admin).await
}

/// Fail with `Forbidden` unless the account's highest role is at least `required`.
pub async fn require_role(pool: &DbPool, user_id: Uuid, required: Role) -> Result<Role, AppError> {
    let role = highest(&fetch_roles(pool, user_id).await?);
    ensure_at_least(role, required).inspect_err(|_| {
        tracing::warn!(
            "User {} with role {} attempted an action requiring {}",
            user_id,
            role,
            required
        );
    })
}

fn ensure_at_least(role: Role, required: Role) -> Result<Role, AppError> {
    if role >= required {
        Ok(role)
    } else {
        Err(AppError::Forbidden)
    }
}

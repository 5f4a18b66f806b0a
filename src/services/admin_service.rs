//! System-wide counters for the super-admin overview.

use serde::Serialize;

use crate::{db::DbPool, error::AppError};

#[derive(Debug, Serialize)]
pub struct SystemStats {
    pub total_users: i64,
    pub total_widgets: i64,
    /// Accounts holding the `admin` role
    pub admin_users: i64,
}

pub async fn system_stats(pool: &DbPool) -> Result<SystemStats, AppError> {
    let stats = sqlx::query_as::<_, (i64, i64, i64)>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM profiles),
            (SELECT COUNT(*) FROM widget_configs),
            (SELECT COUNT(*) FROM user_roles WHERE role = 'admin')
        "#,
    )
    .fetch_one(pool)
    .await?;

    let (total_users, total_widgets, admin_users) = stats;
    Ok(SystemStats {
        total_users,
        total_widgets,
        admin_users,
    })
}

//! Demo settings administration.

use crate::{
    db::DbPool,
    error::AppError,
    models::demo::{DemoSettings, DemoSettingsResponse, UpdateDemoSettingsRequest},
    services::credential_service,
};

pub async fn get_demo_settings(pool: &DbPool) -> Result<DemoSettingsResponse, AppError> {
    let settings = credential_service::fetch_demo_settings(pool).await?;
    Ok(settings.into())
}

/// Replace the singleton demo settings row. Empty values are stored as NULL.
pub async fn replace_demo_settings(
    pool: &DbPool,
    request: UpdateDemoSettingsRequest,
) -> Result<DemoSettingsResponse, AppError> {
    let settings = sqlx::query_as::<_, DemoSettings>(
        r#"
        INSERT INTO demo_settings (id, retell_api_key, voice_agent_id, updated_at)
        VALUES (TRUE, NULLIF($1, ''), NULLIF($2, ''), NOW())
        ON CONFLICT (id) DO UPDATE
        SET retell_api_key = EXCLUDED.retell_api_key,
            voice_agent_id = EXCLUDED.voice_agent_id,
            updated_at = EXCLUDED.updated_at
        RETURNING retell_api_key, voice_agent_id, updated_at
        "#,
    )
    .bind(request.retell_api_key)
    .bind(request.voice_agent_id)
    .fetch_one(pool)
    .await?;

    tracing::info!("Demo settings updated");

    Ok(Some(settings).into())
}

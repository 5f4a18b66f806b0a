//! Widget management and the widget-creation quota gate.
//!
//! # Quota Gate
//!
//! Before a widget is inserted, the owner's subscription is resolved fresh
//! and their current widget count is compared with the snapshot's limit.
//! The only way to obtain a [`NewWidget`] is through [`NewWidget::admit`],
//! so a refused creation never reaches the `INSERT`.
//!
//! The count and the insert are separate statements. Two concurrent creations
//! from the same account can both pass the gate and overshoot by one.

use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        subscription::WidgetLimit,
        widget::{UpdateWidgetRequest, Widget, WidgetResponse},
    },
    providers::BillingProvider,
    services::entitlement_service,
};

/// Prefix of every widget public key.
pub const WIDGET_KEY_PREFIX: &str = "wgt_";

/// A widget that passed the quota gate and may be inserted.
#[derive(Debug)]
pub struct NewWidget {
    name: String,
    api_key: String,
}

impl NewWidget {
    /// Admit a new widget for an account that already owns `count` widgets.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest`: blank name
    /// - `WidgetLimitReached`: `count >= limit`
    pub fn admit(name: &str, count: u64, limit: WidgetLimit) -> Result<Self, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidRequest(
                "Please enter a widget name".to_string(),
            ));
        }

        if !limit.allows_another(count) {
            return Err(AppError::WidgetLimitReached {
                limit: limit.wire_value(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            api_key: generate_widget_key(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

/// List the caller's widgets, newest first.
pub async fn list_widgets(pool: &DbPool, user_id: Uuid) -> Result<Vec<WidgetResponse>, AppError> {
    let widgets = sqlx::query_as::<_, Widget>(
        "SELECT * FROM widget_configs WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(widgets.into_iter().map(Into::into).collect())
}

/// Create a widget if the caller's current tier allows another one.
///
/// # Process
///
/// 1. Resolve the subscription snapshot (free tier if resolution fails)
/// 2. Count the caller's widgets
/// 3. Admit through the quota gate
/// 4. Insert with a fresh public key
pub async fn create_widget(
    pool: &DbPool,
    billing: &dyn BillingProvider,
    auth: &AuthContext,
    name: &str,
) -> Result<WidgetResponse, AppError> {
    let snapshot = entitlement_service::snapshot_or_free(
        entitlement_service::check_subscription(pool, billing, auth).await,
    );

    let count = count_widgets(pool, auth.user_id).await?;
    let widget = NewWidget::admit(name, count, snapshot.widget_limit)?;

    let created = sqlx::query_as::<_, Widget>(
        r#"
        INSERT INTO widget_configs (user_id, name, api_key)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(auth.user_id)
    .bind(widget.name())
    .bind(widget.api_key())
    .fetch_one(pool)
    .await?;

    tracing::info!(
        "Widget {} created for user {} ({} of {:?})",
        created.id,
        auth.user_id,
        count + 1,
        snapshot.widget_limit
    );

    Ok(created.into())
}

/// Update the settings of one of the caller's widgets.
///
/// Absent fields are left unchanged. An empty string clears the widget's
/// provider key or agent override, so resolution falls back to the owner's
/// key and the environment default.
pub async fn update_widget(
    pool: &DbPool,
    user_id: Uuid,
    widget_id: Uuid,
    request: UpdateWidgetRequest,
) -> Result<WidgetResponse, AppError> {
    if request.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::InvalidRequest(
            "Widget name cannot be empty".to_string(),
        ));
    }

    let widget = sqlx::query_as::<_, Widget>(
        r#"
        UPDATE widget_configs
        SET name = COALESCE($3, name),
            retell_api_key = CASE WHEN $4::text IS NULL THEN retell_api_key ELSE NULLIF($4, '') END,
            voice_agent_id = CASE WHEN $5::text IS NULL THEN voice_agent_id ELSE NULLIF($5, '') END,
            voice_enabled = COALESCE($6, voice_enabled),
            chat_enabled = COALESCE($7, chat_enabled),
            customization = COALESCE($8, customization),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(widget_id)
    .bind(user_id)
    .bind(request.name.map(|n| n.trim().to_string()))
    .bind(request.retell_api_key)
    .bind(request.voice_agent_id)
    .bind(request.voice_enabled)
    .bind(request.chat_enabled)
    .bind(request.customization)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Widget"))?;

    Ok(widget.into())
}

/// Delete one of the caller's widgets.
pub async fn delete_widget(pool: &DbPool, user_id: Uuid, widget_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM widget_configs WHERE id = $1 AND user_id = $2")
        .bind(widget_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Widget"));
    }

    Ok(())
}

async fn count_widgets(pool: &DbPool, user_id: Uuid) -> Result<u64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM widget_configs WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(u64::try_from(count).unwrap_or_default())
}

/// `wgt_` followed by 48 hex characters (24 random bytes).
fn generate_widget_key() -> String {
    let bytes: [u8; 24] = rand::random();
    format!("{}{}", WIDGET_KEY_PREFIX, hex::encode(bytes))
}

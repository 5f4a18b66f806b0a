//! Credential resolution for voice provider calls.
//!
//! Given a widget public key (or the demo flag), decide which provider API
//! key and agent id to use:
//!
//! - key: widget override → owner's global key → environment default
//! - agent: widget override → environment default
//! - demo: demo settings override → environment default, for both fields
//!
//! Lookup failures are logged and fall through to the environment defaults.
//! A field that is still unset after resolution is a configuration error; no
//! call is made with an empty credential.

use crate::{
    config::VoiceDefaults,
    db::DbPool,
    error::AppError,
    models::{call::CreateCallRequest, demo::DemoSettings, widget::WidgetCredentialSources},
    providers::{VoiceCredentials, VoiceProvider},
    services::override_chain::{OverrideChain, OverrideSource},
};

/// Override sources loaded for one request.
#[derive(Debug, Clone)]
pub enum CredentialContext {
    /// A widget key was supplied; `None` when the lookup found nothing or failed.
    Widget(Option<WidgetCredentialSources>),
    /// Demo widget; `None` when no demo settings row exists or the lookup failed.
    Demo(Option<DemoSettings>),
    /// Neither: environment defaults only.
    Defaults,
}

/// Apply the override chains to `context`.
///
/// # Errors
///
/// `Configuration` when no layer supplies an API key or an agent id.
pub fn resolve_credentials(
    context: CredentialContext,
    defaults: &VoiceDefaults,
) -> Result<VoiceCredentials, AppError> {
    let (key_chain, agent_chain) = match context {
        CredentialContext::Widget(Some(widget)) => (
            OverrideChain::new()
                .layer(OverrideSource::Widget, widget.retell_api_key)
                .layer(OverrideSource::Profile, widget.profile_retell_api_key),
            OverrideChain::new().layer(OverrideSource::Widget, widget.voice_agent_id),
        ),
        CredentialContext::Demo(Some(demo)) => (
            OverrideChain::new().layer(OverrideSource::Demo, demo.retell_api_key),
            OverrideChain::new().layer(OverrideSource::Demo, demo.voice_agent_id),
        ),
        CredentialContext::Widget(None)
        | CredentialContext::Demo(None)
        | CredentialContext::Defaults => (OverrideChain::new(), OverrideChain::new()),
    };

    let api_key = key_chain
        .layer(OverrideSource::Environment, defaults.api_key.clone())
        .resolve()
        .ok_or_else(|| {
            tracing::error!("RETELL_API_KEY is not configured");
            AppError::Configuration("RETELL_API_KEY is not configured".to_string())
        })?;

    let agent_id = agent_chain
        .layer(OverrideSource::Environment, defaults.agent_id.clone())
        .resolve()
        .ok_or_else(|| {
            tracing::error!("RETELL_AGENT_ID is not configured");
            AppError::Configuration("RETELL_AGENT_ID is not configured".to_string())
        })?;

    tracing::info!(
        "Using {} Retell API key and {} voice agent ID: {}",
        api_key.source,
        agent_id.source,
        agent_id.value
    );

    Ok(VoiceCredentials {
        api_key: api_key.value,
        agent_id: agent_id.value,
    })
}

/// Load the override sources for a call request.
///
/// Never fails: database errors are logged and treated as "not found".
pub async fn load_credential_context(
    pool: &DbPool,
    request: &CreateCallRequest,
) -> CredentialContext {
    if let Some(widget_key) = request.widget_key() {
        tracing::info!("Fetching widget config for api_key: {}...", key_prefix(widget_key));

        let sources = match fetch_widget_sources(pool, widget_key).await {
            Ok(Some(sources)) => Some(sources),
            Ok(None) => {
                tracing::error!("No widget config found for api_key: {}...", key_prefix(widget_key));
                None
            }
            Err(e) => {
                tracing::error!("Error fetching widget config: {:?}", e);
                None
            }
        };
        CredentialContext::Widget(sources)
    } else if request.is_demo {
        tracing::info!("Fetching demo settings...");

        let settings = fetch_demo_settings(pool).await.unwrap_or_else(|e| {
            tracing::error!("Error fetching demo settings: {:?}", e);
            None
        });
        CredentialContext::Demo(settings)
    } else {
        CredentialContext::Defaults
    }
}

/// Resolve credentials for `context` and create one web call with them.
///
/// Returns the provider's access token verbatim.
pub async fn start_web_call(
    voice: &dyn VoiceProvider,
    context: CredentialContext,
    defaults: &VoiceDefaults,
) -> Result<String, AppError> {
    let credentials = resolve_credentials(context, defaults)?;

    tracing::info!("Creating web call with agent: {}", credentials.agent_id);
    let call = voice.create_web_call(&credentials).await?;
    tracing::info!("Web call created successfully");

    Ok(call.access_token)
}

/// Widget overrides joined with the owner's global key, in one query.
async fn fetch_widget_sources(
    pool: &DbPool,
    widget_key: &str,
) -> Result<Option<WidgetCredentialSources>, sqlx::Error> {
    sqlx::query_as::<_, WidgetCredentialSources>(
        r#"
        SELECT w.retell_api_key,
               w.voice_agent_id,
               p.retell_api_key AS profile_retell_api_key
        FROM widget_configs w
        LEFT JOIN profiles p ON p.user_id = w.user_id
        WHERE w.api_key = $1
        "#,
    )
    .bind(widget_key)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_demo_settings(pool: &DbPool) -> Result<Option<DemoSettings>, sqlx::Error> {
    sqlx::query_as::<_, DemoSettings>(
        "SELECT retell_api_key, voice_agent_id, updated_at FROM demo_settings LIMIT 1",
    )
    .fetch_optional(pool)
    .await
}

/// First ten characters of a widget key, safe to log.
fn key_prefix(key: &str) -> String {
    key.chars().take(10).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeVoice;
    use chrono::Utc;

    fn defaults(api_key: Option<&str>, agent_id: Option<&str>) -> VoiceDefaults {
        VoiceDefaults {
            api_key: api_key.map(str::to_string),
            agent_id: agent_id.map(str::to_string),
        }
    }

    fn widget(
        key: Option<&str>,
        agent: Option<&str>,
        profile_key: Option<&str>,
    ) -> CredentialContext {
        CredentialContext::Widget(Some(WidgetCredentialSources {
            retell_api_key: key.map(str::to_string),
            voice_agent_id: agent.map(str::to_string),
            profile_retell_api_key: profile_key.map(str::to_string),
        }))
    }

    #[test]
    fn widget_key_beats_owner_global_key() {
        let creds = resolve_credentials(
            widget(Some("key_widget"), Some("agent_widget"), Some("key_profile")),
            &defaults(Some("key_env"), Some("agent_env")),
        )
        .unwrap();

        assert_eq!(creds.api_key, "key_widget");
        assert_eq!(creds.agent_id, "agent_widget");
    }

    #[test]
    fn owner_global_key_used_when_widget_has_none() {
        let creds = resolve_credentials(
            widget(None, None, Some("key_profile")),
            &defaults(Some("key_env"), Some("agent_env")),
        )
        .unwrap();

        assert_eq!(creds.api_key, "key_profile");
        assert_eq!(creds.agent_id, "agent_env");
    }

    #[test]
    fn empty_widget_key_counts_as_unset() {
        let creds = resolve_credentials(
            widget(Some(""), Some(""), Some("key_profile")),
            &defaults(None, Some("agent_env")),
        )
        .unwrap();

        assert_eq!(creds.api_key, "key_profile");
        assert_eq!(creds.agent_id, "agent_env");
    }

    #[test]
    fn environment_default_when_no_overrides() {
        let creds = resolve_credentials(
            widget(None, None, None),
            &defaults(Some("key_env"), Some("agent_env")),
        )
        .unwrap();

        assert_eq!(creds.api_key, "key_env");
    }

    #[test]
    fn no_key_anywhere_is_configuration_error() {
        let err = resolve_credentials(widget(None, None, None), &defaults(None, Some("agent_env")))
            .unwrap_err();

        match err {
            AppError::Configuration(msg) => assert!(msg.contains("RETELL_API_KEY")),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn owner_key_then_cleared_fails_instead_of_forwarding_empty() {
        // Widget without overrides, owner has K1, no environment default.
        let env = defaults(None, Some("agent_env"));

        let creds = resolve_credentials(widget(None, None, Some("K1")), &env).unwrap();
        assert_eq!(creds.api_key, "K1");

        let cleared = resolve_credentials(widget(None, None, Some("")), &env);
        assert!(matches!(cleared, Err(AppError::Configuration(_))));

        let removed = resolve_credentials(widget(None, None, None), &env);
        assert!(matches!(removed, Err(AppError::Configuration(_))));
    }

    #[test]
    fn missing_agent_is_configuration_error() {
        let err = resolve_credentials(CredentialContext::Defaults, &defaults(Some("key_env"), None))
            .unwrap_err();

        match err {
            AppError::Configuration(msg) => assert!(msg.contains("RETELL_AGENT_ID")),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn failed_widget_lookup_falls_through_to_defaults() {
        let creds = resolve_credentials(
            CredentialContext::Widget(None),
            &defaults(Some("key_env"), Some("agent_env")),
        )
        .unwrap();

        assert_eq!(creds.api_key, "key_env");
        assert_eq!(creds.agent_id, "agent_env");
    }

    #[test]
    fn demo_settings_override_defaults_per_field() {
        let demo = DemoSettings {
            retell_api_key: None,
            voice_agent_id: Some("agent_demo".to_string()),
            updated_at: Utc::now(),
        };

        let creds = resolve_credentials(
            CredentialContext::Demo(Some(demo)),
            &defaults(Some("key_env"), Some("agent_env")),
        )
        .unwrap();

        assert_eq!(creds.api_key, "key_env");
        assert_eq!(creds.agent_id, "agent_demo");
    }

    #[test]
    fn widget_key_is_not_consulted_for_demo_requests() {
        let request = CreateCallRequest {
            api_key: Some(String::new()),
            is_demo: true,
        };
        assert!(request.widget_key().is_none());
    }

    #[tokio::test]
    async fn start_web_call_makes_exactly_one_provider_call() {
        let voice = FakeVoice::returning_token("tok_123");

        let token = start_web_call(
            &voice,
            widget(Some("key_widget"), Some("agent_widget"), None),
            &defaults(None, None),
        )
        .await
        .unwrap();

        assert_eq!(token, "tok_123");
        assert_eq!(voice.web_calls(), 1);
        assert_eq!(
            voice.last_credentials(),
            Some(VoiceCredentials {
                api_key: "key_widget".to_string(),
                agent_id: "agent_widget".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn configuration_error_makes_no_provider_call() {
        let voice = FakeVoice::returning_token("tok_123");

        let result = start_web_call(&voice, CredentialContext::Defaults, &defaults(None, None)).await;

        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert_eq!(voice.web_calls(), 0);
    }

    #[tokio::test]
    async fn provider_failure_carries_status_and_body() {
        let voice = FakeVoice::failing(401, "invalid api key");

        let err = start_web_call(
            &voice,
            CredentialContext::Defaults,
            &defaults(Some("key_env"), Some("agent_env")),
        )
        .await
        .unwrap_err();

        match err {
            AppError::Upstream(msg) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("invalid api key"));
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }
}

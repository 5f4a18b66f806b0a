//! Application configuration management.
//!
//! Configuration is read from environment variables with the `envy` crate.
//! Provider secrets are optional at startup: a missing secret only fails the
//! request path that actually needs it.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SUPABASE_JWT_SECRET` (required): HS256 secret used to verify bearer tokens
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `RETELL_API_KEY`, `RETELL_AGENT_ID` (optional): process-wide voice defaults
/// - `RETELL_TEXT_AGENT_ID` (optional): agent used by the text-chat proxy
/// - `RETELL_API_BASE` (optional): voice provider base URL
/// - `STRIPE_SECRET_KEY` (optional): billing provider secret key
/// - `STRIPE_PRICE_STARTER`, `STRIPE_PRICE_PRO` (optional): checkout price ids
/// - `APP_BASE_URL` (optional): dashboard URL used for checkout/portal redirects
/// - `CRON_SECRET` (optional): bearer secret for the keep-alive endpoint
/// - `UPSTREAM_TIMEOUT_SECS` (optional): timeout for outbound HTTP calls
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    pub supabase_jwt_secret: String,

    #[serde(default)]
    pub retell_api_key: Option<String>,

    #[serde(default)]
    pub retell_agent_id: Option<String>,

    #[serde(default)]
    pub retell_text_agent_id: Option<String>,

    #[serde(default = "default_retell_api_base")]
    pub retell_api_base: String,

    #[serde(default)]
    pub stripe_secret_key: Option<String>,

    #[serde(default)]
    pub stripe_price_starter: Option<String>,

    #[serde(default)]
    pub stripe_price_pro: Option<String>,

    #[serde(default = "default_app_base_url")]
    pub app_base_url: String,

    #[serde(default)]
    pub cron_secret: Option<String>,

    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,
}

fn default_port() -> u16 {
    3000
}

fn default_retell_api_base() -> String {
    "https://api.retellai.com".to_string()
}

fn default_app_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_upstream_timeout() -> u64 {
    10
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is loaded first if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value cannot
    /// be parsed into its expected type.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }

    /// Process-wide voice provider defaults, the last layer of every
    /// credential override chain.
    pub fn voice_defaults(&self) -> VoiceDefaults {
        VoiceDefaults {
            api_key: self.retell_api_key.clone(),
            agent_id: self.retell_agent_id.clone(),
        }
    }
}

/// Environment-held default credentials for the voice provider.
#[derive(Debug, Clone, Default)]
pub struct VoiceDefaults {
    pub api_key: Option<String>,
    pub agent_id: Option<String>,
}

#[cfg(test)]
impl Config {
    /// Configuration for tests that never touch a real database or provider.
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/widget_entitlement_test".to_string(),
            server_port: 0,
            supabase_jwt_secret: "test-jwt-secret-at-least-32-characters".to_string(),
            retell_api_key: Some("key_env_default".to_string()),
            retell_agent_id: Some("agent_env_default".to_string()),
            retell_text_agent_id: Some("agent_text_default".to_string()),
            retell_api_base: default_retell_api_base(),
            stripe_secret_key: Some("sk_test_123".to_string()),
            stripe_price_starter: Some("price_starter_test".to_string()),
            stripe_price_pro: Some("price_pro_test".to_string()),
            app_base_url: "https://app.example".to_string(),
            cron_secret: Some("cron-secret".to_string()),
            upstream_timeout_secs: 5,
        }
    }
}

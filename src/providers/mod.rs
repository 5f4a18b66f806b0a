//! Clients for the external billing and voice-AI providers.
//!
//! Each provider sits behind an `async_trait` so the resolvers can be
//! exercised against in-memory fakes. Billing goes through `async-stripe`;
//! the voice provider's REST API is called with `reqwest`.

pub mod retell;
pub mod stripe;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use url::Url;

/// Failure talking to an external provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// A secret the request needs is not configured.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    /// Connection, TLS or timeout failure.
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The provider answered with a non-success status.
    #[error("{provider} returned {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// The provider answered 2xx with a body we could not interpret.
    #[error("{provider} returned an unexpected response: {detail}")]
    Malformed {
        provider: &'static str,
        detail: String,
    },

    /// Error reported by the Stripe SDK.
    #[error("Stripe request failed: {0}")]
    Stripe(#[from] ::stripe::StripeError),

    #[error("{provider} did not respond within {seconds}s")]
    Timeout {
        provider: &'static str,
        seconds: u64,
    },

    #[error("invalid base URL for {provider}: {detail}")]
    InvalidBaseUrl {
        provider: &'static str,
        detail: String,
    },
}

/// A customer record held by the billing provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingCustomer {
    pub id: String,
    pub email: Option<String>,
}

/// Subscription states the entitlement resolver asks the billing provider for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Active,
    Trialing,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
        }
    }
}

/// A subscription as reported by the billing provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingSubscription {
    pub id: String,
    /// Raw status string, e.g. "active" or "trialing"
    pub status: String,
    pub current_period_end: Option<DateTime<Utc>>,
    /// Product billed by the first subscription item
    pub product_id: Option<String>,
}

impl BillingSubscription {
    pub fn is_trialing(&self) -> bool {
        self.status == SubscriptionStatus::Trialing.as_str()
    }
}

/// Parameters for a hosted subscription checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Existing billing customer; when `None` the provider creates one from
    /// `customer_email` during checkout
    pub customer_id: Option<String>,
    pub customer_email: String,
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

/// The billing provider: subscription lookups for the entitlement resolver
/// and hosted checkout/portal pages for the dashboard.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Find the first customer registered under `email`.
    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<BillingCustomer>, ProviderError>;

    /// List the customer's subscriptions in the given status (at most one).
    async fn list_subscriptions(
        &self,
        customer_id: &str,
        status: SubscriptionStatus,
    ) -> Result<Vec<BillingSubscription>, ProviderError>;

    /// Create a subscription checkout session and return its URL.
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<String, ProviderError>;

    /// Create a self-service billing portal session and return its URL.
    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<String, ProviderError>;
}

/// Resolved credential pair for one voice provider request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceCredentials {
    pub api_key: String,
    pub agent_id: String,
}

/// Session handle returned by the voice provider for a new web call.
#[derive(Debug, Clone)]
pub struct WebCall {
    pub access_token: String,
}

/// One agent turn from the voice provider's chat-completion API.
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    pub response: Option<String>,
    pub conversation_id: Option<String>,
}

/// The voice-AI provider.
#[async_trait]
pub trait VoiceProvider: Send + Sync {
    /// Create a browser web call and return its access token.
    async fn create_web_call(&self, credentials: &VoiceCredentials)
    -> Result<WebCall, ProviderError>;

    /// Send one user message to a chat agent.
    async fn create_chat_completion(
        &self,
        credentials: &VoiceCredentials,
        message: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatCompletion, ProviderError>;
}

/// Parse a provider base URL from configuration.
pub(crate) fn parse_base_url(provider: &'static str, raw: &str) -> Result<Url, ProviderError> {
    let url = Url::parse(raw).map_err(|e| ProviderError::InvalidBaseUrl {
        provider,
        detail: e.to_string(),
    })?;

    match url.scheme() {
        "https" | "http" => Ok(url),
        other => Err(ProviderError::InvalidBaseUrl {
            provider,
            detail: format!("unsupported scheme {other}"),
        }),
    }
}

/// Join an absolute API path onto a provider base URL.
pub(crate) fn endpoint(
    provider: &'static str,
    base: &Url,
    path: &str,
) -> Result<Url, ProviderError> {
    base.join(path).map_err(|e| ProviderError::InvalidBaseUrl {
        provider,
        detail: e.to_string(),
    })
}

/// Build an HTTP client with the configured outbound timeout.
pub(crate) fn http_client(
    provider: &'static str,
    timeout: std::time::Duration,
) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| ProviderError::Transport { provider, source })
}

/// Turn a provider response into `T`, surfacing non-2xx status and body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: &'static str,
    response: Result<reqwest::Response, reqwest::Error>,
) -> Result<T, ProviderError> {
    let response = response.map_err(|source| ProviderError::Transport { provider, source })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!("{} API error: {} {}", provider, status.as_u16(), body);
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Malformed {
            provider,
            detail: e.to_string(),
        })
}

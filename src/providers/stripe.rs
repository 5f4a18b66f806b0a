//! Billing provider backed by Stripe through `async-stripe`.
//!
//! Read calls serve the entitlement resolver (customer by email,
//! subscriptions by status). Write calls open hosted pages: subscription
//! checkout and the billing portal.

use std::{future::Future, time::Duration};

use ::stripe::{
    BillingPortalSession, CheckoutSession, CheckoutSessionMode, Client, CreateBillingPortalSession,
    CreateCheckoutSession, CreateCheckoutSessionLineItems, Customer, CustomerId, Expandable,
    ListCustomers, ListSubscriptions, Product, StripeError, Subscription,
    SubscriptionStatusFilter,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{
    BillingCustomer, BillingProvider, BillingSubscription, CheckoutRequest, ProviderError,
    SubscriptionStatus,
};

const PROVIDER: &str = "Stripe";

/// Stripe client authenticated with the account's secret key.
///
/// The key is optional so the service starts without it; every call then
/// fails with `NotConfigured` before any request is made.
pub struct StripeClient {
    client: Option<Client>,
    timeout: Duration,
}

impl StripeClient {
    pub fn new(secret_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: secret_key.filter(|key| !key.is_empty()).map(Client::new),
            timeout,
        }
    }

    fn client(&self) -> Result<&Client, ProviderError> {
        self.client
            .as_ref()
            .ok_or(ProviderError::NotConfigured("STRIPE_SECRET_KEY"))
    }

    /// Await a Stripe call, bounded by the configured upstream timeout.
    async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, StripeError>>,
    ) -> Result<T, ProviderError> {
        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| ProviderError::Timeout {
                provider: PROVIDER,
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|e| {
                tracing::error!("Stripe API error: {}", e);
                ProviderError::from(e)
            })
    }
}

fn customer_id(raw: &str) -> Result<CustomerId, ProviderError> {
    raw.parse::<CustomerId>()
        .map_err(|e| ProviderError::Malformed {
            provider: PROVIDER,
            detail: format!("invalid customer id {raw}: {e}"),
        })
}

fn status_filter(status: SubscriptionStatus) -> SubscriptionStatusFilter {
    match status {
        SubscriptionStatus::Active => SubscriptionStatusFilter::Active,
        SubscriptionStatus::Trialing => SubscriptionStatusFilter::Trialing,
    }
}

/// `price.product` is an id unless the caller asked Stripe to expand it.
fn product_id(product: &Expandable<Product>) -> String {
    match product {
        Expandable::Id(id) => id.to_string(),
        Expandable::Object(product) => product.id.to_string(),
    }
}

fn period_end(timestamp: i64) -> Option<DateTime<Utc>> {
    (timestamp > 0)
        .then(|| DateTime::<Utc>::from_timestamp(timestamp, 0))
        .flatten()
}

impl From<Subscription> for BillingSubscription {
    fn from(sub: Subscription) -> Self {
        let product_id = sub
            .items
            .data
            .first()
            .and_then(|item| item.price.as_ref())
            .and_then(|price| price.product.as_ref())
            .map(product_id);

        Self {
            id: sub.id.to_string(),
            status: sub.status.as_str().to_string(),
            current_period_end: period_end(sub.current_period_end),
            product_id,
        }
    }
}

#[async_trait]
impl BillingProvider for StripeClient {
    async fn find_customer_by_email(
        &self,
        email: &str,
    ) -> Result<Option<BillingCustomer>, ProviderError> {
        let client = self.client()?;

        let mut params = ListCustomers::new();
        params.email = Some(email);
        params.limit = Some(1);

        let customers = self.call(Customer::list(client, &params)).await?;

        Ok(customers.data.into_iter().next().map(|c| BillingCustomer {
            id: c.id.to_string(),
            email: c.email,
        }))
    }

    async fn list_subscriptions(
        &self,
        customer: &str,
        status: SubscriptionStatus,
    ) -> Result<Vec<BillingSubscription>, ProviderError> {
        let client = self.client()?;

        let mut params = ListSubscriptions::new();
        params.customer = Some(customer_id(customer)?);
        params.status = Some(status_filter(status));
        params.limit = Some(1);

        let subscriptions = self.call(Subscription::list(client, &params)).await?;

        Ok(subscriptions.data.into_iter().map(Into::into).collect())
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<String, ProviderError> {
        let client = self.client()?;

        let customer = request.customer_id.as_deref().map(customer_id).transpose()?;
        let customer_email = customer
            .is_none()
            .then_some(request.customer_email.as_str());

        let params = CreateCheckoutSession {
            customer,
            customer_email,
            mode: Some(CheckoutSessionMode::Subscription),
            line_items: Some(vec![CreateCheckoutSessionLineItems {
                price: Some(request.price_id.clone()),
                quantity: Some(1),
                ..Default::default()
            }]),
            success_url: Some(&request.success_url),
            cancel_url: Some(&request.cancel_url),
            ..Default::default()
        };

        let session = self.call(CheckoutSession::create(client, params)).await?;
        tracing::info!("Created checkout session {}", session.id);

        session.url.ok_or_else(|| ProviderError::Malformed {
            provider: PROVIDER,
            detail: "checkout session has no url".to_string(),
        })
    }

    async fn create_portal_session(
        &self,
        customer: &str,
        return_url: &str,
    ) -> Result<String, ProviderError> {
        let client = self.client()?;

        let mut params = CreateBillingPortalSession::new(customer_id(customer)?);
        params.return_url = Some(return_url);

        let session = self.call(BillingPortalSession::create(client, params)).await?;
        tracing::info!("Created billing portal session for customer {}", customer);

        Ok(session.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_reference_resolves_to_id() {
        let id: ::stripe::ProductId = "prod_TkuTxbnkX61zsQ".parse().unwrap();
        assert_eq!(product_id(&Expandable::Id(id)), "prod_TkuTxbnkX61zsQ");
    }

    #[test]
    fn zero_period_end_is_treated_as_missing() {
        assert!(period_end(0).is_none());
        assert_eq!(
            period_end(1_767_225_600).map(|t| t.timestamp()),
            Some(1_767_225_600)
        );
    }

    #[test]
    fn status_filters_match_lookup_states() {
        assert!(matches!(
            status_filter(SubscriptionStatus::Trialing),
            SubscriptionStatusFilter::Trialing
        ));
        assert!(matches!(
            status_filter(SubscriptionStatus::Active),
            SubscriptionStatusFilter::Active
        ));
    }

    #[test]
    fn customer_ids_are_validated() {
        assert!(customer_id("cus_123").is_ok());
        assert!(matches!(
            customer_id("sub_123"),
            Err(ProviderError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn missing_secret_key_fails_before_any_request() {
        let client = StripeClient::new(None, Duration::from_secs(1));

        let err = client
            .find_customer_by_email("a@x.com")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured("STRIPE_SECRET_KEY")));

        let err = client
            .create_portal_session("cus_123", "https://app.example/dashboard")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured("STRIPE_SECRET_KEY")));
    }
}

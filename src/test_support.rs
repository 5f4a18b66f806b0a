//! In-memory provider fakes shared by unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::providers::{
    BillingCustomer, BillingProvider, BillingSubscription, ChatCompletion, CheckoutRequest,
    ProviderError, SubscriptionStatus, VoiceCredentials, VoiceProvider, WebCall,
};

enum VoiceOutcome {
    Token(String),
    Fail { status: u16, body: String },
}

/// Voice provider that records every call it receives.
pub struct FakeVoice {
    outcome: VoiceOutcome,
    web_calls: AtomicUsize,
    chat_calls: AtomicUsize,
    last_credentials: Mutex<Option<VoiceCredentials>>,
}

impl FakeVoice {
    pub fn returning_token(token: &str) -> Self {
        Self::with_outcome(VoiceOutcome::Token(token.to_string()))
    }

    pub fn failing(status: u16, body: &str) -> Self {
        Self::with_outcome(VoiceOutcome::Fail {
            status,
            body: body.to_string(),
        })
    }

    fn with_outcome(outcome: VoiceOutcome) -> Self {
        Self {
            outcome,
            web_calls: AtomicUsize::new(0),
            chat_calls: AtomicUsize::new(0),
            last_credentials: Mutex::new(None),
        }
    }

    pub fn web_calls(&self) -> usize {
        self.web_calls.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn last_credentials(&self) -> Option<VoiceCredentials> {
        self.last_credentials.lock().unwrap().clone()
    }

    fn record(&self, credentials: &VoiceCredentials) -> Result<(), ProviderError> {
        *self.last_credentials.lock().unwrap() = Some(credentials.clone());
        match &self.outcome {
            VoiceOutcome::Token(_) => Ok(()),
            VoiceOutcome::Fail { status, body } => Err(ProviderError::Status {
                provider: "Retell",
                status: *status,
                body: body.clone(),
            }),
        }
    }
}

#[async_trait]
impl VoiceProvider for FakeVoice {
    async fn create_web_call(
        &self,
        credentials: &VoiceCredentials,
    ) -> Result<WebCall, ProviderError> {
        self.web_calls.fetch_add(1, Ordering::SeqCst);
        self.record(credentials)?;
        match &self.outcome {
            VoiceOutcome::Token(token) => Ok(WebCall {
                access_token: token.clone(),
            }),
            VoiceOutcome::Fail { .. } => unreachable!("record returns the failure"),
        }
    }

    async fn create_chat_completion(
        &self,
        credentials: &VoiceCredentials,
        message: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatCompletion, ProviderError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.record(credentials)?;
        Ok(ChatCompletion {
            response: Some(format!("echo: {message}")),
            conversation_id: Some(conversation_id.unwrap_or("conv_new").to_string()),
        })
    }
}

/// Billing provider backed by fixed data, counting every lookup.
#[derive(Default)]
pub struct FakeBilling {
    customer: Option<BillingCustomer>,
    active: Vec<BillingSubscription>,
    trialing: Vec<BillingSubscription>,
    unreachable: bool,
    customer_lookups: AtomicUsize,
    subscription_lookups: AtomicUsize,
    last_checkout: Mutex<Option<CheckoutRequest>>,
    last_portal: Mutex<Option<(String, String)>>,
}

impl FakeBilling {
    pub fn no_customer() -> Self {
        Self::default()
    }

    pub fn with_customer(id: &str) -> Self {
        Self {
            customer: Some(BillingCustomer {
                id: id.to_string(),
                email: None,
            }),
            ..Self::default()
        }
    }

    /// Every lookup fails with a transport-level status error.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn active(mut self, subscription: BillingSubscription) -> Self {
        self.active.push(subscription);
        self
    }

    pub fn trialing(mut self, subscription: BillingSubscription) -> Self {
        self.trialing.push(subscription);
        self
    }

    pub fn last_checkout(&self) -> Option<CheckoutRequest> {
        self.last_checkout.lock().unwrap().clone()
    }

    /// `(customer_id, return_url)` of the last portal session.
    pub fn last_portal(&self) -> Option<(String, String)> {
        self.last_portal.lock().unwrap().clone()
    }

    /// Total number of lookups made against this provider.
    pub fn calls(&self) -> usize {
        self.customer_lookups.load(Ordering::SeqCst) + self.subscription_lookups.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<(), ProviderError> {
        if self.unreachable {
            return Err(ProviderError::Status {
                provider: "Stripe",
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BillingProvider for FakeBilling {
    async fn find_customer_by_email(
        &self,
        _email: &str,
    ) -> Result<Option<BillingCustomer>, ProviderError> {
        self.customer_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        Ok(self.customer.clone())
    }

    async fn list_subscriptions(
        &self,
        _customer_id: &str,
        status: SubscriptionStatus,
    ) -> Result<Vec<BillingSubscription>, ProviderError> {
        self.subscription_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        Ok(match status {
            SubscriptionStatus::Active => self.active.clone(),
            SubscriptionStatus::Trialing => self.trialing.clone(),
        })
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<String, ProviderError> {
        self.check_reachable()?;
        *self.last_checkout.lock().unwrap() = Some(request.clone());
        Ok("https://checkout.stripe.test/session".to_string())
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<String, ProviderError> {
        self.check_reachable()?;
        *self.last_portal.lock().unwrap() = Some((customer_id.to_string(), return_url.to_string()));
        Ok("https://billing.stripe.test/portal".to_string())
    }
}

pub fn subscription(
    id: &str,
    status: &str,
    product_id: &str,
    period_end: Option<DateTime<Utc>>,
) -> BillingSubscription {
    BillingSubscription {
        id: id.to_string(),
        status: status.to_string(),
        current_period_end: period_end,
        product_id: Some(product_id.to_string()),
    }
}

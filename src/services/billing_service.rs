//! Hosted billing pages: subscription checkout and the customer portal.
//!
//! Only tiers with a billing product can be bought. The checkout price comes
//! from configuration and must belong to that product, so a completed
//! checkout resolves back to the same tier.

use crate::{
    config::Config,
    error::AppError,
    middleware::auth::AuthContext,
    models::subscription::Tier,
    providers::{BillingProvider, CheckoutRequest},
};

/// Configured price for a purchasable tier.
///
/// # Errors
///
/// - `InvalidRequest`: the tier is not sold (free, enterprise, admin)
/// - `Configuration`: the tier's price id is not set
pub fn price_for(config: &Config, tier: Tier) -> Result<String, AppError> {
    let Some(product_id) = tier.product_id() else {
        return Err(AppError::InvalidRequest(format!(
            "The {} tier cannot be purchased",
            tier.as_str()
        )));
    };

    let (price, variable) = match tier {
        Tier::Starter => (config.stripe_price_starter.as_deref(), "STRIPE_PRICE_STARTER"),
        _ => (config.stripe_price_pro.as_deref(), "STRIPE_PRICE_PRO"),
    };

    let price = price.filter(|p| !p.is_empty()).ok_or_else(|| {
        tracing::error!("{} is not configured", variable);
        AppError::Configuration(format!("{variable} is not configured"))
    })?;

    tracing::info!("Checkout for {} uses price {} of {}", tier.as_str(), price, product_id);
    Ok(price.to_string())
}

/// Open a checkout session for `tier` and return its URL.
///
/// An existing billing customer is reused; otherwise the provider creates one
/// from the account's email.
pub async fn start_checkout(
    billing: &dyn BillingProvider,
    config: &Config,
    auth: &AuthContext,
    tier: Tier,
) -> Result<String, AppError> {
    let email = account_email(auth)?;
    let price_id = price_for(config, tier)?;

    let customer = billing.find_customer_by_email(email).await?;

    let request = CheckoutRequest {
        customer_id: customer.map(|c| c.id),
        customer_email: email.to_string(),
        price_id,
        success_url: format!("{}/dashboard?checkout=success", config.app_base_url),
        cancel_url: format!("{}/dashboard?checkout=canceled", config.app_base_url),
    };

    let url = billing.create_checkout_session(&request).await?;
    tracing::info!("Checkout started for user {} ({})", auth.user_id, tier.as_str());

    Ok(url)
}

/// Open the billing portal for the account's billing customer.
///
/// # Errors
///
/// `NotFound` when the account has never been a billing customer.
pub async fn open_portal(
    billing: &dyn BillingProvider,
    config: &Config,
    auth: &AuthContext,
) -> Result<String, AppError> {
    let email = account_email(auth)?;

    let customer = billing
        .find_customer_by_email(email)
        .await?
        .ok_or(AppError::NotFound("Billing customer"))?;

    let return_url = format!("{}/dashboard", config.app_base_url);
    let url = billing.create_portal_session(&customer.id, &return_url).await?;

    Ok(url)
}

fn account_email(auth: &AuthContext) -> Result<&str, AppError> {
    auth.email.as_deref().ok_or_else(|| {
        AppError::Authentication("User not authenticated or email not available".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeBilling;
    use uuid::Uuid;

    fn auth(email: Option<&str>) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            email: email.map(str::to_string),
        }
    }

    #[test]
    fn unsold_tiers_are_rejected() {
        let config = Config::for_tests();
        for tier in [Tier::Free, Tier::Enterprise, Tier::Admin] {
            assert!(matches!(
                price_for(&config, tier),
                Err(AppError::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn missing_price_is_a_configuration_error() {
        let mut config = Config::for_tests();
        config.stripe_price_pro = None;

        let err = price_for(&config, Tier::Pro).unwrap_err();
        assert!(matches!(err, AppError::Configuration(ref m) if m == "STRIPE_PRICE_PRO is not configured"));
        assert_eq!(price_for(&config, Tier::Starter).unwrap(), "price_starter_test");
    }

    #[tokio::test]
    async fn checkout_reuses_existing_customer() {
        let billing = FakeBilling::with_customer("cus_1");
        let config = Config::for_tests();

        let url = start_checkout(&billing, &config, &auth(Some("a@x.com")), Tier::Pro)
            .await
            .unwrap();

        assert_eq!(url, "https://checkout.stripe.test/session");
        let request = billing.last_checkout().unwrap();
        assert_eq!(request.customer_id.as_deref(), Some("cus_1"));
        assert_eq!(request.price_id, "price_pro_test");
        assert_eq!(request.success_url, "https://app.example/dashboard?checkout=success");
    }

    #[tokio::test]
    async fn checkout_for_new_customer_passes_email() {
        let billing = FakeBilling::no_customer();
        let config = Config::for_tests();

        start_checkout(&billing, &config, &auth(Some("new@x.com")), Tier::Starter)
            .await
            .unwrap();

        let request = billing.last_checkout().unwrap();
        assert!(request.customer_id.is_none());
        assert_eq!(request.customer_email, "new@x.com");
        assert_eq!(request.price_id, "price_starter_test");
    }

    #[tokio::test]
    async fn unsold_tier_never_reaches_billing() {
        let billing = FakeBilling::with_customer("cus_1");
        let config = Config::for_tests();

        let result = start_checkout(&billing, &config, &auth(Some("a@x.com")), Tier::Free).await;

        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        assert_eq!(billing.calls(), 0);
        assert!(billing.last_checkout().is_none());
    }

    #[tokio::test]
    async fn portal_requires_a_billing_customer() {
        let billing = FakeBilling::no_customer();
        let config = Config::for_tests();

        let err = open_portal(&billing, &config, &auth(Some("a@x.com")))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound("Billing customer")));
        assert!(billing.last_portal().is_none());
    }

    #[tokio::test]
    async fn portal_returns_to_dashboard() {
        let billing = FakeBilling::with_customer("cus_9");
        let config = Config::for_tests();

        let url = open_portal(&billing, &config, &auth(Some("a@x.com")))
            .await
            .unwrap();

        assert_eq!(url, "https://billing.stripe.test/portal");
        assert_eq!(
            billing.last_portal(),
            Some(("cus_9".to_string(), "https://app.example/dashboard".to_string()))
        );
    }

    #[tokio::test]
    async fn billing_outage_is_upstream() {
        let billing = FakeBilling::unreachable();
        let config = Config::for_tests();

        let err = open_portal(&billing, &config, &auth(Some("a@x.com")))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn email_is_required() {
        let billing = FakeBilling::with_customer("cus_1");
        let config = Config::for_tests();

        let err = start_checkout(&billing, &config, &auth(None), Tier::Pro)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Authentication(_)));
        assert_eq!(billing.calls(), 0);
    }
}

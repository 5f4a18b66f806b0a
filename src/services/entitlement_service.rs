//! Entitlement resolution: what subscription tier and widget quota an account
//! has right now.
//!
//! # Resolution Order
//!
//! 1. Admin short-circuit: admins get an unlimited snapshot and the billing
//!    provider is never contacted
//! 2. Billing customer lookup by email; no customer means free tier
//! 3. Active and trialing subscriptions are listed separately and merged;
//!    the first one decides the tier
//! 4. Product id → tier (unknown products are free), tier → widget quota
//!
//! Errors are surfaced, never guessed around. Callers that must always have a
//! snapshot use [`snapshot_or_free`].

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        role::{Role, highest},
        subscription::{SubscriptionSnapshot, Tier},
    },
    providers::{BillingProvider, BillingSubscription, SubscriptionStatus},
    services::role_service,
};

/// Resolve the snapshot for an authenticated account.
///
/// The account's email is required to find its billing customer.
pub async fn check_subscription(
    pool: &DbPool,
    billing: &dyn BillingProvider,
    auth: &AuthContext,
) -> Result<SubscriptionSnapshot, AppError> {
    let email = auth
        .email
        .as_deref()
        .filter(|email| !email.is_empty())
        .ok_or_else(|| {
            AppError::Authentication("User not authenticated or email not available".to_string())
        })?;

    tracing::info!("Checking subscription for user {}", auth.user_id);
    let roles = role_service::fetch_roles(pool, auth.user_id).await?;

    resolve_snapshot(billing, &roles, email).await
}

/// Resolve the subscription snapshot for an account holding `roles`.
///
/// # Errors
///
/// - `Configuration`: billing secret key missing (only for non-admins)
/// - `Upstream`: billing provider failure
pub async fn resolve_snapshot(
    billing: &dyn BillingProvider,
    roles: &[Role],
    email: &str,
) -> Result<SubscriptionSnapshot, AppError> {
    if highest(roles).is_admin() {
        tracing::info!("Admin account, skipping billing lookup");
        return Ok(SubscriptionSnapshot::admin());
    }

    let Some(customer) = billing.find_customer_by_email(email).await? else {
        tracing::info!("No billing customer found, using free tier");
        return Ok(SubscriptionSnapshot::free());
    };

    let active = billing
        .list_subscriptions(&customer.id, SubscriptionStatus::Active)
        .await?;
    let trialing = billing
        .list_subscriptions(&customer.id, SubscriptionStatus::Trialing)
        .await?;

    let current = merge_subscriptions(active, trialing).into_iter().next();
    let snapshot = snapshot_for(current);

    tracing::info!(
        "Resolved subscription for customer {}: tier={} trialing={}",
        customer.id,
        snapshot.tier.as_str(),
        snapshot.is_trialing
    );

    Ok(snapshot)
}

/// Active subscriptions first, then trialing ones not already listed.
pub fn merge_subscriptions(
    active: Vec<BillingSubscription>,
    trialing: Vec<BillingSubscription>,
) -> Vec<BillingSubscription> {
    let mut merged = active;
    for sub in trialing {
        if !merged.iter().any(|seen| seen.id == sub.id) {
            merged.push(sub);
        }
    }
    merged
}

/// Snapshot for the subscription that decides the tier, if any.
pub fn snapshot_for(subscription: Option<BillingSubscription>) -> SubscriptionSnapshot {
    let Some(subscription) = subscription else {
        return SubscriptionSnapshot::free();
    };

    let tier = subscription
        .product_id
        .as_deref()
        .map(Tier::from_product_id)
        .unwrap_or(Tier::Free);

    SubscriptionSnapshot {
        subscribed: true,
        tier,
        widget_limit: tier.widget_limit(),
        subscription_end: subscription.current_period_end,
        is_trialing: subscription.is_trialing(),
        is_admin: false,
    }
}

/// The caller-side fallback: any resolution failure degrades to the free tier.
pub fn snapshot_or_free(result: Result<SubscriptionSnapshot, AppError>) -> SubscriptionSnapshot {
    result.unwrap_or_else(|e| {
        tracing::warn!("Error checking subscription, falling back to free tier: {}", e);
        SubscriptionSnapshot::free()
    })
}

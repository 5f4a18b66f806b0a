//! Subscription tiers, widget quotas and the resolved subscription snapshot.
//!
//! The two lookup tables here are part of the contract with the billing
//! provider: product id → tier, and tier → widget quota.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Billing product ids mapped to the tier they grant.
pub const PRODUCT_TIERS: &[(&str, Tier)] = &[
    ("prod_TkuTSIcFmcYgaJ", Tier::Starter),
    ("prod_TkuTxbnkX61zsQ", Tier::Pro),
];

/// Wire value sent for an unlimited quota. Dashboard clients compare
/// `widget_limit` numerically, so unlimited is rendered as a large number.
pub const UNLIMITED_WIDGETS_WIRE: u32 = 999_999;

/// Named subscription level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Starter,
    Pro,
    Enterprise,
    Admin,
}

impl Tier {
    /// Map a billed product id to a tier. Unknown products fall back to `Free`.
    pub fn from_product_id(product_id: &str) -> Self {
        PRODUCT_TIERS
            .iter()
            .find(|(id, _)| *id == product_id)
            .map(|(_, tier)| *tier)
            .unwrap_or(Tier::Free)
    }

    /// Billing product sold for this tier, if it can be bought at checkout.
    pub fn product_id(&self) -> Option<&'static str> {
        PRODUCT_TIERS
            .iter()
            .find(|(_, tier)| tier == self)
            .map(|(id, _)| *id)
    }

    pub fn widget_limit(&self) -> WidgetLimit {
        match self {
            Tier::Free => WidgetLimit::Bounded(5),
            Tier::Starter => WidgetLimit::Bounded(50),
            Tier::Pro => WidgetLimit::Bounded(200),
            Tier::Enterprise | Tier::Admin => WidgetLimit::Unlimited,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Starter => "starter",
            Tier::Pro => "pro",
            Tier::Enterprise => "enterprise",
            Tier::Admin => "admin",
        }
    }
}

/// Maximum number of widgets an account may own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetLimit {
    Unlimited,
    Bounded(u32),
}

impl WidgetLimit {
    /// Whether an account that already owns `count` widgets may create one more.
    pub fn allows_another(&self, count: u64) -> bool {
        match self {
            WidgetLimit::Unlimited => true,
            WidgetLimit::Bounded(limit) => count < u64::from(*limit),
        }
    }

    pub fn wire_value(&self) -> u32 {
        match self {
            WidgetLimit::Unlimited => UNLIMITED_WIDGETS_WIRE,
            WidgetLimit::Bounded(limit) => *limit,
        }
    }
}

impl Serialize for WidgetLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.wire_value())
    }
}

/// Resolved billing state for one account at one point in time.
///
/// Computed fresh on every request and never persisted.
///
/// # JSON Example
///
/// ```json
/// {
///   "subscribed": true,
///   "tier": "pro",
///   "widget_limit": 200,
///   "subscription_end": "2026-11-01T00:00:00Z",
///   "is_trialing": false,
///   "is_admin": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionSnapshot {
    pub subscribed: bool,
    pub tier: Tier,
    pub widget_limit: WidgetLimit,
    pub subscription_end: Option<DateTime<Utc>>,
    pub is_trialing: bool,
    pub is_admin: bool,
}

impl SubscriptionSnapshot {
    /// Snapshot for accounts with no paid subscription, and the fallback
    /// callers use when resolution fails.
    pub fn free() -> Self {
        Self {
            subscribed: false,
            tier: Tier::Free,
            widget_limit: Tier::Free.widget_limit(),
            subscription_end: None,
            is_trialing: false,
            is_admin: false,
        }
    }

    /// Staff accounts are never billing-gated.
    pub fn admin() -> Self {
        Self {
            subscribed: true,
            tier: Tier::Admin,
            widget_limit: Tier::Admin.widget_limit(),
            subscription_end: None,
            is_trialing: false,
            is_admin: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_products_map_to_tiers() {
        assert_eq!(Tier::from_product_id("prod_TkuTSIcFmcYgaJ"), Tier::Starter);
        assert_eq!(Tier::from_product_id("prod_TkuTxbnkX61zsQ"), Tier::Pro);
    }

    #[test]
    fn only_paid_tiers_have_products() {
        for tier in [Tier::Starter, Tier::Pro] {
            let product = tier.product_id().unwrap();
            assert_eq!(Tier::from_product_id(product), tier);
        }
        for tier in [Tier::Free, Tier::Enterprise, Tier::Admin] {
            assert!(tier.product_id().is_none());
        }
    }

    #[test]
    fn unknown_product_is_free() {
        assert_eq!(Tier::from_product_id("prod_unknown"), Tier::Free);
        assert_eq!(Tier::from_product_id(""), Tier::Free);
    }

    #[test]
    fn tier_limits() {
        assert_eq!(Tier::Free.widget_limit(), WidgetLimit::Bounded(5));
        assert_eq!(Tier::Starter.widget_limit(), WidgetLimit::Bounded(50));
        assert_eq!(Tier::Pro.widget_limit(), WidgetLimit::Bounded(200));
        assert_eq!(Tier::Enterprise.widget_limit(), WidgetLimit::Unlimited);
        assert_eq!(Tier::Admin.widget_limit(), WidgetLimit::Unlimited);
    }

    #[test]
    fn bounded_limit_boundary() {
        let limit = WidgetLimit::Bounded(5);
        assert!(limit.allows_another(4));
        assert!(!limit.allows_another(5));
        assert!(!limit.allows_another(6));
        assert!(WidgetLimit::Unlimited.allows_another(u64::MAX));
    }

    #[test]
    fn snapshot_serializes_tier_and_limit() {
        let json = serde_json::to_value(SubscriptionSnapshot::admin()).unwrap();
        assert_eq!(json["tier"], "admin");
        assert_eq!(json["widget_limit"], UNLIMITED_WIDGETS_WIRE);
        assert_eq!(json["is_admin"], true);
        assert!(json["subscription_end"].is_null());

        let json = serde_json::to_value(SubscriptionSnapshot::free()).unwrap();
        assert_eq!(json["tier"], "free");
        assert_eq!(json["widget_limit"], 5);
        assert_eq!(json["subscribed"], false);
    }
}

//! Checkout and billing portal request/response types.

use serde::{Deserialize, Serialize};

use crate::models::subscription::Tier;

/// Request body for `POST /functions/v1/create-checkout`.
///
/// ```json
/// { "tier": "starter" }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateCheckoutRequest {
    pub tier: Tier,
}

/// Hosted page the dashboard opens in a new tab.
#[derive(Debug, Serialize)]
pub struct SessionUrlResponse {
    pub url: String,
}

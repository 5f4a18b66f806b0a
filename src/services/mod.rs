//! Business logic services.
//!
//! Services hold the core logic separated from HTTP handlers. Resolution
//! logic takes pre-fetched rows and provider traits so it can be exercised
//! without a database.

pub mod admin_service;
pub mod billing_service;
pub mod chat_service;
pub mod credential_service;
pub mod demo_service;
pub mod entitlement_service;
pub mod invitation_service;
pub mod keep_alive_service;
pub mod override_chain;
pub mod profile_service;
pub mod role_service;
pub mod widget_service;

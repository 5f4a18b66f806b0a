//! Data models: database rows and API request/response types.

/// Checkout and portal request/response
pub mod billing;
/// Web call request/response
pub mod call;
/// Text-chat request/response
pub mod chat;
/// Demo widget settings
pub mod demo;
/// Role invitations
pub mod invitation;
/// Account profile
pub mod profile;
/// Roles and their ranking
pub mod role;
/// Tiers, widget limits and the subscription snapshot
pub mod subscription;
/// Widget configuration
pub mod widget;

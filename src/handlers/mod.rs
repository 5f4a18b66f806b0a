//! HTTP request handlers.
//!
//! Each handler extracts request data, delegates to a service and maps the
//! result to a JSON response. Failures become `{ "error": "..." }` through
//! [`AppError`](crate::error::AppError).

/// System statistics for super admins
pub mod admin;
/// Checkout and billing portal sessions
pub mod billing;
/// Voice web call creation
pub mod calls;
/// Text-chat proxy
pub mod chat;
/// Admin demo settings
pub mod demo;
/// Health check and keep-alive
pub mod health;
/// Invitation lifecycle
pub mod invitations;
/// Profile and roles of the signed-in account
pub mod profile;
/// Subscription check
pub mod subscription;
/// Widget management
pub mod widgets;

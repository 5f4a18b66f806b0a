//! HTTP middleware components.
//!
//! Middleware run before route handlers. Here they authenticate requests
//! and short-circuit the ones that fail.

/// Bearer JWT authentication middleware
pub mod auth;

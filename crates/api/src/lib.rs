//! HTTP surface for the marketplace.
//!
//! Exposes the axum application ([`app::build_app`]) plus the session-token
//! middleware. The `bazaar-api` binary serves it.

pub mod app;
pub mod middleware;

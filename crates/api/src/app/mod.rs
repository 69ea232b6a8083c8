//! HTTP application wiring.
//!
//! - `services.rs`: repository/session/action wiring behind the handlers
//! - `routes/`: one handler file per resource
//! - `dto.rs`: request payloads with no domain counterpart
//! - `errors.rs`: the outcome envelope as HTTP responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the production router: services from the environment, admin
/// bootstrap, then the full route table.
pub async fn build_app() -> Router {
    let services = Arc::new(services::build_services().await);
    services::bootstrap_admin(&services).await;
    build_app_with(services)
}

/// Assemble the router around existing services (tests wire their own).
pub fn build_app_with(services: Arc<services::AppServices>) -> Router {
    Router::new()
        .route("/healthz", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(Extension(services))
                .layer(CookieManagerLayer::new())
                .layer(axum::middleware::from_fn(middleware::resolve_request_token)),
        )
}

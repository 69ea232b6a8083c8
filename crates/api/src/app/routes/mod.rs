use axum::{routing::get, Router};

pub mod auth;
pub mod categories;
pub mod products;
pub mod revalidations;
pub mod system;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .nest("/api/products", products::router())
        .nest("/api/categories", categories::router())
        .nest("/api/auth", auth::router())
        .route("/api/stream/revalidations", get(revalidations::stream))
}

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};

use bazaar_catalog::{ProductDraft, ProductPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::middleware::RequestToken;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/mine", get(list_my_products))
        .route(
            "/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/:id/status", patch(update_product_status))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListQuery>,
) -> axum::response::Response {
    let limit = query.limit.unwrap_or(0);
    errors::respond(StatusCode::OK, services.products_get_all(limit).await)
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    errors::respond(StatusCode::OK, services.products_get_one(&id).await)
}

pub async fn list_my_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(token): Extension<RequestToken>,
) -> axum::response::Response {
    errors::respond(
        StatusCode::OK,
        services.products_list_mine(token.as_deref()).await,
    )
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(token): Extension<RequestToken>,
    Json(draft): Json<ProductDraft>,
) -> axum::response::Response {
    errors::respond(
        StatusCode::CREATED,
        services.products_create(token.as_deref(), draft).await,
    )
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(token): Extension<RequestToken>,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> axum::response::Response {
    errors::respond(
        StatusCode::OK,
        services.products_update(token.as_deref(), &id, patch).await,
    )
}

pub async fn update_product_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(token): Extension<RequestToken>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateStatusRequest>,
) -> axum::response::Response {
    errors::respond(
        StatusCode::OK,
        services
            .products_update_status(token.as_deref(), &id, body.status)
            .await,
    )
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(token): Extension<RequestToken>,
    Path(id): Path<String>,
) -> axum::response::Response {
    errors::respond(
        StatusCode::OK,
        services.products_delete(token.as_deref(), &id).await,
    )
}

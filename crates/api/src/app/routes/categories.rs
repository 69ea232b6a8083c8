use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use bazaar_catalog::{CategoryDraft, CategoryPatch};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::middleware::RequestToken;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    errors::respond(StatusCode::OK, services.categories_list().await)
}

pub async fn get_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    errors::respond(StatusCode::OK, services.categories_get_one(&id).await)
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(token): Extension<RequestToken>,
    Json(draft): Json<CategoryDraft>,
) -> axum::response::Response {
    errors::respond(
        StatusCode::CREATED,
        services.categories_create(token.as_deref(), draft).await,
    )
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(token): Extension<RequestToken>,
    Path(id): Path<String>,
    Json(patch): Json<CategoryPatch>,
) -> axum::response::Response {
    errors::respond(
        StatusCode::OK,
        services.categories_update(token.as_deref(), &id, patch).await,
    )
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(token): Extension<RequestToken>,
    Path(id): Path<String>,
) -> axum::response::Response {
    errors::respond(
        StatusCode::OK,
        services.categories_delete(token.as_deref(), &id).await,
    )
}

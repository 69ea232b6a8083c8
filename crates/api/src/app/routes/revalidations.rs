//! Live revalidation feed.
//!
//! Clients (the storefront's cache layer) keep one open connection and
//! re-fetch whatever paths come through. Delivery is best-effort; a consumer
//! that falls behind misses signals rather than stalling publishers.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::Extension;
use axum::response::sse::Event as SseEvent;

use crate::app::services::{self, AppServices};

pub async fn stream(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    services::revalidation_sse_stream(services.revalidations())
}

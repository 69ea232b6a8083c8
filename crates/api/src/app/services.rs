//! Service wiring: repository, sessions, actions, and the revalidation feed.
//!
//! `DATABASE_URL` selects the Postgres-backed repository; without it the
//! process runs fully in memory (dev/test). Accounts and sessions stay
//! in-memory in both modes (can move to Postgres later).

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};

use bazaar_actions::{ActionError, CategoryActions, ProductActions};
use bazaar_auth::{
    AuthService, InMemoryAccountDirectory, InMemorySessionStore, Role, SessionStore, SignupFields,
};
use bazaar_catalog::{
    Category, CategoryDraft, CategoryPatch, Product, ProductDraft, ProductPatch, ProductStatus,
};
use bazaar_store::{InMemoryRepository, PostgresRepository, RevalidationChannel};

#[cfg(feature = "redis")]
use bazaar_store::revalidation::RedisRevalidationBus;

pub enum AppServices {
    InMemory {
        products: ProductActions<Arc<InMemoryRepository>>,
        categories: CategoryActions<Arc<InMemoryRepository>>,
        auth: Arc<AuthService>,
        revalidations: RevalidationChannel,
    },
    Postgres {
        products: ProductActions<Arc<PostgresRepository>>,
        categories: CategoryActions<Arc<PostgresRepository>>,
        auth: Arc<AuthService>,
        revalidations: RevalidationChannel,
    },
}

/// Build services from the environment (used by `main`).
pub async fn build_services() -> AppServices {
    match std::env::var("DATABASE_URL") {
        Ok(url) => build_postgres_services(&url).await,
        Err(_) => build_in_memory_services(),
    }
}

/// Fully in-memory wiring (dev/test).
pub fn build_in_memory_services() -> AppServices {
    let repo = Arc::new(InMemoryRepository::new());
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let revalidations = RevalidationChannel::default();

    bridge_revalidations_to_redis(&revalidations);

    AppServices::InMemory {
        products: ProductActions::new(
            Arc::clone(&repo),
            Arc::clone(&sessions),
            revalidations.clone(),
        ),
        categories: CategoryActions::new(repo, Arc::clone(&sessions)),
        auth: Arc::new(AuthService::new(
            Arc::new(InMemoryAccountDirectory::new()),
            sessions,
        )),
        revalidations,
    }
}

async fn build_postgres_services(database_url: &str) -> AppServices {
    let pool = sqlx::PgPool::connect(database_url)
        .await
        .expect("failed to connect to Postgres");

    let repo = Arc::new(PostgresRepository::new(pool));
    repo.ensure_schema()
        .await
        .expect("failed to prepare the documents table");

    // Accounts and sessions stay in-memory (can move to Postgres later).
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let revalidations = RevalidationChannel::default();

    bridge_revalidations_to_redis(&revalidations);

    AppServices::Postgres {
        products: ProductActions::new(
            Arc::clone(&repo),
            Arc::clone(&sessions),
            revalidations.clone(),
        ),
        categories: CategoryActions::new(repo, Arc::clone(&sessions)),
        auth: Arc::new(AuthService::new(
            Arc::new(InMemoryAccountDirectory::new()),
            sessions,
        )),
        revalidations,
    }
}

/// Mirror revalidation signals onto Redis pub/sub when `REDIS_URL` is set.
#[cfg(feature = "redis")]
fn bridge_revalidations_to_redis(revalidations: &RevalidationChannel) {
    let Ok(redis_url) = std::env::var("REDIS_URL") else {
        return;
    };
    let channel = std::env::var("REVALIDATION_CHANNEL")
        .unwrap_or_else(|_| "bazaar.revalidations".to_string());

    match RedisRevalidationBus::new(&redis_url, channel) {
        Ok(bus) => {
            bus.forward_from(revalidations);
        }
        Err(e) => tracing::warn!("revalidation bridge disabled: {e:?}"),
    }
}

#[cfg(not(feature = "redis"))]
fn bridge_revalidations_to_redis(_revalidations: &RevalidationChannel) {}

/// Provision the operator account named by `ADMIN_EMAIL`/`ADMIN_PASSWORD`.
///
/// Best-effort: a restart with the account already registered logs and moves
/// on.
pub async fn bootstrap_admin(services: &AppServices) {
    let (Ok(email), Ok(password)) = (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD"))
    else {
        tracing::warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set; no admin account provisioned");
        return;
    };

    let fields = SignupFields {
        email,
        password,
        name: "Administrator".to_string(),
    };
    match services.auth().provision(fields, Role::Admin).await {
        Ok(user) => tracing::info!(user_id = %user.id, "admin account provisioned"),
        Err(e) => tracing::warn!("admin bootstrap skipped: {e}"),
    }
}

impl AppServices {
    pub fn auth(&self) -> &Arc<AuthService> {
        match self {
            AppServices::InMemory { auth, .. } => auth,
            AppServices::Postgres { auth, .. } => auth,
        }
    }

    pub fn revalidations(&self) -> &RevalidationChannel {
        match self {
            AppServices::InMemory { revalidations, .. } => revalidations,
            AppServices::Postgres { revalidations, .. } => revalidations,
        }
    }

    pub async fn products_get_all(&self, limit: usize) -> Result<Vec<Product>, ActionError> {
        match self {
            AppServices::InMemory { products, .. } => products.get_all(limit).await,
            AppServices::Postgres { products, .. } => products.get_all(limit).await,
        }
    }

    pub async fn products_get_one(&self, id: &str) -> Result<Product, ActionError> {
        match self {
            AppServices::InMemory { products, .. } => products.get_one(id).await,
            AppServices::Postgres { products, .. } => products.get_one(id).await,
        }
    }

    pub async fn products_list_mine(
        &self,
        token: Option<&str>,
    ) -> Result<Vec<Product>, ActionError> {
        match self {
            AppServices::InMemory { products, .. } => products.list_mine(token).await,
            AppServices::Postgres { products, .. } => products.list_mine(token).await,
        }
    }

    pub async fn products_create(
        &self,
        token: Option<&str>,
        draft: ProductDraft,
    ) -> Result<Product, ActionError> {
        match self {
            AppServices::InMemory { products, .. } => products.create(token, draft).await,
            AppServices::Postgres { products, .. } => products.create(token, draft).await,
        }
    }

    pub async fn products_update(
        &self,
        token: Option<&str>,
        id: &str,
        patch: ProductPatch,
    ) -> Result<Product, ActionError> {
        match self {
            AppServices::InMemory { products, .. } => products.update(token, id, patch).await,
            AppServices::Postgres { products, .. } => products.update(token, id, patch).await,
        }
    }

    pub async fn products_update_status(
        &self,
        token: Option<&str>,
        id: &str,
        to: ProductStatus,
    ) -> Result<Product, ActionError> {
        match self {
            AppServices::InMemory { products, .. } => products.update_status(token, id, to).await,
            AppServices::Postgres { products, .. } => products.update_status(token, id, to).await,
        }
    }

    pub async fn products_delete(
        &self,
        token: Option<&str>,
        id: &str,
    ) -> Result<Product, ActionError> {
        match self {
            AppServices::InMemory { products, .. } => products.delete(token, id).await,
            AppServices::Postgres { products, .. } => products.delete(token, id).await,
        }
    }

    pub async fn categories_list(&self) -> Result<Vec<Category>, ActionError> {
        match self {
            AppServices::InMemory { categories, .. } => categories.list().await,
            AppServices::Postgres { categories, .. } => categories.list().await,
        }
    }

    pub async fn categories_get_one(&self, id: &str) -> Result<Category, ActionError> {
        match self {
            AppServices::InMemory { categories, .. } => categories.get_one(id).await,
            AppServices::Postgres { categories, .. } => categories.get_one(id).await,
        }
    }

    pub async fn categories_create(
        &self,
        token: Option<&str>,
        draft: CategoryDraft,
    ) -> Result<Category, ActionError> {
        match self {
            AppServices::InMemory { categories, .. } => categories.create(token, draft).await,
            AppServices::Postgres { categories, .. } => categories.create(token, draft).await,
        }
    }

    pub async fn categories_update(
        &self,
        token: Option<&str>,
        id: &str,
        patch: CategoryPatch,
    ) -> Result<Category, ActionError> {
        match self {
            AppServices::InMemory { categories, .. } => categories.update(token, id, patch).await,
            AppServices::Postgres { categories, .. } => categories.update(token, id, patch).await,
        }
    }

    pub async fn categories_delete(
        &self,
        token: Option<&str>,
        id: &str,
    ) -> Result<Category, ActionError> {
        match self {
            AppServices::InMemory { categories, .. } => categories.delete(token, id).await,
            AppServices::Postgres { categories, .. } => categories.delete(token, id).await,
        }
    }
}

/// SSE stream of revalidation signals (used by `/api/stream/revalidations`).
pub fn revalidation_sse_stream(
    channel: &RevalidationChannel,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>> + use<>> {
    let rx = channel.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|item| match item {
        Ok(revalidation) => {
            let data =
                serde_json::to_string(&revalidation).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event("revalidation").data(data)))
        }
        // Lagged receivers skip ahead rather than ending the stream.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

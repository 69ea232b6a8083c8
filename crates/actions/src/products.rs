//! Product actions.
//!
//! Every operation follows the same template: resolve the caller's identity
//! from the request token, run the ownership guard for mutations, call the
//! repository, and map the result into `Result<_, ActionError>`. Reads are
//! public; mutations demand the owning seller or an admin.
//!
//! ## Side effects
//!
//! `create` publishes a revalidation signal for `/products` and `update` for
//! `/products/{id}`, in both cases only after the repository write has
//! succeeded. `update_status` and `delete` publish nothing.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{info, instrument};

use bazaar_auth::{authorize_mutation, resolve_identity, SessionStore, User};
use bazaar_catalog::{Product, ProductDraft, ProductPatch, ProductStatus, TransitionTable};
use bazaar_store::{collections, Filter, Repository, RevalidationChannel};

use crate::ActionError;

/// The product action layer.
pub struct ProductActions<R> {
    repo: R,
    sessions: Arc<dyn SessionStore>,
    revalidations: RevalidationChannel,
    transitions: TransitionTable,
}

impl<R: Repository> ProductActions<R> {
    pub fn new(
        repo: R,
        sessions: Arc<dyn SessionStore>,
        revalidations: RevalidationChannel,
    ) -> Self {
        Self {
            repo,
            sessions,
            revalidations,
            transitions: TransitionTable::marketplace(),
        }
    }

    /// Replace the default status transition rules.
    pub fn with_transitions(mut self, transitions: TransitionTable) -> Self {
        self.transitions = transitions;
        self
    }

    async fn identity(&self, token: Option<&str>) -> Result<Option<User>, ActionError> {
        resolve_identity(token, self.sessions.as_ref())
            .await
            .map_err(ActionError::from)
    }

    async fn require_identity(&self, token: Option<&str>) -> Result<User, ActionError> {
        self.identity(token)
            .await?
            .ok_or_else(|| ActionError::unauthorized("authentication required"))
    }

    /// Listings owned by the caller, in insertion order.
    #[instrument(skip(self, token), err)]
    pub async fn list_mine(&self, token: Option<&str>) -> Result<Vec<Product>, ActionError> {
        let user = self.require_identity(token).await?;
        let docs = self
            .repo
            .find(
                collections::PRODUCTS,
                &Filter::field("seller", user.id.to_string()),
                0,
            )
            .await?;
        decode_products(docs)
    }

    /// Fetch one listing. Public.
    #[instrument(skip(self), err)]
    pub async fn get_one(&self, id: &str) -> Result<Product, ActionError> {
        match self.repo.find_by_id(collections::PRODUCTS, id).await? {
            Some(doc) => decode_product(doc),
            None => Err(ActionError::not_found(format!("no product with id {id}"))),
        }
    }

    /// List listings. Public. A `limit` of 0 means unbounded.
    #[instrument(skip(self), err)]
    pub async fn get_all(&self, limit: usize) -> Result<Vec<Product>, ActionError> {
        let docs = self
            .repo
            .find(collections::PRODUCTS, &Filter::all(), limit)
            .await?;
        decode_products(docs)
    }

    /// Create a listing owned by the caller.
    ///
    /// The seller is always the resolved identity (the draft carries no
    /// seller field) and new listings start as drafts.
    #[instrument(skip(self, token, draft), err)]
    pub async fn create(
        &self,
        token: Option<&str>,
        draft: ProductDraft,
    ) -> Result<Product, ActionError> {
        let user = self.require_identity(token).await?;

        let product = Product::create(draft, user.id)?;
        let doc = encode_product(&product)?;
        let stored = self.repo.create(collections::PRODUCTS, doc).await?;
        let product = decode_product(stored)?;

        self.revalidations.publish("/products");
        info!(product_id = %product.id, seller = %user.id, "product created");
        Ok(product)
    }

    /// Apply a partial update to a listing the caller may mutate.
    #[instrument(skip(self, token, patch), err)]
    pub async fn update(
        &self,
        token: Option<&str>,
        id: &str,
        patch: ProductPatch,
    ) -> Result<Product, ActionError> {
        let user = self.require_identity(token).await?;
        let mut product = self.get_one(id).await?;
        authorize_mutation(Some(&user), &product)?;

        product.apply_patch(patch)?;
        let doc = encode_product(&product)?;
        let stored = self.repo.update(collections::PRODUCTS, id, doc).await?;
        let product = decode_product(stored)?;

        self.revalidations.publish(format!("/products/{id}"));
        info!(product_id = %product.id, "product updated");
        Ok(product)
    }

    /// Move a listing to a new status, subject to the transition table.
    #[instrument(skip(self, token), err)]
    pub async fn update_status(
        &self,
        token: Option<&str>,
        id: &str,
        to: ProductStatus,
    ) -> Result<Product, ActionError> {
        let user = self.require_identity(token).await?;
        let mut product = self.get_one(id).await?;
        authorize_mutation(Some(&user), &product)?;

        product.change_status(to, user.role, &self.transitions)?;
        let doc = encode_product(&product)?;
        let stored = self.repo.update(collections::PRODUCTS, id, doc).await?;
        let product = decode_product(stored)?;

        info!(product_id = %product.id, status = %to, "product status changed");
        Ok(product)
    }

    /// Delete a listing the caller may mutate. Returns the deleted listing.
    #[instrument(skip(self, token), err)]
    pub async fn delete(&self, token: Option<&str>, id: &str) -> Result<Product, ActionError> {
        let user = self.require_identity(token).await?;
        let product = self.get_one(id).await?;
        authorize_mutation(Some(&user), &product)?;

        self.repo.delete(collections::PRODUCTS, id).await?;
        info!(product_id = %id, "product deleted");
        Ok(product)
    }
}

fn encode_product(product: &Product) -> Result<JsonValue, ActionError> {
    serde_json::to_value(product)
        .map_err(|e| ActionError::repository(format!("failed to encode product: {e}")))
}

fn decode_product(doc: JsonValue) -> Result<Product, ActionError> {
    serde_json::from_value(doc)
        .map_err(|e| ActionError::repository(format!("stored product is malformed: {e}")))
}

fn decode_products(docs: Vec<JsonValue>) -> Result<Vec<Product>, ActionError> {
    docs.into_iter().map(decode_product).collect()
}

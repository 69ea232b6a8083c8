//! Category actions.
//!
//! Categories are managed by admins and read by anyone. Same template as the
//! product actions; the extra wrinkle is name/slug uniqueness, checked
//! against the collection before each write.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{info, instrument};

use bazaar_auth::{authorize_admin, resolve_identity, SessionStore, User};
use bazaar_catalog::{Category, CategoryDraft, CategoryPatch};
use bazaar_store::{collections, Filter, Repository};

use crate::ActionError;

/// The category action layer.
pub struct CategoryActions<R> {
    repo: R,
    sessions: Arc<dyn SessionStore>,
}

impl<R: Repository> CategoryActions<R> {
    pub fn new(repo: R, sessions: Arc<dyn SessionStore>) -> Self {
        Self { repo, sessions }
    }

    async fn require_admin(&self, token: Option<&str>) -> Result<User, ActionError> {
        let identity = resolve_identity(token, self.sessions.as_ref())
            .await
            .map_err(ActionError::from)?;
        let Some(user) = identity else {
            return Err(ActionError::unauthorized("authentication required"));
        };
        authorize_admin(Some(&user))?;
        Ok(user)
    }

    /// All categories, in insertion order. Public.
    #[instrument(skip(self), err)]
    pub async fn list(&self) -> Result<Vec<Category>, ActionError> {
        let docs = self
            .repo
            .find(collections::CATEGORIES, &Filter::all(), 0)
            .await?;
        decode_categories(docs)
    }

    /// Fetch one category. Public.
    #[instrument(skip(self), err)]
    pub async fn get_one(&self, id: &str) -> Result<Category, ActionError> {
        match self.repo.find_by_id(collections::CATEGORIES, id).await? {
            Some(doc) => decode_category(doc),
            None => Err(ActionError::not_found(format!("no category with id {id}"))),
        }
    }

    /// Create a category. Admin only.
    #[instrument(skip(self, token, draft), err)]
    pub async fn create(
        &self,
        token: Option<&str>,
        draft: CategoryDraft,
    ) -> Result<Category, ActionError> {
        let admin = self.require_admin(token).await?;

        let category = Category::from_draft(draft)?;
        self.ensure_unique(&category, None).await?;

        let doc = encode_category(&category)?;
        let stored = self.repo.create(collections::CATEGORIES, doc).await?;
        let category = decode_category(stored)?;

        info!(category_id = %category.id, slug = %category.slug, admin = %admin.id, "category created");
        Ok(category)
    }

    /// Apply a partial update. Admin only.
    #[instrument(skip(self, token, patch), err)]
    pub async fn update(
        &self,
        token: Option<&str>,
        id: &str,
        patch: CategoryPatch,
    ) -> Result<Category, ActionError> {
        self.require_admin(token).await?;

        let mut category = self.get_one(id).await?;
        category.apply_patch(patch)?;
        self.ensure_unique(&category, Some(id)).await?;

        let doc = encode_category(&category)?;
        let stored = self.repo.update(collections::CATEGORIES, id, doc).await?;
        let category = decode_category(stored)?;

        info!(category_id = %category.id, slug = %category.slug, "category updated");
        Ok(category)
    }

    /// Delete a category. Admin only. Returns the deleted category.
    #[instrument(skip(self, token), err)]
    pub async fn delete(&self, token: Option<&str>, id: &str) -> Result<Category, ActionError> {
        self.require_admin(token).await?;

        let category = self.get_one(id).await?;
        self.repo.delete(collections::CATEGORIES, id).await?;

        info!(category_id = %id, "category deleted");
        Ok(category)
    }

    /// Reject names and slugs already used by a different category.
    async fn ensure_unique(
        &self,
        category: &Category,
        exclude: Option<&str>,
    ) -> Result<(), ActionError> {
        let conflicts = |docs: &[JsonValue]| {
            docs.iter()
                .any(|doc| doc.get("id").and_then(JsonValue::as_str) != exclude)
        };

        let same_name = self
            .repo
            .find(
                collections::CATEGORIES,
                &Filter::field("name", category.name.clone()),
                0,
            )
            .await?;
        if conflicts(&same_name) {
            return Err(ActionError::validation(format!(
                "category name already in use: {}",
                category.name
            )));
        }

        let same_slug = self
            .repo
            .find(
                collections::CATEGORIES,
                &Filter::field("slug", category.slug.clone()),
                0,
            )
            .await?;
        if conflicts(&same_slug) {
            return Err(ActionError::validation(format!(
                "category slug already in use: {}",
                category.slug
            )));
        }

        Ok(())
    }
}

fn encode_category(category: &Category) -> Result<JsonValue, ActionError> {
    serde_json::to_value(category)
        .map_err(|e| ActionError::repository(format!("failed to encode category: {e}")))
}

fn decode_category(doc: JsonValue) -> Result<Category, ActionError> {
    serde_json::from_value(doc)
        .map_err(|e| ActionError::repository(format!("stored category is malformed: {e}")))
}

fn decode_categories(docs: Vec<JsonValue>) -> Result<Vec<Category>, ActionError> {
    docs.into_iter().map(decode_category).collect()
}

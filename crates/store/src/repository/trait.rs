use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Document repository operation error.
///
/// These are **infrastructure errors** (missing rows, broken backends) as
/// opposed to domain errors (validation, authorization); the action layer
/// translates them at its boundary.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No document with this id in the collection.
    #[error("not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// A document with this id already exists in the collection.
    #[error("duplicate id: {collection}/{id}")]
    Duplicate { collection: String, id: String },

    /// The document or patch is not usable (not an object, missing `id`,
    /// or an attempt to rewrite `id`).
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// The backing store failed.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Conjunction of field equality constraints.
///
/// Paths are dotted (`"seller"`, `"meta.author"`) and walk nested objects.
/// The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, JsonValue)>,
}

impl Filter {
    /// Match every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match documents whose `path` equals `value`.
    pub fn field(path: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::all().and(path, value)
    }

    /// Add another equality clause (conjunction).
    pub fn and(mut self, path: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.clauses.push((path.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[(String, JsonValue)] {
        &self.clauses
    }

    /// Evaluate the filter against a document.
    pub fn matches(&self, document: &JsonValue) -> bool {
        self.clauses
            .iter()
            .all(|(path, expected)| lookup(document, path) == Some(expected))
    }
}

fn lookup<'a>(document: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let mut current = document;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Named-collection document store.
///
/// ## Documents
///
/// A document is a JSON object carrying a string `id` field; the repository
/// is otherwise schema-agnostic. `create` rejects anything else as
/// `InvalidDocument`.
///
/// ## Read Semantics
///
/// `find` returns matches in insertion order. `limit: 0` means unbounded
/// (every match). `find_by_id` returns `Ok(None)` on a miss: absence is an
/// answer, not an error.
///
/// ## Write Semantics
///
/// `update` performs a shallow merge: top-level fields of `patch` replace
/// the stored fields wholesale, nested objects are not merged recursively,
/// and a document keeps its insertion position. `update` and `delete` fail
/// with `NotFound` on a missing id.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<JsonValue>, RepositoryError>;

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<JsonValue>, RepositoryError>;

    async fn create(
        &self,
        collection: &str,
        document: JsonValue,
    ) -> Result<JsonValue, RepositoryError>;

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: JsonValue,
    ) -> Result<JsonValue, RepositoryError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RepositoryError>;
}

#[async_trait]
impl<R> Repository for Arc<R>
where
    R: Repository + ?Sized,
{
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<JsonValue>, RepositoryError> {
        (**self).find(collection, filter, limit).await
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<JsonValue>, RepositoryError> {
        (**self).find_by_id(collection, id).await
    }

    async fn create(
        &self,
        collection: &str,
        document: JsonValue,
    ) -> Result<JsonValue, RepositoryError> {
        (**self).create(collection, document).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: JsonValue,
    ) -> Result<JsonValue, RepositoryError> {
        (**self).update(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RepositoryError> {
        (**self).delete(collection, id).await
    }
}

/// Extract the required string `id` from a document.
pub(crate) fn document_id(document: &JsonValue) -> Result<String, RepositoryError> {
    document
        .get("id")
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            RepositoryError::InvalidDocument("document must carry a string `id`".to_string())
        })
}

/// Validate a patch against the target id: must be a JSON object, and it may
/// not rewrite `id`.
pub(crate) fn check_patch(patch: &JsonValue, id: &str) -> Result<(), RepositoryError> {
    if !patch.is_object() {
        return Err(RepositoryError::InvalidDocument(
            "patch must be a JSON object".to_string(),
        ));
    }
    if let Some(patched) = patch.get("id") {
        if patched.as_str() != Some(id) {
            return Err(RepositoryError::InvalidDocument(
                "patch may not rewrite `id`".to_string(),
            ));
        }
    }
    Ok(())
}

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::r#trait::{check_patch, document_id, Filter, Repository, RepositoryError};

/// In-memory document store.
///
/// Intended for tests/dev. Documents are kept per collection in insertion
/// order; lookups are linear scans.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    collections: RwLock<HashMap<String, Vec<JsonValue>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Backend("lock poisoned".to_string())
}

fn not_found(collection: &str, id: &str) -> RepositoryError {
    RepositoryError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

fn position(docs: &[JsonValue], id: &str) -> Option<usize> {
    docs.iter()
        .position(|d| d.get("id").and_then(JsonValue::as_str) == Some(id))
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<JsonValue>, RepositoryError> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        let docs = collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut out = Vec::new();
        for doc in docs {
            if filter.matches(doc) {
                out.push(doc.clone());
                if limit != 0 && out.len() == limit {
                    break;
                }
            }
        }
        Ok(out)
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<JsonValue>, RepositoryError> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        let docs = collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(position(docs, id).map(|idx| docs[idx].clone()))
    }

    async fn create(
        &self,
        collection: &str,
        document: JsonValue,
    ) -> Result<JsonValue, RepositoryError> {
        let id = document_id(&document)?;

        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let docs = collections.entry(collection.to_string()).or_default();

        if position(docs, &id).is_some() {
            return Err(RepositoryError::Duplicate {
                collection: collection.to_string(),
                id,
            });
        }

        docs.push(document.clone());
        Ok(document)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: JsonValue,
    ) -> Result<JsonValue, RepositoryError> {
        check_patch(&patch, id)?;

        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection, id))?;
        let idx = position(docs, id).ok_or_else(|| not_found(collection, id))?;

        // Shallow merge; the document keeps its position.
        let doc = &mut docs[idx];
        if let (Some(target), Some(fields)) = (doc.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        Ok(doc.clone())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RepositoryError> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection, id))?;
        let idx = position(docs, id).ok_or_else(|| not_found(collection, id))?;
        docs.remove(idx);
        Ok(())
    }
}

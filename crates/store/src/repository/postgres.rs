//! Postgres-backed document repository.
//!
//! Every collection shares a single `documents` table; the document body
//! lives in a JSONB column and filter clauses are evaluated with the `#>`
//! path operator. Insertion order is preserved by a `BIGSERIAL` column.
//!
//! ## Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS documents (
//!     ord        BIGSERIAL,
//!     collection TEXT        NOT NULL,
//!     id         TEXT        NOT NULL,
//!     doc        JSONB       NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     PRIMARY KEY (collection, id)
//! );
//! ```
//!
//! ## Error Mapping
//!
//! | Failure | `RepositoryError` |
//! |---------|-------------------|
//! | Insert hits an existing `(collection, id)` (code `23505`) | `Duplicate` |
//! | Update/delete misses the row | `NotFound` |
//! | Anything else (constraint, pool closed, network) | `Backend` |
//!
//! ## Thread Safety
//!
//! `PostgresRepository` is `Send + Sync` and can be shared across threads.
//! All operations go through the SQLx connection pool.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Row};
use tracing::instrument;

use super::r#trait::{check_patch, document_id, Filter, Repository, RepositoryError};

/// Postgres-backed document repository.
///
/// Updates apply the patch with the JSONB `||` operator, which merges at the
/// top level only, so write semantics match [`super::InMemoryRepository`].
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: Arc<PgPool>,
}

impl PostgresRepository {
    /// Create a new PostgresRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `documents` table and its ordering index if they are missing.
    ///
    /// Safe to call on every startup.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                ord        BIGSERIAL,
                collection TEXT        NOT NULL,
                id         TEXT        NOT NULL,
                doc        JSONB       NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (collection, id)
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_table", e))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS documents_collection_ord_idx ON documents (collection, ord)",
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_index", e))?;

        Ok(())
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    #[instrument(
        skip(self, filter),
        fields(clause_count = filter.clauses().len()),
        err
    )]
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<JsonValue>, RepositoryError> {
        // The clause list is caller-built, so the SQL shape is dynamic but
        // every path and value still goes through a bind parameter.
        let mut sql = String::from("SELECT doc FROM documents WHERE collection = $1");
        let mut next_param = 2;
        for _ in filter.clauses() {
            sql.push_str(&format!(
                " AND doc #> ${}::text[] = ${}::jsonb",
                next_param,
                next_param + 1
            ));
            next_param += 2;
        }
        sql.push_str(" ORDER BY ord ASC");
        if limit > 0 {
            sql.push_str(&format!(" LIMIT ${next_param}"));
        }

        let mut query = sqlx::query(&sql).bind(collection);
        for (path, value) in filter.clauses() {
            let segments: Vec<String> = path.split('.').map(str::to_string).collect();
            query = query.bind(segments).bind(value.clone());
        }
        if limit > 0 {
            query = query.bind(limit as i64);
        }

        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find", e))?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            documents.push(doc_column(&row)?);
        }
        Ok(documents)
    }

    #[instrument(skip(self), err)]
    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<JsonValue>, RepositoryError> {
        let row = sqlx::query("SELECT doc FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.as_ref().map(doc_column).transpose()
    }

    #[instrument(skip(self, document), err)]
    async fn create(
        &self,
        collection: &str,
        document: JsonValue,
    ) -> Result<JsonValue, RepositoryError> {
        let id = document_id(&document)?;

        let row = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, doc)
            VALUES ($1, $2, $3)
            RETURNING doc
            "#,
        )
        .bind(collection)
        .bind(&id)
        .bind(&document)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::Duplicate {
                    collection: collection.to_string(),
                    id: id.clone(),
                }
            } else {
                map_sqlx_error("create", e)
            }
        })?;

        doc_column(&row)
    }

    #[instrument(skip(self, patch), err)]
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: JsonValue,
    ) -> Result<JsonValue, RepositoryError> {
        check_patch(&patch, id)?;

        let row = sqlx::query(
            r#"
            UPDATE documents
            SET doc = doc || $3
            WHERE collection = $1 AND id = $2
            RETURNING doc
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(&patch)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        match row {
            Some(row) => doc_column(&row),
            None => Err(RepositoryError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            }),
        }
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, collection: &str, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

/// Read the `doc` column out of a fetched row.
fn doc_column(row: &sqlx::postgres::PgRow) -> Result<JsonValue, RepositoryError> {
    row.try_get("doc")
        .map_err(|e| RepositoryError::Backend(format!("failed to read doc column: {}", e)))
}

/// Map SQLx errors to RepositoryError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => RepositoryError::Backend(format!(
            "database error in {}: {}",
            operation,
            db_err.message()
        )),
        sqlx::Error::PoolClosed => {
            RepositoryError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => RepositoryError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

/// Unique-constraint violations get their own variant so callers can answer
/// "already exists" instead of a generic backend failure.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code == "23505"),
        _ => false,
    }
}

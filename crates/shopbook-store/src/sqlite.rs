//! # SQLite Document Operations
//!
//! [`DocumentStore`] implementation over a single generic `documents`
//! table.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  documents                                                              │
//! │  ┌────────────────────┬──────────┬──────────┬─────────────────────┐    │
//! │  │ collection         │ id       │ owner_id │ body (JSON)         │    │
//! │  ├────────────────────┼──────────┼──────────┼─────────────────────┤    │
//! │  │ products           │ uuid-a   │ owner-1  │ {"name":"Rice",...} │    │
//! │  │ transactions       │ uuid-b   │ owner-1  │ {"qty":3,...}       │    │
//! │  │ credits            │ uuid-c   │ owner-1  │ {"balance":...}     │    │
//! │  │ creditTransactions │ uuid-d   │ owner-1  │ {"creditId":...}    │    │
//! │  └────────────────────┴──────────┴──────────┴─────────────────────┘    │
//! │                                                                         │
//! │  update      → json_patch(body, ?)   (RFC 7396 merge semantics)        │
//! │  field query → json_extract(body, '$.field') = ?                       │
//! │  apply       → BEGIN; op; op; ...; COMMIT                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries use the runtime sqlx API: the body column is schemaless
//! JSON, so there is no static row shape for compile-time checking.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use crate::documents::{Document, DocumentStore, WriteBatch, WriteOp};
use crate::error::{StoreError, StoreResult};
use crate::pool::Store;

/// Decodes one `documents` row into a [`Document`].
fn decode_row(collection: &str, row: &SqliteRow) -> StoreResult<Document> {
    let id: String = row.try_get("id")?;
    let owner_id: String = row.try_get("owner_id")?;
    let raw: String = row.try_get("body")?;

    let body: Value = serde_json::from_str(&raw)
        .map_err(|e| StoreError::corrupt(collection, format!("{}: {}", id, e)))?;

    Ok(Document { id, owner_id, body })
}

/// Binds a JSON scalar as the comparison value for a field query.
///
/// json_extract yields SQLite TEXT/INTEGER/REAL for JSON strings,
/// booleans and numbers, so each scalar kind binds as its SQL
/// counterpart.
fn bind_scalar<'q>(
    query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    value: &'q Value,
) -> StoreResult<sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>> {
    match value {
        Value::String(s) => Ok(query.bind(s.as_str())),
        Value::Number(n) if n.is_i64() => Ok(query.bind(n.as_i64().unwrap_or_default())),
        Value::Number(n) => Ok(query.bind(n.as_f64().unwrap_or_default())),
        Value::Bool(b) => Ok(query.bind(*b)),
        other => Err(StoreError::QueryFailed(format!(
            "unsupported field filter value: {}",
            other
        ))),
    }
}

#[async_trait]
impl DocumentStore for Store {
    async fn append(&self, collection: &str, owner_id: &str, body: &Value) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let raw = body.to_string();

        debug!(collection = %collection, id = %id, "Appending document");

        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, owner_id, body, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(collection)
        .bind(&id)
        .bind(owner_id)
        .bind(&raw)
        .bind(&now)
        .bind(&now)
        .execute(self.pool())
        .await?;

        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, body FROM documents
            WHERE collection = ?1 AND id = ?2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(|r| decode_row(collection, r)).transpose()
    }

    async fn update(&self, collection: &str, id: &str, patch: &Value) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        let raw = patch.to_string();

        debug!(collection = %collection, id = %id, "Patching document");

        let result = sqlx::query(
            r#"
            UPDATE documents
            SET body = json_patch(body, ?3), updated_at = ?4
            WHERE collection = ?1 AND id = ?2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(&raw)
        .bind(&now)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(collection, id));
        }

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        debug!(collection = %collection, id = %id, "Deleting document");

        let result = sqlx::query(
            r#"
            DELETE FROM documents WHERE collection = ?1 AND id = ?2
            "#,
        )
        .bind(collection)
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(collection, id));
        }

        Ok(())
    }

    async fn query_by_owner(&self, collection: &str, owner_id: &str) -> StoreResult<Vec<Document>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, body FROM documents
            WHERE collection = ?1 AND owner_id = ?2
            "#,
        )
        .bind(collection)
        .bind(owner_id)
        .fetch_all(self.pool())
        .await?;

        debug!(collection = %collection, count = rows.len(), "Owner query");

        rows.iter().map(|r| decode_row(collection, r)).collect()
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        owner_id: &str,
    ) -> StoreResult<Vec<Document>> {
        let path = format!("$.{}", field);

        let query = sqlx::query(
            r#"
            SELECT id, owner_id, body FROM documents
            WHERE collection = ?1 AND owner_id = ?2
              AND json_extract(body, ?3) = ?4
            "#,
        )
        .bind(collection)
        .bind(owner_id)
        .bind(path);

        let rows = bind_scalar(query, value)?.fetch_all(self.pool()).await?;

        debug!(collection = %collection, field = %field, count = rows.len(), "Field query");

        rows.iter().map(|r| decode_row(collection, r)).collect()
    }

    async fn apply(&self, batch: WriteBatch) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        let ops = batch.into_ops();

        debug!(ops = ops.len(), "Applying write batch");

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        for op in &ops {
            match op {
                WriteOp::Insert {
                    collection,
                    id,
                    owner_id,
                    body,
                } => {
                    sqlx::query(
                        r#"
                        INSERT INTO documents (collection, id, owner_id, body, created_at, updated_at)
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                        "#,
                    )
                    .bind(collection)
                    .bind(id)
                    .bind(owner_id)
                    .bind(body.to_string())
                    .bind(&now)
                    .bind(&now)
                    .execute(&mut *tx)
                    .await?;
                }

                WriteOp::Patch {
                    collection,
                    id,
                    patch,
                } => {
                    let result = sqlx::query(
                        r#"
                        UPDATE documents
                        SET body = json_patch(body, ?3), updated_at = ?4
                        WHERE collection = ?1 AND id = ?2
                        "#,
                    )
                    .bind(collection)
                    .bind(id)
                    .bind(patch.to_string())
                    .bind(&now)
                    .execute(&mut *tx)
                    .await?;

                    // Dropping tx on the error path rolls the batch back
                    if result.rows_affected() == 0 {
                        return Err(StoreError::not_found(collection.as_str(), id.as_str()));
                    }
                }

                WriteOp::Delete { collection, id } => {
                    let result = sqlx::query(
                        r#"
                        DELETE FROM documents WHERE collection = ?1 AND id = ?2
                        "#,
                    )
                    .bind(collection)
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;

                    if result.rows_affected() == 0 {
                        return Err(StoreError::not_found(collection.as_str(), id.as_str()));
                    }
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        Ok(())
    }
}

impl Store {
    /// Counts an owner's documents in a collection (for diagnostics and
    /// seed-time checks).
    pub async fn count(&self, collection: &str, owner_id: &str) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM documents
            WHERE collection = ?1 AND owner_id = ?2
            "#,
        )
        .bind(collection)
        .bind(owner_id)
        .fetch_one(self.pool())
        .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::StoreConfig;
    use serde_json::json;

    async fn store() -> Store {
        Store::new(StoreConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_append_and_get_round_trip() {
        let store = store().await;

        let body = json!({"name": "Bag of Rice 5kg", "qty": 10});
        let id = store.append("products", "owner-1", &body).await.unwrap();

        let doc = store.get("products", &id).await.unwrap().unwrap();
        assert_eq!(doc.id, id);
        assert_eq!(doc.owner_id, "owner-1");
        assert_eq!(doc.body, body);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = store().await;
        assert!(store.get("products", "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = store().await;

        let id = store
            .append("products", "owner-1", &json!({"name": "Rice", "qty": 10}))
            .await
            .unwrap();

        store
            .update("products", &id, &json!({"qty": 7}))
            .await
            .unwrap();

        let doc = store.get("products", &id).await.unwrap().unwrap();
        assert_eq!(doc.body["qty"], 7);
        // untouched fields survive the patch
        assert_eq!(doc.body["name"], "Rice");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = store().await;
        let err = store
            .update("products", "nope", &json!({"qty": 1}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = store().await;

        let id = store
            .append("products", "owner-1", &json!({"name": "Rice"}))
            .await
            .unwrap();

        store.delete("products", &id).await.unwrap();
        assert!(store.get("products", &id).await.unwrap().is_none());

        let err = store.delete("products", &id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_query_scoped_to_owner() {
        let store = store().await;

        store
            .append("products", "owner-1", &json!({"name": "Rice"}))
            .await
            .unwrap();
        store
            .append("products", "owner-2", &json!({"name": "Beans"}))
            .await
            .unwrap();

        let mine = store.query_by_owner("products", "owner-1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].body["name"], "Rice");
    }

    #[tokio::test]
    async fn test_query_by_field() {
        let store = store().await;

        store
            .append(
                "creditTransactions",
                "owner-1",
                &json!({"creditId": "c1", "amount": 100}),
            )
            .await
            .unwrap();
        store
            .append(
                "creditTransactions",
                "owner-1",
                &json!({"creditId": "c2", "amount": 200}),
            )
            .await
            .unwrap();

        let entries = store
            .query_by_field("creditTransactions", "creditId", &json!("c1"), "owner-1")
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].body["amount"], 100);
    }

    #[tokio::test]
    async fn test_batch_commits_all_ops() {
        let store = store().await;

        let product_id = store
            .append("products", "owner-1", &json!({"name": "Rice", "qty": 10}))
            .await
            .unwrap();

        let batch = WriteBatch::new()
            .insert(
                "transactions",
                "tx-1",
                "owner-1",
                json!({"productId": product_id, "qty": 3}),
            )
            .patch("products", &product_id, json!({"qty": 7}));

        store.apply(batch).await.unwrap();

        let product = store.get("products", &product_id).await.unwrap().unwrap();
        assert_eq!(product.body["qty"], 7);
        assert!(store.get("transactions", "tx-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_batch_rolls_back_on_failure() {
        let store = store().await;

        // Second op patches a document that doesn't exist, so the
        // insert before it must not survive either.
        let batch = WriteBatch::new()
            .insert("transactions", "tx-1", "owner-1", json!({"qty": 3}))
            .patch("products", "missing", json!({"qty": 7}));

        let err = store.apply(batch).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        assert!(store.get("transactions", "tx-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_count() {
        let store = store().await;

        assert_eq!(store.count("products", "owner-1").await.unwrap(), 0);
        store
            .append("products", "owner-1", &json!({"name": "Rice"}))
            .await
            .unwrap();
        assert_eq!(store.count("products", "owner-1").await.unwrap(), 1);
    }
}

//! # Document Store Boundary
//!
//! The abstract persistence collaborator the rest of the system talks
//! to. Records are JSON documents grouped into named collections and
//! scoped to one owning identity.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     DocumentStore Contract                              │
//! │                                                                         │
//! │  append ──► new document, id returned, never mutates existing rows     │
//! │  get    ──► one document by id                                         │
//! │  update ──► RFC 7396-style merge patch into an existing body           │
//! │  delete ──► removes one document                                       │
//! │  query_by_owner ──► all documents an identity owns in a collection     │
//! │  query_by_field ──► owner's documents where body.field == value        │
//! │  apply  ──► several of the above as ONE atomic commit                  │
//! │                                                                         │
//! │  Durability before acknowledgment: a returned Ok means the write      │
//! │  is committed. Result ordering is unspecified - presentation           │
//! │  ordering belongs to the caller.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is deliberately dumb: it enforces no business invariants.
//! Keeping a stock count or a credit balance consistent with its
//! history is the reconciliation engine's job, built on `apply`.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreResult;

// =============================================================================
// Document
// =============================================================================

/// One stored record: a JSON body plus its addressing metadata.
#[derive(Debug, Clone)]
pub struct Document {
    /// Document id (UUID v4).
    pub id: String,

    /// Owning identity.
    pub owner_id: String,

    /// The record itself.
    pub body: Value,
}

// =============================================================================
// Write Batches
// =============================================================================

/// A single mutation inside a write batch.
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Insert a new document with a caller-chosen id.
    ///
    /// Ids are generated before the commit (UUID v4) so operations that
    /// insert several related records can cross-reference them.
    Insert {
        collection: String,
        id: String,
        owner_id: String,
        body: Value,
    },

    /// Merge-patch an existing document's body.
    Patch {
        collection: String,
        id: String,
        patch: Value,
    },

    /// Delete a document.
    Delete { collection: String, id: String },
}

/// An ordered list of mutations committed atomically.
///
/// This is what keeps a ledger append and its derived-balance update
/// from ever being observed half-applied: either every op in the batch
/// commits, or none do.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        WriteBatch { ops: Vec::new() }
    }

    /// Queues an insert.
    pub fn insert(
        mut self,
        collection: &str,
        id: &str,
        owner_id: &str,
        body: Value,
    ) -> Self {
        self.ops.push(WriteOp::Insert {
            collection: collection.to_string(),
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            body,
        });
        self
    }

    /// Queues a merge patch.
    pub fn patch(mut self, collection: &str, id: &str, patch: Value) -> Self {
        self.ops.push(WriteOp::Patch {
            collection: collection.to_string(),
            id: id.to_string(),
            patch,
        });
        self
    }

    /// Queues a delete.
    pub fn delete(mut self, collection: &str, id: &str) -> Self {
        self.ops.push(WriteOp::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        self
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Consumes the batch into its operations.
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

// =============================================================================
// DocumentStore Trait
// =============================================================================

/// The persistence capability the engine is built on.
///
/// Implementations must be safe to share across tasks (`Send + Sync`);
/// the SQLite implementation achieves this through its connection pool.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Appends a new document and returns its generated id.
    async fn append(&self, collection: &str, owner_id: &str, body: &Value) -> StoreResult<String>;

    /// Fetches one document by id.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Merge-patches an existing document's body.
    ///
    /// Fails with `NotFound` if the document does not exist.
    async fn update(&self, collection: &str, id: &str, patch: &Value) -> StoreResult<()>;

    /// Deletes a document.
    ///
    /// Fails with `NotFound` if the document does not exist.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Lists all documents an identity owns in a collection.
    /// Ordering is unspecified.
    async fn query_by_owner(&self, collection: &str, owner_id: &str) -> StoreResult<Vec<Document>>;

    /// Lists an identity's documents whose body field equals `value`.
    ///
    /// `field` is a top-level body key (e.g. `creditId`).
    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        owner_id: &str,
    ) -> StoreResult<Vec<Document>>;

    /// Commits a write batch atomically: all ops succeed or none apply.
    async fn apply(&self, batch: WriteBatch) -> StoreResult<()>;
}

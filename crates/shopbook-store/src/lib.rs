//! # shopbook-store: Document Store Layer for ShopBook
//!
//! This crate provides persistence for the ShopBook system: a generic
//! JSON document store over SQLite, plus the identity capability that
//! scopes every read and write to one owner.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ShopBook Data Flow                               │
//! │                                                                         │
//! │  Session engine (sell, grant_credit, ...)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   shopbook-store (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │     Store     │    │ DocumentStore │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (documents +  │    │  (embedded)  │  │   │
//! │  │   │               │    │  sqlite impl) │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CRUD, owner   │    │ 001_docs.sql │  │   │
//! │  │   │ WAL, config   │    │ queries,      │    │              │  │   │
//! │  │   │               │    │ write batches │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or :memory: for tests)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`documents`] - The `DocumentStore` trait, `Document`, `WriteBatch`
//! - [`sqlite`] - SQLite implementation of the trait
//! - [`collections`] - Collection name constants
//! - [`identity`] - The opaque current-identity capability
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopbook_store::{Store, StoreConfig, DocumentStore, WriteBatch};
//!
//! let store = Store::new(StoreConfig::new("shopbook.db")).await?;
//!
//! let id = store.append("products", "owner-1", &body).await?;
//!
//! // Atomic multi-record mutation
//! store.apply(
//!     WriteBatch::new()
//!         .insert("transactions", &tx_id, "owner-1", tx_body)
//!         .patch("products", &id, json!({"qty": 7})),
//! ).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod collections;
pub mod documents;
pub mod error;
pub mod identity;
pub mod migrations;
pub mod pool;
pub mod sqlite;

// =============================================================================
// Re-exports
// =============================================================================

pub use documents::{Document, DocumentStore, WriteBatch, WriteOp};
pub use error::{StoreError, StoreResult};
pub use identity::{IdentityProvider, SignedOut, StaticIdentity};
pub use pool::{Store, StoreConfig};

//! # shopbook-session: Session Cache + Reconciliation Engine
//!
//! The per-login orchestration layer of ShopBook. One [`Session`] is
//! created per signed-in identity; it caches the shop's collections in
//! memory and is the only component allowed to mutate them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     shopbook-session (THIS CRATE)                       │
//! │                                                                         │
//! │   UI shell intents ("sell 3", "record payment of 500")                 │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌──────────────────────────┐     ┌──────────────────────────┐        │
//! │   │  Reconciliation engine   │────►│     SessionCache         │        │
//! │   │  (ops/inventory,         │     │  products, history,      │        │
//! │   │   ops/credit)            │     │  credit book, ledgers    │        │
//! │   │                          │     └──────────┬───────────────┘        │
//! │   │  validate → rule check   │                │ reads                  │
//! │   │  → ONE write batch       │                ▼                        │
//! │   │  → cache update          │     dashboard / reports                 │
//! │   └──────────┬───────────────┘     (shopbook-core::aggregate)          │
//! │              │                                                          │
//! │              ▼                                                          │
//! │   shopbook-store (atomic batches, owner-scoped queries)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What "Reconciliation" Means Here
//! `Product.qty` and `CreditCustomer.balance` are running totals cached
//! over append-only histories. Every operation that moves one of them
//! writes the history row and the new total in the same commit, and
//! [`Session::repair_balances`] can rebuild any balance from its
//! history when devices race.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cache;
pub mod error;
pub mod ops;
mod records;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use cache::SessionCache;
pub use error::{SessionError, SessionResult};
pub use session::Session;

// =============================================================================
// Test Fixtures
// =============================================================================

//! # Domain Types
//!
//! Core domain types used throughout ShopBook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────┐   ┌───────────────────┐    │
//! │  │    Product      │   │ SaleTransaction  │   │  CreditCustomer   │    │
//! │  │  ─────────────  │   │  ──────────────  │   │  ───────────────  │    │
//! │  │  id (UUID)      │   │  id (UUID)       │   │  id (UUID)        │    │
//! │  │  name           │   │  product_id (FK) │   │  customer_name    │    │
//! │  │  cost / price   │   │  name + cost     │   │  phone            │    │
//! │  │  qty (stock)    │   │    snapshots     │   │  balance (cached) │    │
//! │  └─────────────────┘   └──────────────────┘   └─────────┬─────────┘    │
//! │                                                         │              │
//! │                                              ┌──────────┴──────────┐   │
//! │                                              │ CreditLedgerEntry   │   │
//! │                                              │ ─────────────────── │   │
//! │                                              │ credit_id (FK)      │   │
//! │                                              │ kind: Credit/Payment│   │
//! │                                              │ amount, date        │   │
//! │                                              └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Derived Running Totals
//! `Product.qty` and `CreditCustomer.balance` are materialized views over
//! append-only histories (sale transactions, ledger entries). They are
//! mutated only by the reconciliation engine, never by readers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the shop's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in the catalog and on history rows.
    pub name: String,

    /// Unit cost (what the shop paid).
    pub cost: Money,

    /// Unit selling price. Zero means "ask at the counter" - the price
    /// is typed in at sale time.
    pub price: Money,

    /// Current stock on hand. Never negative; mutated only through
    /// sales, sale edits, and direct inventory edits.
    pub qty: i64,

    /// Owning identity.
    pub owner_id: String,

    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Checks whether `requested` units can be sold from current stock.
    #[inline]
    pub fn in_stock(&self, requested: i64) -> bool {
        requested <= self.qty
    }

    /// Sell-value of the remaining stock (price × qty).
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.price.multiply_quantity(self.qty)
    }

    /// Cost-value of the remaining stock (cost × qty).
    #[inline]
    pub fn stock_cost_value(&self) -> Money {
        self.cost.multiply_quantity(self.qty)
    }
}

// =============================================================================
// Sale Transaction
// =============================================================================

/// A recorded sale.
///
/// Uses the snapshot pattern: `product_name` and `cost` are frozen copies
/// of the product at sale time, so later catalog edits (or deleting the
/// product outright) never rewrite history or profit figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTransaction {
    pub id: String,

    /// The product sold. May dangle after a product is deleted; the
    /// snapshots below keep the row meaningful.
    pub product_id: String,

    /// Product name at time of sale (frozen).
    pub product_name: String,

    /// Unit price actually charged.
    pub price: Money,

    /// Unit cost at time of sale (frozen).
    pub cost: Money,

    /// Units sold. Always positive; edits adjust it in place with a
    /// compensating stock adjustment.
    pub qty: i64,

    pub date: DateTime<Utc>,
    pub owner_id: String,
}

impl SaleTransaction {
    /// Revenue for this sale (price × qty).
    #[inline]
    pub fn revenue(&self) -> Money {
        self.price.multiply_quantity(self.qty)
    }

    /// Profit for this sale ((price − cost) × qty), using the cost
    /// snapshot taken when the sale happened.
    #[inline]
    pub fn profit(&self) -> Money {
        (self.price - self.cost).multiply_quantity(self.qty)
    }
}

// =============================================================================
// Credit Ledger
// =============================================================================

/// The two directions a ledger entry can move a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Goods taken on credit; raises the outstanding balance.
    Credit,
    /// Money received; lowers the outstanding balance.
    Payment,
}

/// A customer in the credit book.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCustomer {
    pub id: String,
    pub customer_name: String,
    pub phone: String,

    /// Outstanding balance. A cached fold of this customer's ledger:
    /// Σ credit amounts − Σ payment amounts. Kept consistent by the
    /// reconciliation engine; recomputable from scratch at any time.
    pub balance: Money,

    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

/// One immutable movement on a customer's balance.
///
/// Entries are append-only: they are never edited, and the only way one
/// is removed is the cascade when its customer is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditLedgerEntry {
    pub id: String,

    /// Parent customer id.
    pub credit_id: String,

    pub kind: EntryKind,

    /// Magnitude of the movement. Always positive; direction comes
    /// from `kind`.
    pub amount: Money,

    /// Free-text description ("2 bags of cement", "part payment").
    pub description: String,

    pub date: DateTime<Utc>,
    pub owner_id: String,
}

impl CreditLedgerEntry {
    /// The entry's effect on the balance: +amount for a credit,
    /// −amount for a payment.
    #[inline]
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            EntryKind::Credit => self.amount,
            EntryKind::Payment => Money::zero() - self.amount,
        }
    }
}

// =============================================================================
// User Profile
// =============================================================================

/// Display-only profile for the signed-in shop owner.
/// No business logic reads this; it exists for the header line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub full_name: String,
    pub shop_name: String,
    pub phone: String,
    pub email: String,
}

// =============================================================================
// Id Generation
// =============================================================================

/// Generates a new entity id (UUID v4).
///
/// Ids are generated client-side so a multi-record write batch knows
/// every id before it commits.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Inventory Operations
//!
//! Catalog CRUD, selling, and retroactive sale edits.
//!
//! ## The Two Stock Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How Stock Changes                                    │
//! │                                                                         │
//! │  sell(product, qty, price)                                             │
//! │    ├── reject if qty > product.qty          (InsufficientStock)        │
//! │    └── ONE batch: append transaction  +  qty -= soldQty                │
//! │                                                                         │
//! │  edit_sale(tx, newPrice, newQty)                                       │
//! │    ├── qtyDiff = newQty − oldQty                                       │
//! │    ├── reject if qtyDiff > product.qty      (InsufficientStock)        │
//! │    ├── product deleted? edit the transaction anyway, skip the          │
//! │    │   stock step (orphan-tolerant)                                    │
//! │    └── ONE batch: patch transaction  +  qty -= qtyDiff                 │
//! │                                                                         │
//! │  update_product(...)  direct stock edit (restock / correction)         │
//! │                                                                         │
//! │  Invariant: after any committed operation, product.qty equals the      │
//! │  qty implied by its sale history plus direct edits, and is never < 0.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};

use shopbook_core::validation::{
    validate_name, validate_price, validate_quantity, validate_stock,
};
use shopbook_core::{generate_id, CoreError, Money, Product, SaleTransaction};
use shopbook_store::collections::{PRODUCTS, TRANSACTIONS};
use shopbook_store::WriteBatch;

use crate::error::SessionResult;
use crate::records::to_body;
use crate::session::Session;

impl Session {
    /// Adds a product to the catalog.
    ///
    /// A zero `price` is allowed: it means the selling price gets typed
    /// in at the counter.
    pub async fn add_product(
        &mut self,
        name: &str,
        cost: Money,
        price: Money,
        qty: i64,
    ) -> SessionResult<Product> {
        let name = validate_name(name)?;
        validate_price(cost)?;
        validate_price(price)?;
        validate_stock(qty)?;

        let product = Product {
            id: generate_id(),
            name,
            cost,
            price,
            qty,
            owner_id: self.owner_id.clone(),
            created_at: Utc::now(),
        };

        let body = to_body(&product)?;
        self.store
            .apply(WriteBatch::new().insert(PRODUCTS, &product.id, &self.owner_id, body))
            .await?;

        self.cache.insert_product(product.clone());

        info!(id = %product.id, name = %product.name, qty = product.qty, "Product added");
        Ok(product)
    }

    /// Edits a product in place: rename, re-cost, or restock.
    ///
    /// A direct `qty` edit is the restock path; it is an absolute
    /// correction, not a delta.
    pub async fn update_product(
        &mut self,
        product_id: &str,
        name: &str,
        cost: Money,
        qty: i64,
    ) -> SessionResult<()> {
        let name = validate_name(name)?;
        validate_price(cost)?;
        validate_stock(qty)?;

        if self.cache.product(product_id).is_none() {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        }

        self.store
            .update(
                PRODUCTS,
                product_id,
                &json!({ "name": name, "cost": cost, "qty": qty }),
            )
            .await?;

        if let Some(p) = self.cache.product_mut(product_id) {
            p.name = name;
            p.cost = cost;
            p.qty = qty;
        }
        self.cache.resort_products();

        info!(id = %product_id, "Product updated");
        Ok(())
    }

    /// Removes a product from the catalog.
    ///
    /// Historical transactions that reference it become orphans on
    /// purpose: their name and cost snapshots keep history and profit
    /// figures meaningful, while inventory valuations simply stop
    /// counting the product.
    pub async fn delete_product(&mut self, product_id: &str) -> SessionResult<()> {
        if self.cache.product(product_id).is_none() {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        }

        self.store.delete(PRODUCTS, product_id).await?;
        self.cache.remove_product(product_id);

        info!(id = %product_id, "Product deleted (history rows left in place)");
        Ok(())
    }

    /// Sells `qty` units of a product at `unit_price`.
    ///
    /// Appends a transaction snapshotting the product's name and cost,
    /// and decrements stock - both in one commit, so the history and
    /// the stock count can never disagree.
    ///
    /// ## Errors
    /// - [`CoreError::InsufficientStock`] when `qty > product.qty`
    ///   (rejected, never clamped)
    pub async fn sell(
        &mut self,
        product_id: &str,
        qty: i64,
        unit_price: Money,
    ) -> SessionResult<SaleTransaction> {
        validate_quantity(qty)?;
        validate_price(unit_price)?;

        let product = self
            .cache
            .product(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?
            .clone();

        if !product.in_stock(qty) {
            return Err(CoreError::InsufficientStock {
                name: product.name,
                available: product.qty,
                requested: qty,
            }
            .into());
        }

        let transaction = SaleTransaction {
            id: generate_id(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            price: unit_price,
            cost: product.cost,
            qty,
            date: Utc::now(),
            owner_id: self.owner_id.clone(),
        };

        let body = to_body(&transaction)?;
        let batch = WriteBatch::new()
            .insert(TRANSACTIONS, &transaction.id, &self.owner_id, body)
            .patch(PRODUCTS, &product.id, json!({ "qty": product.qty - qty }));

        self.store.apply(batch).await?;

        if let Some(p) = self.cache.product_mut(&product.id) {
            p.qty -= qty;
        }
        self.cache.insert_transaction(transaction.clone());

        info!(
            product = %transaction.product_name,
            qty,
            revenue = %transaction.revenue(),
            "Sale recorded"
        );
        Ok(transaction)
    }

    /// Edits a recorded sale's price and quantity, adjusting stock by
    /// the quantity difference.
    ///
    /// ## Errors
    /// - [`CoreError::InsufficientStock`] when the *additional* units
    ///   (`newQty − oldQty`) exceed remaining stock. A downward edit
    ///   returns units to stock and always passes the check.
    ///
    /// ## Deleted Product
    /// If the product no longer exists, the transaction edit still
    /// applies and the stock step is skipped. Orphaned history stays
    /// editable; there is just no stock left to reconcile.
    pub async fn edit_sale(
        &mut self,
        transaction_id: &str,
        new_price: Money,
        new_qty: i64,
    ) -> SessionResult<()> {
        validate_quantity(new_qty)?;
        validate_price(new_price)?;

        let transaction = self
            .cache
            .transaction(transaction_id)
            .ok_or_else(|| CoreError::TransactionNotFound(transaction_id.to_string()))?
            .clone();

        let qty_diff = new_qty - transaction.qty;
        let product = self.cache.product(&transaction.product_id).cloned();

        if let Some(p) = &product {
            if qty_diff > p.qty {
                return Err(CoreError::InsufficientStock {
                    name: p.name.clone(),
                    // the most this sale could be edited up to
                    available: p.qty + transaction.qty,
                    requested: new_qty,
                }
                .into());
            }
        }

        let mut batch = WriteBatch::new().patch(
            TRANSACTIONS,
            transaction_id,
            json!({ "price": new_price, "qty": new_qty }),
        );

        match &product {
            Some(p) => {
                batch = batch.patch(PRODUCTS, &p.id, json!({ "qty": p.qty - qty_diff }));
            }
            None => {
                warn!(
                    transaction = %transaction_id,
                    product = %transaction.product_id,
                    "Product deleted; editing sale without stock adjustment"
                );
            }
        }

        self.store.apply(batch).await?;

        if let Some(t) = self.cache.transaction_mut(transaction_id) {
            t.price = new_price;
            t.qty = new_qty;
        }
        if let Some(p) = &product {
            if let Some(cached) = self.cache.product_mut(&p.id) {
                cached.qty = p.qty - qty_diff;
            }
        }

        debug!(transaction = %transaction_id, qty_diff, "Sale edited");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

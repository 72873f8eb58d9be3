//! # Session Cache
//!
//! The authoritative-for-the-session copies of the shop's collections.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cache Contract                                    │
//! │                                                                         │
//! │  Writers: ONLY the reconciliation engine, and only AFTER the store     │
//! │           has confirmed the corresponding write. Store and cache       │
//! │           move in the same logical step.                               │
//! │                                                                         │
//! │  Readers: aggregation and the UI. Always synchronous, never a          │
//! │           round-trip.                                                  │
//! │                                                                         │
//! │  Rebuild: wholesale on session open / reload. No incremental sync.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! The store returns rows unordered; presentation ordering lives here:
//! products and customers by name (case-insensitive), transactions and
//! ledger entries by date, newest first. Insertions maintain the order
//! so readers never observe an unsorted view.

use std::collections::HashMap;

use shopbook_core::{CreditCustomer, CreditLedgerEntry, Product, SaleTransaction};

/// In-memory collections for one session.
#[derive(Debug, Default)]
pub struct SessionCache {
    /// Catalog, sorted by name (case-insensitive).
    products: Vec<Product>,

    /// Sale history, sorted by date descending.
    transactions: Vec<SaleTransaction>,

    /// Credit book, sorted by customer name (case-insensitive).
    customers: Vec<CreditCustomer>,

    /// Per-customer ledgers, date descending. Loaded lazily the first
    /// time a customer's detail is viewed - absence from this map means
    /// "not fetched yet", not "no entries".
    ledgers: HashMap<String, Vec<CreditLedgerEntry>>,
}

fn name_key(s: &str) -> String {
    s.to_lowercase()
}

impl SessionCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        SessionCache::default()
    }

    /// True when nothing has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.transactions.is_empty() && self.customers.is_empty()
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Replaces the product list (sorted on the way in).
    pub fn set_products(&mut self, mut products: Vec<Product>) {
        products.sort_by_key(|p| name_key(&p.name));
        self.products = products;
    }

    /// The catalog, name order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Case-insensitive substring filter over product names.
    pub fn search_products(&self, filter: &str) -> Vec<&Product> {
        let needle = filter.to_lowercase();
        self.products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Looks up a product by id.
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Mutable product lookup (engine use only).
    pub(crate) fn product_mut(&mut self, id: &str) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    /// Inserts a product at its sorted position.
    pub(crate) fn insert_product(&mut self, product: Product) {
        let key = name_key(&product.name);
        let pos = self
            .products
            .partition_point(|p| name_key(&p.name) <= key);
        self.products.insert(pos, product);
    }

    /// Removes a product. Returns whether it was present.
    pub(crate) fn remove_product(&mut self, id: &str) -> bool {
        let before = self.products.len();
        self.products.retain(|p| p.id != id);
        self.products.len() != before
    }

    /// Restores name order after an in-place rename.
    pub(crate) fn resort_products(&mut self) {
        self.products.sort_by_key(|p| name_key(&p.name));
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Replaces the sale history (sorted on the way in).
    pub fn set_transactions(&mut self, mut transactions: Vec<SaleTransaction>) {
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        self.transactions = transactions;
    }

    /// Sale history, newest first.
    pub fn transactions(&self) -> &[SaleTransaction] {
        &self.transactions
    }

    /// Looks up a transaction by id.
    pub fn transaction(&self, id: &str) -> Option<&SaleTransaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Mutable transaction lookup (engine use only).
    pub(crate) fn transaction_mut(&mut self, id: &str) -> Option<&mut SaleTransaction> {
        self.transactions.iter_mut().find(|t| t.id == id)
    }

    /// Inserts a transaction at its date-sorted position.
    pub(crate) fn insert_transaction(&mut self, transaction: SaleTransaction) {
        let pos = self
            .transactions
            .partition_point(|t| t.date > transaction.date);
        self.transactions.insert(pos, transaction);
    }

    // =========================================================================
    // Credit customers
    // =========================================================================

    /// Replaces the customer list (sorted on the way in).
    pub fn set_customers(&mut self, mut customers: Vec<CreditCustomer>) {
        customers.sort_by_key(|c| name_key(&c.customer_name));
        self.customers = customers;
    }

    /// The credit book, name order.
    pub fn customers(&self) -> &[CreditCustomer] {
        &self.customers
    }

    /// Looks up a customer by id.
    pub fn customer(&self, id: &str) -> Option<&CreditCustomer> {
        self.customers.iter().find(|c| c.id == id)
    }

    /// Mutable customer lookup (engine use only).
    pub(crate) fn customer_mut(&mut self, id: &str) -> Option<&mut CreditCustomer> {
        self.customers.iter_mut().find(|c| c.id == id)
    }

    /// Inserts a customer at their sorted position.
    pub(crate) fn insert_customer(&mut self, customer: CreditCustomer) {
        let key = name_key(&customer.customer_name);
        let pos = self
            .customers
            .partition_point(|c| name_key(&c.customer_name) <= key);
        self.customers.insert(pos, customer);
    }

    /// Removes a customer and their cached ledger.
    pub(crate) fn remove_customer(&mut self, id: &str) -> bool {
        self.ledgers.remove(id);
        let before = self.customers.len();
        self.customers.retain(|c| c.id != id);
        self.customers.len() != before
    }

    // =========================================================================
    // Ledgers (lazy)
    // =========================================================================

    /// The cached ledger for a customer, if it has been fetched.
    pub fn ledger(&self, customer_id: &str) -> Option<&[CreditLedgerEntry]> {
        self.ledgers.get(customer_id).map(|v| v.as_slice())
    }

    /// Whether a customer's ledger has been fetched this session.
    pub fn ledger_loaded(&self, customer_id: &str) -> bool {
        self.ledgers.contains_key(customer_id)
    }

    /// Stores a fetched ledger (sorted on the way in).
    pub(crate) fn set_ledger(&mut self, customer_id: &str, mut entries: Vec<CreditLedgerEntry>) {
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        self.ledgers.insert(customer_id.to_string(), entries);
    }

    /// Prepends a new entry to a ledger IF it is already loaded.
    /// An unloaded ledger stays unloaded; the lazy fetch will pick the
    /// entry up from the store.
    pub(crate) fn push_ledger_entry(&mut self, entry: CreditLedgerEntry) {
        if let Some(entries) = self.ledgers.get_mut(&entry.credit_id) {
            let pos = entries.partition_point(|e| e.date > entry.date);
            entries.insert(pos, entry);
        }
    }

    /// Drops all fetched ledgers (on wholesale reload).
    pub(crate) fn clear_ledgers(&mut self) {
        self.ledgers.clear();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use shopbook_core::{generate_id, Money};

    fn product(name: &str) -> Product {
        Product {
            id: generate_id(),
            name: name.to_string(),
            cost: Money::zero(),
            price: Money::zero(),
            qty: 0,
            owner_id: "owner".to_string(),
            created_at: Utc::now(),
        }
    }

    fn tx(days_ago: i64) -> SaleTransaction {
        SaleTransaction {
            id: generate_id(),
            product_id: "p".to_string(),
            product_name: "P".to_string(),
            price: Money::zero(),
            cost: Money::zero(),
            qty: 1,
            date: Utc::now() - Duration::days(days_ago),
            owner_id: "owner".to_string(),
        }
    }

    #[test]
    fn test_products_sorted_case_insensitive() {
        let mut cache = SessionCache::new();
        cache.set_products(vec![product("zinc sheets"), product("Beans"), product("agege bread")]);

        let names: Vec<&str> = cache.products().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["agege bread", "Beans", "zinc sheets"]);
    }

    #[test]
    fn test_insert_product_keeps_order() {
        let mut cache = SessionCache::new();
        cache.set_products(vec![product("Beans"), product("Rice")]);
        cache.insert_product(product("Garri"));

        let names: Vec<&str> = cache.products().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Beans", "Garri", "Rice"]);
    }

    #[test]
    fn test_transactions_newest_first() {
        let mut cache = SessionCache::new();
        cache.set_transactions(vec![tx(5), tx(1), tx(3)]);

        let dates: Vec<_> = cache.transactions().iter().map(|t| t.date).collect();
        assert!(dates[0] > dates[1] && dates[1] > dates[2]);

        // insertion keeps the order
        cache.insert_transaction(tx(2));
        let dates: Vec<_> = cache.transactions().iter().map(|t| t.date).collect();
        assert!(dates.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_search_products() {
        let mut cache = SessionCache::new();
        cache.set_products(vec![
            product("Bag of Rice 5kg"),
            product("Rice Cooker"),
            product("Beans"),
        ]);

        assert_eq!(cache.search_products("rice").len(), 2);
        assert_eq!(cache.search_products("BEAN").len(), 1);
        assert_eq!(cache.search_products("").len(), 3);
        assert_eq!(cache.search_products("yam").len(), 0);
    }

    #[test]
    fn test_ledger_lazy_semantics() {
        let mut cache = SessionCache::new();
        assert!(!cache.ledger_loaded("c1"));
        assert!(cache.ledger("c1").is_none());

        cache.set_ledger("c1", vec![]);
        assert!(cache.ledger_loaded("c1"));
        assert_eq!(cache.ledger("c1").unwrap().len(), 0);

        // entries for unloaded ledgers are dropped, not half-cached
        let entry = CreditLedgerEntry {
            id: generate_id(),
            credit_id: "c2".to_string(),
            kind: shopbook_core::EntryKind::Credit,
            amount: Money::from_cents(100),
            description: String::new(),
            date: Utc::now(),
            owner_id: "owner".to_string(),
        };
        cache.push_ledger_entry(entry);
        assert!(!cache.ledger_loaded("c2"));
    }

    #[test]
    fn test_remove_customer_drops_ledger() {
        let mut cache = SessionCache::new();
        let customer = CreditCustomer {
            id: "c1".to_string(),
            customer_name: "Mrs. Adeyemi".to_string(),
            phone: String::new(),
            balance: Money::zero(),
            owner_id: "owner".to_string(),
            created_at: Utc::now(),
        };
        cache.set_customers(vec![customer]);
        cache.set_ledger("c1", vec![]);

        assert!(cache.remove_customer("c1"));
        assert!(cache.customer("c1").is_none());
        assert!(!cache.ledger_loaded("c1"));
    }
}

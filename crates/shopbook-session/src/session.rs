//! # Session Lifecycle
//!
//! A [`Session`] is the context object for one signed-in identity:
//! created at sign-in, dropped at sign-out. It owns the collection
//! cache and is the only component that mutates it.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Session Lifecycle                                 │
//! │                                                                         │
//! │  sign-in                                                               │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  Session::open(store, identity)                                        │
//! │     ├── no identity? ──► SignedOut                                     │
//! │     └── wholesale load: profile, products, transactions, customers     │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  operate: sell / edit_sale / grant_credit / record_payment / ...       │
//! │  read:    dashboard() / report() / credit_summary() / search           │
//! │  lazy:    ledger_entries(customer) on first detail view                │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  reload() whenever the operator asks for a refresh                     │
//! │     └── store down + cache warm? keep serving the cache                │
//! │                                                                         │
//! │  drop = sign-out (nothing to flush; every write already committed)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! One logical actor: mutations take `&mut self`, reads take `&self`.
//! The borrow checker enforces the one-in-flight-mutation rule the UI
//! shell promises. Two *devices* on the same owner are not coordinated;
//! the store is last-write-wins and [`Session::repair_balances`] is the
//! drift mitigation.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use shopbook_core::aggregate::{day_bounds, CreditSummary, Dashboard, RangeReport};
use shopbook_core::ledger::recompute_balance;
use shopbook_core::{
    CoreError, CreditCustomer, CreditLedgerEntry, Product, SaleTransaction, UserProfile,
};
use shopbook_store::collections::{
    CREDITS, CREDIT_TRANSACTIONS, FIELD_CREDIT_ID, PRODUCTS, TRANSACTIONS, USERS,
};
use shopbook_store::{DocumentStore, IdentityProvider};

use crate::cache::SessionCache;
use crate::error::{SessionError, SessionResult};
use crate::records::{decode_all, from_doc};

/// One signed-in identity's working context.
pub struct Session {
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) owner_id: String,
    profile: Option<UserProfile>,
    pub(crate) cache: SessionCache,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("owner_id", &self.owner_id)
            .field("profile", &self.profile)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Session {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Opens a session for the current identity and loads its data.
    ///
    /// ## Errors
    /// - [`SessionError::SignedOut`] when no identity is available
    /// - Store errors when the initial load fails with nothing cached
    ///   (a fresh session has no cache to degrade to)
    pub async fn open(
        store: Arc<dyn DocumentStore>,
        identity: &dyn IdentityProvider,
    ) -> SessionResult<Session> {
        let owner_id = identity.current_identity().ok_or(SessionError::SignedOut)?;

        info!(owner = %owner_id, "Opening session");

        let mut session = Session {
            store,
            owner_id,
            profile: None,
            cache: SessionCache::new(),
        };
        session.reload().await?;

        Ok(session)
    }

    /// Wholesale cache rebuild from the store.
    ///
    /// On a store failure this degrades to the existing cache when one
    /// is warm (the operator keeps working on stale data); a cold cache
    /// propagates the error so the caller can offer a retry.
    pub async fn reload(&mut self) -> SessionResult<()> {
        match self.fetch_all().await {
            Ok((profile, products, transactions, customers)) => {
                self.profile = profile;
                self.cache.set_products(products);
                self.cache.set_transactions(transactions);
                self.cache.set_customers(customers);
                self.cache.clear_ledgers();

                info!(
                    products = self.cache.products().len(),
                    transactions = self.cache.transactions().len(),
                    customers = self.cache.customers().len(),
                    "Session data loaded"
                );
                Ok(())
            }

            Err(SessionError::Store(e)) if e.is_unavailable() && !self.cache.is_empty() => {
                warn!("reload failed, serving cached data: {e}");
                Ok(())
            }

            Err(e) => Err(e),
        }
    }

    /// Fetches everything the session eagerly caches.
    async fn fetch_all(
        &self,
    ) -> SessionResult<(
        Option<UserProfile>,
        Vec<Product>,
        Vec<SaleTransaction>,
        Vec<CreditCustomer>,
    )> {
        // Profile is display-only; a missing or unreadable one never
        // blocks the session
        let profile = match self.store.get(USERS, &self.owner_id).await? {
            Some(doc) => match from_doc::<UserProfile>(USERS, &doc) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!("profile unreadable, continuing without: {e}");
                    None
                }
            },
            None => None,
        };

        let products = decode_all(
            PRODUCTS,
            &self.store.query_by_owner(PRODUCTS, &self.owner_id).await?,
        )?;
        let transactions = decode_all(
            TRANSACTIONS,
            &self
                .store
                .query_by_owner(TRANSACTIONS, &self.owner_id)
                .await?,
        )?;
        let customers = decode_all(
            CREDITS,
            &self.store.query_by_owner(CREDITS, &self.owner_id).await?,
        )?;

        Ok((profile, products, transactions, customers))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The owner this session operates as.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// The shop owner's display profile, if one is stored.
    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// The catalog, name order.
    pub fn products(&self) -> &[Product] {
        self.cache.products()
    }

    /// Case-insensitive product search.
    pub fn search_products(&self, filter: &str) -> Vec<&Product> {
        self.cache.search_products(filter)
    }

    /// Sale history, newest first.
    pub fn history(&self) -> &[SaleTransaction] {
        self.cache.transactions()
    }

    /// The credit book, name order.
    pub fn customers(&self) -> &[CreditCustomer] {
        self.cache.customers()
    }

    // =========================================================================
    // Lazy ledger fetch
    // =========================================================================

    /// A customer's ledger entries, newest first.
    ///
    /// Fetched from the store on first view, cached for the rest of the
    /// session (mutations keep the cached copy current).
    pub async fn ledger_entries(
        &mut self,
        customer_id: &str,
    ) -> SessionResult<&[CreditLedgerEntry]> {
        if self.cache.customer(customer_id).is_none() {
            return Err(CoreError::CustomerNotFound(customer_id.to_string()).into());
        }

        if !self.cache.ledger_loaded(customer_id) {
            debug!(customer = %customer_id, "Fetching ledger");
            let entries = self.fetch_ledger(customer_id).await?;
            self.cache.set_ledger(customer_id, entries);
        }

        // Just inserted above if it was missing
        Ok(self.cache.ledger(customer_id).unwrap_or(&[]))
    }

    /// Fetches a customer's full ledger from the store.
    pub(crate) async fn fetch_ledger(
        &self,
        customer_id: &str,
    ) -> SessionResult<Vec<CreditLedgerEntry>> {
        let docs = self
            .store
            .query_by_field(
                CREDIT_TRANSACTIONS,
                FIELD_CREDIT_ID,
                &json!(customer_id),
                &self.owner_id,
            )
            .await?;
        decode_all(CREDIT_TRANSACTIONS, &docs)
    }

    // =========================================================================
    // Aggregation (read-only)
    // =========================================================================

    /// Dashboard figures over the cached collections.
    pub fn dashboard(&self) -> Dashboard {
        Dashboard::compute(self.cache.products(), self.cache.transactions(), Utc::now())
    }

    /// Sales/profit report over an inclusive local-date range.
    pub fn report(&self, start: NaiveDate, end: NaiveDate) -> RangeReport {
        let (lo, hi) = day_bounds(start, end);
        RangeReport::compute(self.cache.transactions(), lo, hi)
    }

    /// Credit book totals.
    pub fn credit_summary(&self) -> CreditSummary {
        CreditSummary::compute(self.cache.customers())
    }

    // =========================================================================
    // Drift repair
    // =========================================================================

    /// Recomputes every customer balance from its full ledger and
    /// patches any stored balance that drifted. The fold result is
    /// ground truth.
    ///
    /// Needed when two devices raced on the same owner: the store is
    /// last-write-wins, so a stored balance can disagree with the
    /// ledger it caches.
    ///
    /// ## Returns
    /// The ids of customers whose balances were repaired.
    pub async fn repair_balances(&mut self) -> SessionResult<Vec<String>> {
        let customer_ids: Vec<String> =
            self.cache.customers().iter().map(|c| c.id.clone()).collect();

        let mut repaired = Vec::new();

        for id in customer_ids {
            let entries = self.fetch_ledger(&id).await?;
            let expected = recompute_balance(&entries);

            let stored = match self.cache.customer(&id) {
                Some(c) => c.balance,
                None => continue,
            };

            if stored != expected {
                info!(customer = %id, %stored, %expected, "Repairing drifted balance");

                self.store
                    .update(CREDITS, &id, &json!({ "balance": expected }))
                    .await?;

                if let Some(c) = self.cache.customer_mut(&id) {
                    c.balance = expected;
                }
                repaired.push(id.clone());
            }

            // The ledger was fetched anyway; keep it warm
            self.cache.set_ledger(&id, entries);
        }

        Ok(repaired)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

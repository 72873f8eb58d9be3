//! # Credit Book Operations
//!
//! Customers, credit grants, payments, and the two-phase deletion.
//!
//! ## The Balance Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  After every committed operation, for every customer:                   │
//! │                                                                         │
//! │    balance == Σ credit entry amounts − Σ payment entry amounts         │
//! │                                                                         │
//! │  Enforced by construction: a balance never changes without its         │
//! │  ledger entry in the SAME write batch, and a customer is never         │
//! │  created with a nonzero balance that isn't backed by an entry.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde_json::json;
use tracing::info;

use shopbook_core::validation::{
    validate_amount, validate_description, validate_name, validate_phone, validate_price,
};
use shopbook_core::{generate_id, CoreError, CreditCustomer, CreditLedgerEntry, EntryKind, Money};
use shopbook_store::collections::{CREDITS, CREDIT_TRANSACTIONS};
use shopbook_store::WriteBatch;

use crate::error::SessionResult;
use crate::records::to_body;
use crate::session::Session;

impl Session {
    /// Adds a customer to the credit book.
    ///
    /// A positive `seed` balance ("they already owe me this much")
    /// synthesizes the matching Credit ledger entry in the same commit,
    /// so the balance invariant holds from the first observable state.
    pub async fn add_customer(
        &mut self,
        name: &str,
        phone: &str,
        seed: Money,
    ) -> SessionResult<CreditCustomer> {
        let name = validate_name(name)?;
        let phone = validate_phone(phone)?;
        validate_price(seed)?;

        let now = Utc::now();
        let customer = CreditCustomer {
            id: generate_id(),
            customer_name: name,
            phone,
            balance: seed,
            owner_id: self.owner_id.clone(),
            created_at: now,
        };

        let mut batch = WriteBatch::new().insert(
            CREDITS,
            &customer.id,
            &self.owner_id,
            to_body(&customer)?,
        );

        let mut entries = Vec::new();
        if seed.is_positive() {
            let entry = CreditLedgerEntry {
                id: generate_id(),
                credit_id: customer.id.clone(),
                kind: EntryKind::Credit,
                amount: seed,
                description: "Opening balance".to_string(),
                date: now,
                owner_id: self.owner_id.clone(),
            };
            batch = batch.insert(
                CREDIT_TRANSACTIONS,
                &entry.id,
                &self.owner_id,
                to_body(&entry)?,
            );
            entries.push(entry);
        }

        self.store.apply(batch).await?;

        // A brand-new customer's ledger is fully known; cache it as
        // loaded so the detail view needs no fetch
        self.cache.set_ledger(&customer.id, entries);
        self.cache.insert_customer(customer.clone());

        info!(id = %customer.id, name = %customer.customer_name, seed = %seed, "Customer added");
        Ok(customer)
    }

    /// Records goods taken on credit: appends a Credit entry and raises
    /// the balance, atomically.
    ///
    /// Grants have no upper bound; trusting a customer further is the
    /// shop owner's call.
    pub async fn grant_credit(
        &mut self,
        customer_id: &str,
        amount: Money,
        description: &str,
    ) -> SessionResult<CreditLedgerEntry> {
        validate_amount(amount)?;
        let description = validate_description(description)?;

        let customer = self
            .cache
            .customer(customer_id)
            .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()))?
            .clone();

        let entry = CreditLedgerEntry {
            id: generate_id(),
            credit_id: customer.id.clone(),
            kind: EntryKind::Credit,
            amount,
            description,
            date: Utc::now(),
            owner_id: self.owner_id.clone(),
        };

        let new_balance = customer.balance + amount;
        let batch = WriteBatch::new()
            .insert(
                CREDIT_TRANSACTIONS,
                &entry.id,
                &self.owner_id,
                to_body(&entry)?,
            )
            .patch(CREDITS, &customer.id, json!({ "balance": new_balance }));

        self.store.apply(batch).await?;

        if let Some(c) = self.cache.customer_mut(customer_id) {
            c.balance = new_balance;
        }
        self.cache.push_ledger_entry(entry.clone());

        info!(
            customer = %customer.customer_name,
            amount = %amount,
            balance = %new_balance,
            "Credit granted"
        );
        Ok(entry)
    }

    /// Records money received: appends a Payment entry and lowers the
    /// balance, atomically.
    ///
    /// ## Errors
    /// - [`CoreError::ExceedsBalance`] when `amount > balance` - a
    ///   customer cannot end up owed money by the shop
    pub async fn record_payment(
        &mut self,
        customer_id: &str,
        amount: Money,
        note: &str,
    ) -> SessionResult<CreditLedgerEntry> {
        validate_amount(amount)?;
        let note = validate_description(note)?;

        let customer = self
            .cache
            .customer(customer_id)
            .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()))?
            .clone();

        if amount > customer.balance {
            return Err(CoreError::ExceedsBalance {
                customer: customer.customer_name,
                outstanding: customer.balance,
                requested: amount,
            }
            .into());
        }

        let entry = CreditLedgerEntry {
            id: generate_id(),
            credit_id: customer.id.clone(),
            kind: EntryKind::Payment,
            amount,
            description: note,
            date: Utc::now(),
            owner_id: self.owner_id.clone(),
        };

        let new_balance = customer.balance - amount;
        let batch = WriteBatch::new()
            .insert(
                CREDIT_TRANSACTIONS,
                &entry.id,
                &self.owner_id,
                to_body(&entry)?,
            )
            .patch(CREDITS, &customer.id, json!({ "balance": new_balance }));

        self.store.apply(batch).await?;

        if let Some(c) = self.cache.customer_mut(customer_id) {
            c.balance = new_balance;
        }
        self.cache.push_ledger_entry(entry.clone());

        info!(
            customer = %customer.customer_name,
            amount = %amount,
            balance = %new_balance,
            "Payment recorded"
        );
        Ok(entry)
    }

    /// The outstanding balance the UI must confirm before deleting a
    /// customer, or `None` when nothing is owed.
    ///
    /// Deleting a customer who still owes money erases real debt, so
    /// the shell is expected to warn - but the warning is policy, not
    /// an invariant, and [`Session::delete_customer`] never blocks on it.
    pub fn deletion_outstanding(&self, customer_id: &str) -> SessionResult<Option<Money>> {
        let customer = self
            .cache
            .customer(customer_id)
            .ok_or_else(|| CoreError::CustomerNotFound(customer_id.to_string()))?;

        Ok(customer.balance.is_positive().then_some(customer.balance))
    }

    /// Deletes a customer and their entire ledger.
    ///
    /// Two phases: the ledger entries go first in one atomic batch, the
    /// customer record only after that batch commits. If the entry
    /// batch fails, the customer survives and a retry sees a smaller
    /// (possibly empty) ledger - never a customer-less orphan ledger.
    ///
    /// ## Returns
    /// The number of ledger entries removed.
    pub async fn delete_customer(&mut self, customer_id: &str) -> SessionResult<usize> {
        if self.cache.customer(customer_id).is_none() {
            return Err(CoreError::CustomerNotFound(customer_id.to_string()).into());
        }

        // Phase 1: cascade the ledger. Queried from the store, not the
        // cache - the cached ledger may be unloaded or stale.
        let docs = self
            .store
            .query_by_field(
                CREDIT_TRANSACTIONS,
                shopbook_store::collections::FIELD_CREDIT_ID,
                &json!(customer_id),
                &self.owner_id,
            )
            .await?;

        if !docs.is_empty() {
            let mut batch = WriteBatch::new();
            for doc in &docs {
                batch = batch.delete(CREDIT_TRANSACTIONS, &doc.id);
            }
            self.store.apply(batch).await?;
        }

        // Phase 2: the parent, only now that the children are gone
        self.store.delete(CREDITS, customer_id).await?;

        self.cache.remove_customer(customer_id);

        info!(id = %customer_id, entries = docs.len(), "Customer deleted");
        Ok(docs.len())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use crate::testing::{fresh, open_session};
    use shopbook_core::ledger::recompute_balance;
    use shopbook_store::DocumentStore;

    /// Seeding a customer with 500 creates the balance AND the backing
    /// ledger entry; a 300 payment leaves 200 across two entries.
    #[tokio::test]
    async fn test_seeded_customer_then_payment() {
        let (mut session, _store) = fresh().await;

        let customer = session
            .add_customer("Mrs. Adeyemi", "0801-234-5678", Money::from_cents(50000))
            .await
            .unwrap();

        assert_eq!(customer.balance.cents(), 50000);
        let ledger = session.ledger_entries(&customer.id).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].kind, EntryKind::Credit);
        assert_eq!(ledger[0].amount.cents(), 50000);

        session
            .record_payment(&customer.id, Money::from_cents(30000), "part payment")
            .await
            .unwrap();

        let balance = session.customers()[0].balance;
        assert_eq!(balance.cents(), 20000);

        let ledger = session.ledger_entries(&customer.id).await.unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(recompute_balance(ledger), balance);
    }

    /// Overpayment is rejected outright: balance and ledger untouched.
    #[tokio::test]
    async fn test_payment_cannot_exceed_balance() {
        let (mut session, _store) = fresh().await;

        let customer = session
            .add_customer("Mrs. Adeyemi", "", Money::from_cents(20000))
            .await
            .unwrap();

        let err = session
            .record_payment(&customer.id, Money::from_cents(60000), "")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Core(CoreError::ExceedsBalance { .. })
        ));

        assert_eq!(session.customers()[0].balance.cents(), 20000);
        assert_eq!(session.ledger_entries(&customer.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_exact_payoff_reaches_zero() {
        let (mut session, _store) = fresh().await;

        let customer = session
            .add_customer("Tunde", "", Money::from_cents(20000))
            .await
            .unwrap();
        session
            .record_payment(&customer.id, Money::from_cents(20000), "settled")
            .await
            .unwrap();

        assert!(session.customers()[0].balance.is_zero());
    }

    #[tokio::test]
    async fn test_grants_have_no_cap() {
        let (mut session, _store) = fresh().await;

        let customer = session
            .add_customer("Tunde", "", Money::zero())
            .await
            .unwrap();
        session
            .grant_credit(&customer.id, Money::from_cents(10_000_000), "bulk order")
            .await
            .unwrap();

        assert_eq!(session.customers()[0].balance.cents(), 10_000_000);
    }

    #[tokio::test]
    async fn test_zero_seed_creates_no_entry() {
        let (mut session, _store) = fresh().await;

        let customer = session
            .add_customer("Tunde", "", Money::zero())
            .await
            .unwrap();

        assert!(customer.balance.is_zero());
        assert!(session.ledger_entries(&customer.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_amounts_must_be_positive() {
        let (mut session, _store) = fresh().await;

        let customer = session
            .add_customer("Tunde", "", Money::zero())
            .await
            .unwrap();

        assert!(session
            .grant_credit(&customer.id, Money::zero(), "")
            .await
            .is_err());
        assert!(session
            .record_payment(&customer.id, Money::from_cents(-100), "")
            .await
            .is_err());
    }

    /// The fold invariant holds through an arbitrary grant/payment
    /// sequence, both in this session and after a cold reload.
    #[tokio::test]
    async fn test_fold_invariant_through_sequence() {
        let (mut session, store) = fresh().await;

        let customer = session
            .add_customer("Mrs. Adeyemi", "", Money::from_cents(10000))
            .await
            .unwrap();

        session
            .grant_credit(&customer.id, Money::from_cents(25000), "provisions")
            .await
            .unwrap();
        session
            .record_payment(&customer.id, Money::from_cents(5000), "")
            .await
            .unwrap();
        session
            .grant_credit(&customer.id, Money::from_cents(7000), "soap")
            .await
            .unwrap();
        session
            .record_payment(&customer.id, Money::from_cents(30000), "")
            .await
            .unwrap();

        let balance = session.customers()[0].balance;
        assert_eq!(balance.cents(), 10000 + 25000 - 5000 + 7000 - 30000);

        let ledger = session.ledger_entries(&customer.id).await.unwrap();
        assert_eq!(recompute_balance(ledger), balance);

        // cold reload: the store agrees with the cache
        let mut reopened = open_session(store).await;
        assert_eq!(reopened.customers()[0].balance, balance);
        let ledger = reopened.ledger_entries(&customer.id).await.unwrap();
        assert_eq!(ledger.len(), 5);
        assert_eq!(recompute_balance(ledger), balance);
    }

    /// Deleting a customer removes the customer AND every ledger entry.
    #[tokio::test]
    async fn test_delete_customer_cascades() {
        let (mut session, store) = fresh().await;

        let customer = session
            .add_customer("Mrs. Adeyemi", "", Money::from_cents(10000))
            .await
            .unwrap();
        session
            .grant_credit(&customer.id, Money::from_cents(5000), "")
            .await
            .unwrap();

        let removed = session.delete_customer(&customer.id).await.unwrap();
        assert_eq!(removed, 2);
        assert!(session.customers().is_empty());

        // nothing parented to the customer survives in the store
        let leftovers = store
            .query_by_field(
                CREDIT_TRANSACTIONS,
                shopbook_store::collections::FIELD_CREDIT_ID,
                &json!(customer.id),
                crate::testing::OWNER,
            )
            .await
            .unwrap();
        assert!(leftovers.is_empty());

        let reopened = open_session(store).await;
        assert!(reopened.customers().is_empty());
    }

    #[tokio::test]
    async fn test_deletion_outstanding_warning() {
        let (mut session, _store) = fresh().await;

        let owing = session
            .add_customer("Owes", "", Money::from_cents(10000))
            .await
            .unwrap();
        let settled = session
            .add_customer("Settled", "", Money::zero())
            .await
            .unwrap();

        assert_eq!(
            session.deletion_outstanding(&owing.id).unwrap(),
            Some(Money::from_cents(10000))
        );
        assert_eq!(session.deletion_outstanding(&settled.id).unwrap(), None);

        // a positive balance warns but never blocks
        session.delete_customer(&owing.id).await.unwrap();
        assert_eq!(session.customers().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_customer_everywhere() {
        let (mut session, _store) = fresh().await;

        assert!(matches!(
            session
                .grant_credit("nope", Money::from_cents(100), "")
                .await
                .unwrap_err(),
            SessionError::Core(CoreError::CustomerNotFound(_))
        ));
        assert!(matches!(
            session
                .record_payment("nope", Money::from_cents(100), "")
                .await
                .unwrap_err(),
            SessionError::Core(CoreError::CustomerNotFound(_))
        ));
        assert!(matches!(
            session.delete_customer("nope").await.unwrap_err(),
            SessionError::Core(CoreError::CustomerNotFound(_))
        ));
        assert!(matches!(
            session.deletion_outstanding("nope").unwrap_err(),
            SessionError::Core(CoreError::CustomerNotFound(_))
        ));
    }

    /// Ledgers are fetched lazily: a fresh session has none loaded
    /// until a detail view asks.
    #[tokio::test]
    async fn test_ledger_is_lazy_in_fresh_session() {
        let (mut session, store) = fresh().await;

        let customer = session
            .add_customer("Mrs. Adeyemi", "", Money::from_cents(10000))
            .await
            .unwrap();

        let mut reopened = open_session(store).await;
        assert!(!reopened.cache.ledger_loaded(&customer.id));

        let ledger = reopened.ledger_entries(&customer.id).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert!(reopened.cache.ledger_loaded(&customer.id));
    }
}

//! # Ledger Fold
//!
//! The ground truth for credit balances.
//!
//! A customer's stored `balance` is a cache over their append-only
//! ledger. The fold here recomputes that balance from scratch and is
//! used three ways:
//!
//! 1. Materializing the balance when a customer detail view first loads
//!    entries and wants a consistency check.
//! 2. Drift repair: if two devices raced on the same customer, the
//!    stored balance may disagree with the ledger sum. The fold result
//!    wins and the stored value is patched.
//! 3. Tests: every mutation sequence must leave
//!    `balance == recompute_balance(entries)`.

use crate::money::Money;
use crate::types::{CreditCustomer, CreditLedgerEntry};

/// Recomputes a balance from a full ledger history.
///
/// Pure fold: Σ credit amounts − Σ payment amounts. Order of entries
/// does not matter.
pub fn recompute_balance(entries: &[CreditLedgerEntry]) -> Money {
    entries
        .iter()
        .fold(Money::zero(), |acc, e| acc + e.signed_amount())
}

/// Checks a customer's stored balance against their ledger.
pub fn balance_consistent(customer: &CreditCustomer, entries: &[CreditLedgerEntry]) -> bool {
    customer.balance == recompute_balance(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntryKind;
    use chrono::Utc;

    fn entry(kind: EntryKind, cents: i64) -> CreditLedgerEntry {
        CreditLedgerEntry {
            id: crate::types::generate_id(),
            credit_id: "c1".to_string(),
            kind,
            amount: Money::from_cents(cents),
            description: String::new(),
            date: Utc::now(),
            owner_id: "owner".to_string(),
        }
    }

    #[test]
    fn test_empty_ledger_is_zero() {
        assert_eq!(recompute_balance(&[]).cents(), 0);
    }

    #[test]
    fn test_credits_minus_payments() {
        let entries = vec![
            entry(EntryKind::Credit, 50000),
            entry(EntryKind::Credit, 20000),
            entry(EntryKind::Payment, 30000),
        ];
        assert_eq!(recompute_balance(&entries).cents(), 40000);
    }

    #[test]
    fn test_order_does_not_matter() {
        let a = vec![
            entry(EntryKind::Payment, 10000),
            entry(EntryKind::Credit, 30000),
        ];
        let b = vec![
            entry(EntryKind::Credit, 30000),
            entry(EntryKind::Payment, 10000),
        ];
        assert_eq!(recompute_balance(&a), recompute_balance(&b));
    }

    #[test]
    fn test_balance_consistent() {
        let entries = vec![
            entry(EntryKind::Credit, 50000),
            entry(EntryKind::Payment, 30000),
        ];
        let mut customer = CreditCustomer {
            id: "c1".to_string(),
            customer_name: "Mrs. Adeyemi".to_string(),
            phone: "0800-000-0000".to_string(),
            balance: Money::from_cents(20000),
            owner_id: "owner".to_string(),
            created_at: Utc::now(),
        };
        assert!(balance_consistent(&customer, &entries));

        // Simulated drift: stored balance no longer matches the ledger
        customer.balance = Money::from_cents(25000);
        assert!(!balance_consistent(&customer, &entries));
    }
}

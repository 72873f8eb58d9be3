//! # Aggregation Engine
//!
//! Pure read-side figures computed on demand from cached collections.
//! Nothing here mutates state or is ever persisted; calling any of
//! these twice on the same input produces identical results.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Aggregation Data Flow                              │
//! │                                                                         │
//! │  Session cache (products, transactions, customers)                     │
//! │       │                                                                 │
//! │       ├──► Dashboard::compute ──► headline figures                     │
//! │       │                                                                 │
//! │       ├──► RangeReport::compute ──► sales/profit for a date window     │
//! │       │                                                                 │
//! │       └──► CreditSummary::compute ──► total outstanding credit         │
//! │                                                                         │
//! │  READ ONLY - the reconciliation engine owns all mutation               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rounding
//! All sums are exact integer-cent arithmetic, so there is no
//! intermediate rounding to compound. Historical rows carry their own
//! cost snapshots; a deleted product drops out of the inventory
//! valuations but its transactions still count toward sales and profit.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::money::Money;
use crate::types::{CreditCustomer, Product, SaleTransaction};

// =============================================================================
// Dashboard
// =============================================================================

/// Headline figures for the dashboard screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Number of catalog products.
    pub product_count: usize,

    /// Sell-value of all stock on hand (Σ price × qty).
    pub stock_sell_value: Money,

    /// Cost-value of all stock on hand (Σ cost × qty).
    pub stock_cost_value: Money,

    /// Total units on hand (Σ qty).
    pub stock_count: i64,

    /// All-time profit over recorded sales, using cost snapshots
    /// (Σ (price − cost) × qty).
    pub profit_to_date: Money,

    /// Revenue over the trailing seven days (date ≥ now − 7 days).
    pub sales_this_week: Money,
}

impl Dashboard {
    /// Computes dashboard figures from the cached collections.
    ///
    /// `now` is passed in rather than read from the clock so the weekly
    /// window is deterministic and testable.
    pub fn compute(products: &[Product], transactions: &[SaleTransaction], now: DateTime<Utc>) -> Self {
        let week_ago = now - Duration::days(7);

        let mut stock_sell_value = Money::zero();
        let mut stock_cost_value = Money::zero();
        let mut stock_count = 0i64;
        for p in products {
            stock_sell_value += p.stock_value();
            stock_cost_value += p.stock_cost_value();
            stock_count += p.qty;
        }

        let mut profit_to_date = Money::zero();
        let mut sales_this_week = Money::zero();
        for t in transactions {
            profit_to_date += t.profit();
            if t.date >= week_ago {
                sales_this_week += t.revenue();
            }
        }

        Dashboard {
            product_count: products.len(),
            stock_sell_value,
            stock_cost_value,
            stock_count,
            profit_to_date,
            sales_this_week,
        }
    }
}

// =============================================================================
// Date-Range Report
// =============================================================================

/// Sales and profit over an inclusive date window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeReport {
    /// Revenue over transactions in the window (Σ price × qty).
    pub sales: Money,

    /// Profit over transactions in the window (Σ (price − cost) × qty).
    pub profit: Money,

    /// How many transactions fell inside the window.
    pub transaction_count: usize,
}

impl RangeReport {
    /// Computes the report over `[start, end_exclusive)`.
    ///
    /// Callers with calendar dates should build the bounds with
    /// [`day_bounds`], which handles the local-time day edges.
    pub fn compute(
        transactions: &[SaleTransaction],
        start: DateTime<Utc>,
        end_exclusive: DateTime<Utc>,
    ) -> Self {
        let mut sales = Money::zero();
        let mut profit = Money::zero();
        let mut transaction_count = 0;

        for t in transactions {
            if t.date >= start && t.date < end_exclusive {
                sales += t.revenue();
                profit += t.profit();
                transaction_count += 1;
            }
        }

        RangeReport {
            sales,
            profit,
            transaction_count,
        }
    }
}

/// Builds the UTC instants bounding an inclusive local-date range.
///
/// The window runs from `start` at 00:00:00.000 local time through the
/// whole of `end` (i.e. up to but excluding the next local midnight,
/// which covers 23:59:59.999 and everything finer).
pub fn day_bounds(start: NaiveDate, end: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start_naive = start.and_time(NaiveTime::MIN);
    let end_naive = end
        .succ_opt()
        .map(|d| d.and_time(NaiveTime::MIN))
        .unwrap_or(NaiveDateTime::MAX);

    (to_utc_local(start_naive), to_utc_local(end_naive))
}

/// Interprets a naive local timestamp as UTC.
///
/// A timestamp falling in a DST gap has no local reading; those fall
/// back to the UTC interpretation rather than failing the report.
fn to_utc_local(naive: NaiveDateTime) -> DateTime<Utc> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

// =============================================================================
// Credit Summary
// =============================================================================

/// Headline figures for the credit book screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditSummary {
    /// Σ balance over all customers.
    pub total_outstanding: Money,

    /// Number of customers in the book.
    pub customer_count: usize,
}

impl CreditSummary {
    /// Computes the summary from the cached customer list.
    ///
    /// Stored balances are treated as exact - they are materialized in
    /// cents, so summing them introduces no rounding of its own.
    pub fn compute(customers: &[CreditCustomer]) -> Self {
        let total_outstanding = customers
            .iter()
            .fold(Money::zero(), |acc, c| acc + c.balance);

        CreditSummary {
            total_outstanding,
            customer_count: customers.len(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn product(name: &str, cost: i64, price: i64, qty: i64) -> Product {
        Product {
            id: crate::types::generate_id(),
            name: name.to_string(),
            cost: Money::from_cents(cost),
            price: Money::from_cents(price),
            qty,
            owner_id: "owner".to_string(),
            created_at: Utc::now(),
        }
    }

    fn tx(price: i64, cost: i64, qty: i64, date: DateTime<Utc>) -> SaleTransaction {
        SaleTransaction {
            id: crate::types::generate_id(),
            product_id: "p1".to_string(),
            product_name: "Bag of Rice 5kg".to_string(),
            price: Money::from_cents(price),
            cost: Money::from_cents(cost),
            qty,
            date,
            owner_id: "owner".to_string(),
        }
    }

    #[test]
    fn test_dashboard_empty() {
        let dash = Dashboard::compute(&[], &[], Utc::now());
        assert_eq!(dash.product_count, 0);
        assert_eq!(dash.stock_count, 0);
        assert!(dash.stock_sell_value.is_zero());
        assert!(dash.stock_cost_value.is_zero());
        assert!(dash.profit_to_date.is_zero());
        assert!(dash.sales_this_week.is_zero());
    }

    #[test]
    fn test_dashboard_stock_figures() {
        let products = vec![
            product("Rice", 10000, 15000, 4),
            product("Beans", 5000, 8000, 10),
        ];
        let dash = Dashboard::compute(&products, &[], Utc::now());

        assert_eq!(dash.product_count, 2);
        assert_eq!(dash.stock_count, 14);
        assert_eq!(dash.stock_sell_value.cents(), 4 * 15000 + 10 * 8000);
        assert_eq!(dash.stock_cost_value.cents(), 4 * 10000 + 10 * 5000);
    }

    #[test]
    fn test_dashboard_profit_uses_cost_snapshot() {
        // Sell 3 units at 150.00 that cost 100.00: profit 150.00
        let now = Utc::now();
        let transactions = vec![tx(15000, 10000, 3, now)];
        let dash = Dashboard::compute(&[], &transactions, now);
        assert_eq!(dash.profit_to_date.cents(), 15000);
    }

    #[test]
    fn test_dashboard_weekly_window() {
        let now = Utc::now();
        let transactions = vec![
            tx(10000, 5000, 1, now - Duration::days(1)),
            tx(10000, 5000, 1, now - Duration::days(6)),
            tx(10000, 5000, 1, now - Duration::days(8)), // outside window
        ];
        let dash = Dashboard::compute(&[], &transactions, now);
        assert_eq!(dash.sales_this_week.cents(), 20000);
        // but all three still count toward all-time profit
        assert_eq!(dash.profit_to_date.cents(), 15000);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let now = Utc::now();
        let products = vec![product("Rice", 10000, 15000, 4)];
        let transactions = vec![tx(15000, 10000, 3, now)];

        let first = Dashboard::compute(&products, &transactions, now);
        let second = Dashboard::compute(&products, &transactions, now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_range_report_inclusive_bounds() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap();

        let transactions = vec![
            tx(10000, 5000, 1, start),                        // first instant: in
            tx(10000, 5000, 1, end - Duration::seconds(1)),   // last second: in
            tx(10000, 5000, 1, end),                          // next day: out
            tx(10000, 5000, 1, start - Duration::seconds(1)), // before: out
        ];

        let report = RangeReport::compute(&transactions, start, end);
        assert_eq!(report.transaction_count, 2);
        assert_eq!(report.sales.cents(), 20000);
        assert_eq!(report.profit.cents(), 10000);
    }

    #[test]
    fn test_day_bounds_cover_whole_days() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let (lo, hi) = day_bounds(start, end);

        // Two full local days
        assert_eq!(hi - lo, Duration::days(2));
    }

    #[test]
    fn test_credit_summary() {
        let customer = |cents: i64| CreditCustomer {
            id: crate::types::generate_id(),
            customer_name: "X".to_string(),
            phone: String::new(),
            balance: Money::from_cents(cents),
            owner_id: "owner".to_string(),
            created_at: Utc::now(),
        };

        let summary = CreditSummary::compute(&[customer(50000), customer(20000)]);
        assert_eq!(summary.customer_count, 2);
        assert_eq!(summary.total_outstanding.cents(), 70000);

        let empty = CreditSummary::compute(&[]);
        assert_eq!(empty.customer_count, 0);
        assert!(empty.total_outstanding.is_zero());
    }
}

//! # Reports Module
//!
//! Pure in-memory aggregation over already-fetched collections.
//!
//! ## Design
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Reporting Pipeline                                  │
//! │                                                                         │
//! │  bodega-db loads:    sales+items    expenses    products    customers   │
//! │                          │              │           │           │       │
//! │                          ▼              ▼           │           │       │
//! │              filter_sales()   filter_expenses()     │           │       │
//! │                          │              │           │           │       │
//! │                          ▼              ▼           ▼           ▼       │
//! │   summarize() · payment_method_breakdown() · top_products() ·           │
//! │   daily_totals() · inventory_valuation() · debt_summary()               │
//! │                                                                         │
//! │  Every function is deterministic: the reference instant is an           │
//! │  explicit argument, never read from the wall clock.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No persisted state; callers refetch and re-aggregate.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Customer, Expense, PaymentMethod, Product, SaleWithItems};

/// How many trailing days the daily trend covers.
pub const DAILY_TREND_DAYS: usize = 7;

/// How many products the best-seller list returns.
pub const TOP_PRODUCTS_LIMIT: usize = 10;

// =============================================================================
// Report Period
// =============================================================================

/// Date window a report is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    /// Since midnight of the reference day.
    Today,
    /// Since the most recent Sunday (inclusive).
    ThisWeek,
    /// A selected calendar month.
    Month { year: i32, month: u32 },
    /// No date filter.
    All,
}

impl ReportPeriod {
    /// Whether a calendar date falls inside this period,
    /// relative to `now`.
    pub fn contains_date(&self, date: NaiveDate, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        match *self {
            ReportPeriod::Today => date == today,
            ReportPeriod::ThisWeek => {
                let days_since_sunday = today.weekday().num_days_from_sunday() as i64;
                let week_start = today - Duration::days(days_since_sunday);
                date >= week_start && date <= today
            }
            ReportPeriod::Month { year, month } => date.year() == year && date.month() == month,
            ReportPeriod::All => true,
        }
    }

    /// Whether a timestamp falls inside this period, relative to `now`.
    pub fn contains(&self, ts: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.contains_date(ts.date_naive(), now)
    }
}

// =============================================================================
// Filters
// =============================================================================

/// Filters sales to the given period.
pub fn filter_sales<'a>(
    sales: &'a [SaleWithItems],
    period: ReportPeriod,
    now: DateTime<Utc>,
) -> Vec<&'a SaleWithItems> {
    sales
        .iter()
        .filter(|s| period.contains(s.sale.created_at, now))
        .collect()
}

/// Filters expenses to the given period.
///
/// Expenses are filtered by `expense_date` (the day the expense applies
/// to), not by when the row was captured.
pub fn filter_expenses<'a>(
    expenses: &'a [Expense],
    period: ReportPeriod,
    now: DateTime<Utc>,
) -> Vec<&'a Expense> {
    expenses
        .iter()
        .filter(|e| period.contains_date(e.expense_date, now))
        .collect()
}

// =============================================================================
// Summary
// =============================================================================

/// Headline numbers for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    /// Σ sale totals in the period.
    pub total_sales_cents: i64,
    /// Σ expense amounts in the period.
    pub total_expenses_cents: i64,
    /// total_sales - total_expenses. Can be negative.
    pub profit_cents: i64,
    /// Number of sales in the period.
    pub transaction_count: usize,
    /// Σ totals of sales still `pendiente` (unpaid fiado).
    pub pending_cents: i64,
}

/// Computes the headline summary for a set of filtered sales and expenses.
pub fn summarize(sales: &[&SaleWithItems], expenses: &[&Expense]) -> SalesSummary {
    let total_sales_cents: i64 = sales.iter().map(|s| s.sale.total_cents).sum();
    let total_expenses_cents: i64 = expenses.iter().map(|e| e.amount_cents).sum();
    let pending_cents: i64 = sales
        .iter()
        .filter(|s| s.sale.is_pending())
        .map(|s| s.sale.total_cents)
        .sum();

    SalesSummary {
        total_sales_cents,
        total_expenses_cents,
        profit_cents: total_sales_cents - total_expenses_cents,
        transaction_count: sales.len(),
        pending_cents,
    }
}

// =============================================================================
// Payment Method Breakdown
// =============================================================================

/// Revenue attributed to a single payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodTotal {
    pub method: PaymentMethod,
    pub total_cents: i64,
    pub count: usize,
}

/// Groups sale totals by payment method.
///
/// Methods with no sales in the period are omitted. Output order is
/// fixed (efectivo, tarjeta, transferencia, fiado) so the result is
/// stable across runs.
pub fn payment_method_breakdown(sales: &[&SaleWithItems]) -> Vec<PaymentMethodTotal> {
    const METHODS: [PaymentMethod; 4] = [
        PaymentMethod::Efectivo,
        PaymentMethod::Tarjeta,
        PaymentMethod::Transferencia,
        PaymentMethod::Fiado,
    ];

    METHODS
        .iter()
        .filter_map(|&method| {
            let matching: Vec<_> = sales
                .iter()
                .filter(|s| s.sale.payment_method == method)
                .collect();
            if matching.is_empty() {
                return None;
            }
            Some(PaymentMethodTotal {
                method,
                total_cents: matching.iter().map(|s| s.sale.total_cents).sum(),
                count: matching.len(),
            })
        })
        .collect()
}

// =============================================================================
// Top Products
// =============================================================================

/// Aggregated sales of one product, keyed by its snapshot name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStat {
    pub product_name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

/// Best-selling products by revenue.
///
/// Line items are grouped by `product_name` (the snapshot), so renamed
/// products show up under whatever name they sold as - matching how the
/// sale history reads.
pub fn top_products(sales: &[&SaleWithItems], limit: usize) -> Vec<ProductStat> {
    let mut stats: HashMap<&str, (i64, i64)> = HashMap::new();

    for sale in sales {
        for item in &sale.items {
            let entry = stats.entry(item.product_name.as_str()).or_insert((0, 0));
            entry.0 += item.quantity;
            entry.1 += item.subtotal_cents;
        }
    }

    let mut ranked: Vec<ProductStat> = stats
        .into_iter()
        .map(|(name, (quantity, revenue_cents))| ProductStat {
            product_name: name.to_string(),
            quantity,
            revenue_cents,
        })
        .collect();

    // Revenue descending; name ascending keeps ties deterministic.
    ranked.sort_by(|a, b| {
        b.revenue_cents
            .cmp(&a.revenue_cents)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    ranked.truncate(limit);
    ranked
}

// =============================================================================
// Daily Trend
// =============================================================================

/// Sales total for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total_cents: i64,
}

/// Buckets sale totals per calendar day and returns the trailing `days`
/// active days, oldest first. Days without sales are skipped.
pub fn daily_totals(sales: &[&SaleWithItems], days: usize) -> Vec<DailyTotal> {
    let mut buckets: HashMap<NaiveDate, i64> = HashMap::new();

    for sale in sales {
        *buckets.entry(sale.sale.created_at.date_naive()).or_insert(0) += sale.sale.total_cents;
    }

    let mut totals: Vec<DailyTotal> = buckets
        .into_iter()
        .map(|(date, total_cents)| DailyTotal { date, total_cents })
        .collect();
    totals.sort_by_key(|d| d.date);

    if totals.len() > days {
        totals.drain(..totals.len() - days);
    }
    totals
}

// =============================================================================
// Debt & Inventory
// =============================================================================

/// Customer ledger snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtSummary {
    /// Σ current_debt over all customers.
    pub total_debt_cents: i64,
    /// Customers with current_debt > 0.
    pub debtor_count: usize,
    /// Customers whose debt exceeds a configured (non-zero) limit.
    pub over_limit_count: usize,
}

/// Summarizes the customer credit ledger.
pub fn debt_summary(customers: &[Customer]) -> DebtSummary {
    DebtSummary {
        total_debt_cents: customers.iter().map(|c| c.current_debt_cents).sum(),
        debtor_count: customers.iter().filter(|c| c.has_debt()).count(),
        over_limit_count: customers.iter().filter(|c| c.is_over_limit()).count(),
    }
}

/// Current worth of the stock on hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryValuation {
    /// Σ stock × purchase_price: what the shelf inventory cost.
    pub cost_cents: i64,
    /// Σ stock × sale_price: what it would bring in if fully sold.
    pub retail_cents: i64,
}

/// Values current inventory at cost and at retail.
pub fn inventory_valuation(products: &[Product]) -> InventoryValuation {
    InventoryValuation {
        cost_cents: products
            .iter()
            .map(|p| p.stock * p.purchase_price_cents)
            .sum(),
        retail_cents: products.iter().map(|p| p.stock * p.sale_price_cents).sum(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentStatus, Sale, SaleItem};
    use chrono::TimeZone;

    fn sale_at(
        ts: DateTime<Utc>,
        total_cents: i64,
        method: PaymentMethod,
        items: Vec<(&str, i64, i64)>,
    ) -> SaleWithItems {
        let sale_id = uuid::Uuid::new_v4().to_string();
        let items = items
            .into_iter()
            .map(|(name, quantity, unit_price_cents)| SaleItem {
                id: uuid::Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                product_id: None,
                product_name: name.to_string(),
                quantity,
                unit_price_cents,
                subtotal_cents: quantity * unit_price_cents,
                created_at: ts,
            })
            .collect();

        SaleWithItems {
            sale: Sale {
                id: sale_id,
                sale_number: format!("V-{}", ts.timestamp_millis()),
                customer_id: None,
                total_cents,
                payment_method: method,
                payment_status: method.initial_status(),
                notes: None,
                created_at: ts,
            },
            items,
        }
    }

    fn expense_on(date: NaiveDate, amount_cents: i64) -> Expense {
        Expense {
            id: uuid::Uuid::new_v4().to_string(),
            description: "Luz".to_string(),
            category: "servicios".to_string(),
            amount_cents,
            payment_method: PaymentMethod::Efectivo,
            notes: None,
            expense_date: date,
            created_at: Utc::now(),
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_period_today() {
        let now = at(2026, 8, 15);
        let period = ReportPeriod::Today;

        assert!(period.contains(at(2026, 8, 15), now));
        assert!(!period.contains(at(2026, 8, 14), now));
    }

    #[test]
    fn test_period_this_week_starts_sunday() {
        // 2026-08-15 is a Saturday; the week started Sunday 2026-08-09.
        let now = at(2026, 8, 15);
        let period = ReportPeriod::ThisWeek;

        assert!(period.contains(at(2026, 8, 9), now));
        assert!(period.contains(at(2026, 8, 15), now));
        assert!(!period.contains(at(2026, 8, 8), now));
    }

    #[test]
    fn test_period_month() {
        let now = at(2026, 8, 15);
        let period = ReportPeriod::Month {
            year: 2026,
            month: 7,
        };

        assert!(period.contains(at(2026, 7, 1), now));
        assert!(period.contains(at(2026, 7, 31), now));
        assert!(!period.contains(at(2026, 8, 1), now));
        assert!(!period.contains(at(2025, 7, 15), now));
    }

    #[test]
    fn test_monthly_profit_is_exact() {
        let now = at(2026, 8, 20);
        let sales = vec![
            sale_at(at(2026, 8, 3), 2500, PaymentMethod::Efectivo, vec![]),
            sale_at(at(2026, 8, 10), 4000, PaymentMethod::Fiado, vec![]),
            sale_at(at(2026, 7, 30), 9999, PaymentMethod::Efectivo, vec![]), // outside
        ];
        let expenses = vec![
            expense_on(NaiveDate::from_ymd_opt(2026, 8, 5).unwrap(), 1500),
            expense_on(NaiveDate::from_ymd_opt(2026, 7, 5).unwrap(), 8888), // outside
        ];

        let period = ReportPeriod::Month {
            year: 2026,
            month: 8,
        };
        let filtered_sales = filter_sales(&sales, period, now);
        let filtered_expenses = filter_expenses(&expenses, period, now);
        let summary = summarize(&filtered_sales, &filtered_expenses);

        assert_eq!(summary.total_sales_cents, 6500);
        assert_eq!(summary.total_expenses_cents, 1500);
        assert_eq!(summary.profit_cents, 5000);
        assert_eq!(summary.transaction_count, 2);
        assert_eq!(summary.pending_cents, 4000); // the fiado sale
    }

    #[test]
    fn test_payment_method_breakdown() {
        let now = at(2026, 8, 20);
        let sales = vec![
            sale_at(at(2026, 8, 3), 1000, PaymentMethod::Efectivo, vec![]),
            sale_at(at(2026, 8, 4), 2000, PaymentMethod::Efectivo, vec![]),
            sale_at(at(2026, 8, 5), 500, PaymentMethod::Fiado, vec![]),
        ];
        let filtered = filter_sales(&sales, ReportPeriod::All, now);

        let breakdown = payment_method_breakdown(&filtered);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].method, PaymentMethod::Efectivo);
        assert_eq!(breakdown[0].total_cents, 3000);
        assert_eq!(breakdown[0].count, 2);
        assert_eq!(breakdown[1].method, PaymentMethod::Fiado);
        assert_eq!(breakdown[1].total_cents, 500);
    }

    #[test]
    fn test_top_products_ranked_by_revenue() {
        let now = at(2026, 8, 20);
        let sales = vec![
            sale_at(
                at(2026, 8, 3),
                5000,
                PaymentMethod::Efectivo,
                vec![("Coca-Cola", 2, 1800), ("Sabritas", 1, 1400)],
            ),
            sale_at(
                at(2026, 8, 4),
                3600,
                PaymentMethod::Efectivo,
                vec![("Coca-Cola", 2, 1800)],
            ),
        ];
        let filtered = filter_sales(&sales, ReportPeriod::All, now);

        let top = top_products(&filtered, 10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_name, "Coca-Cola");
        assert_eq!(top[0].quantity, 4);
        assert_eq!(top[0].revenue_cents, 7200);
        assert_eq!(top[1].product_name, "Sabritas");
    }

    #[test]
    fn test_daily_totals_keeps_trailing_days() {
        let now = at(2026, 8, 20);
        let mut sales = Vec::new();
        for day in 1..=10 {
            sales.push(sale_at(
                at(2026, 8, day),
                100 * day as i64,
                PaymentMethod::Efectivo,
                vec![],
            ));
        }
        let filtered = filter_sales(&sales, ReportPeriod::All, now);

        let trend = daily_totals(&filtered, DAILY_TREND_DAYS);
        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(2026, 8, 4).unwrap());
        assert_eq!(trend[6].date, NaiveDate::from_ymd_opt(2026, 8, 10).unwrap());
        assert_eq!(trend[6].total_cents, 1000);
    }

    #[test]
    fn test_daily_totals_merges_same_day() {
        let now = at(2026, 8, 20);
        let sales = vec![
            sale_at(at(2026, 8, 3), 1000, PaymentMethod::Efectivo, vec![]),
            sale_at(at(2026, 8, 3), 500, PaymentMethod::Tarjeta, vec![]),
        ];
        let filtered = filter_sales(&sales, ReportPeriod::All, now);

        let trend = daily_totals(&filtered, 7);
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].total_cents, 1500);
    }

    #[test]
    fn test_debt_summary() {
        let mk = |debt: i64, limit: i64| Customer {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Cliente".to_string(),
            phone: None,
            address: None,
            credit_limit_cents: limit,
            current_debt_cents: debt,
            notes: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let customers = vec![mk(0, 0), mk(2500, 10000), mk(12000, 10000)];

        let summary = debt_summary(&customers);
        assert_eq!(summary.total_debt_cents, 14500);
        assert_eq!(summary.debtor_count, 2);
        assert_eq!(summary.over_limit_count, 1);
    }

    #[test]
    fn test_inventory_valuation() {
        let mk = |stock: i64, purchase: i64, sale: i64| Product {
            id: uuid::Uuid::new_v4().to_string(),
            barcode: None,
            name: "P".to_string(),
            description: None,
            purchase_price_cents: purchase,
            sale_price_cents: sale,
            stock,
            min_stock: 0,
            category: None,
            unit: "pieza".to_string(),
            is_active: true,
            is_favorite: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let products = vec![mk(10, 100, 150), mk(5, 200, 300)];

        let valuation = inventory_valuation(&products);
        assert_eq!(valuation.cost_cents, 2000);
        assert_eq!(valuation.retail_cents, 3000);
    }
}

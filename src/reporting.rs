//! Report aggregation over assembled orders.
//!
//! Reports fold assembled orders into rows, either one row per order
//! (the detailed export) or grouped by business day, payment type, or
//! sales category. Every grouping attributes each order (or each
//! prorated category slice) exactly once, so row totals always re-add
//! to the totals of the underlying orders.
//!
//! Reconciliation is reported, never raised: an order whose payments do
//! not cover its computed worth shows a non-zero variance and a false
//! `reconciled` flag, and still appears in the report.

use std::collections::BTreeMap;

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::business_day::business_day_of;
use crate::error::{EngineError, EngineResult};
use crate::models::{Order, OrderType};
use crate::proration::{prorate, CategoryAmounts};
use crate::tax::order_totals;

/// How orders are grouped into report rows.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupBy {
    /// One row per order, fully detailed.
    Order,
    /// One row per business day, resolved against the given boundary
    /// time.
    BusinessDay(NaiveTime),
    /// One row per payment type. An order paid with more than one type
    /// lands in a `Mixed` row; an order with no payments lands in
    /// `Unpaid`.
    PaymentType,
    /// One row per sales category, using prorated post-discount
    /// amounts. Only `subtotal` and `by_category` are populated.
    SalesCategory,
}

/// One row of a report.
///
/// The field set and two-decimal currency units are stable: rows
/// serialize the same way regardless of grouping, with fields that do
/// not apply to a grouped row left null. Currency fields serialize as
/// strings to keep cents exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    /// The rendered group key: order number, business day, payment
    /// type, or category name.
    pub group: String,
    /// How many orders contributed to this row.
    pub order_count: u32,
    /// The source order identifier. Per-order rows only.
    pub order_id: Option<i64>,
    /// The bill number printed on the receipt. Per-order rows only.
    pub bill_number: Option<i64>,
    /// The table name. Per-order rows only.
    pub table_name: Option<String>,
    /// The party name. Per-order rows only.
    pub party_name: Option<String>,
    /// The service type. Per-order rows only.
    pub order_type: Option<OrderType>,
    /// The custom takeout subtype name. Per-order rows only.
    pub takeout_subtype: Option<String>,
    /// The payment type, when a single type describes the row.
    pub payment_type: Option<String>,
    /// The loyalty account used. Per-order rows only.
    pub loyalty_account: Option<String>,
    /// Sum of payment amounts (refunds negative).
    pub gross_payments: Decimal,
    /// Total tax.
    pub tax: Decimal,
    /// Sum of payment tips.
    pub tips: Decimal,
    /// Gratuity charged.
    pub gratuity: Decimal,
    /// Gross payments minus tips.
    pub net_sales: Decimal,
    /// Post-discount value of goods.
    pub subtotal: Decimal,
    /// Post-discount value broken down by sales category.
    pub by_category: CategoryAmounts,
    /// Net sales minus `(subtotal + gratuity + tax)`.
    pub variance: Decimal,
    /// Whether the variance is zero.
    pub reconciled: bool,
}

impl ReportRow {
    fn empty(group: String) -> Self {
        ReportRow {
            group,
            order_count: 0,
            order_id: None,
            bill_number: None,
            table_name: None,
            party_name: None,
            order_type: None,
            takeout_subtype: None,
            payment_type: None,
            loyalty_account: None,
            gross_payments: Decimal::ZERO,
            tax: Decimal::ZERO,
            tips: Decimal::ZERO,
            gratuity: Decimal::ZERO,
            net_sales: Decimal::ZERO,
            subtotal: Decimal::ZERO,
            by_category: CategoryAmounts::new(),
            variance: Decimal::ZERO,
            reconciled: true,
        }
    }

    /// Folds one order's money into this row.
    fn absorb(&mut self, order: &Order) {
        let totals = order_totals(order);
        self.order_count += 1;
        self.gross_payments += totals.gross_payments;
        self.tax += totals.tax;
        self.tips += totals.tips;
        self.gratuity += totals.gratuity;
        self.net_sales += totals.net_sales;
        self.subtotal += totals.subtotal;
        for (category, amount) in categories_of(order) {
            *self.by_category.entry(category).or_insert(Decimal::ZERO) += amount;
        }
        self.variance += totals.variance;
        // Offsetting variances must not cancel: a grouped row is
        // reconciled only when every absorbed order is.
        self.reconciled &= totals.variance.is_zero();
    }
}

/// The prorated category breakdown of a whole order.
fn categories_of(order: &Order) -> CategoryAmounts {
    let mut by_category = CategoryAmounts::new();
    for item in order.line_items() {
        for (category, amount) in prorate(item) {
            *by_category.entry(category).or_insert(Decimal::ZERO) += amount;
        }
    }
    by_category
}

/// Renders the payment-type key for an order: the single type used, or
/// `Mixed`/`Unpaid`.
fn payment_type_key(order: &Order) -> String {
    let mut types = order.payments.iter().map(|p| p.payment_type);
    match types.next() {
        None => "Unpaid".to_string(),
        Some(first) => {
            if types.all(|t| t == first) {
                first.to_string()
            } else {
                "Mixed".to_string()
            }
        }
    }
}

/// Builds the fully detailed row for one order.
fn detail_row(order: &Order) -> ReportRow {
    let mut row = ReportRow::empty(order.order_number.to_string());
    row.absorb(order);
    row.order_id = Some(order.id);
    row.bill_number = order.bill_number;
    row.table_name = order.table_name.clone();
    row.party_name = order.party_name.clone();
    row.order_type = Some(order.order_type);
    row.takeout_subtype = order.custom_takeout_type.clone();
    if !order.payments.is_empty() {
        let key = payment_type_key(order);
        if key != "Mixed" {
            row.payment_type = Some(key);
        }
    }
    row.loyalty_account = order
        .loyalty
        .as_ref()
        .and_then(|l| l.account_name.clone());
    row
}

/// Aggregates assembled orders into report rows.
///
/// Per-order rows keep input order; grouped rows are sorted by their
/// group key. Every grouping counts each order once, so summing any
/// money column across the returned rows reproduces the same column
/// summed across the input orders (for [`GroupBy::SalesCategory`] this
/// holds for `subtotal`, the only column that decomposes by category).
pub fn aggregate(orders: &[Order], group_by: &GroupBy) -> Vec<ReportRow> {
    debug!(orders = orders.len(), ?group_by, "aggregating orders");
    match group_by {
        GroupBy::Order => orders.iter().map(detail_row).collect(),
        GroupBy::BusinessDay(boundary) => {
            let mut rows: BTreeMap<String, ReportRow> = BTreeMap::new();
            for order in orders {
                let day = business_day_of(order.paid_at, *boundary).to_string();
                rows.entry(day.clone())
                    .or_insert_with(|| ReportRow::empty(day))
                    .absorb(order);
            }
            rows.into_values().collect()
        }
        GroupBy::PaymentType => {
            let mut rows: BTreeMap<String, ReportRow> = BTreeMap::new();
            for order in orders {
                let key = payment_type_key(order);
                let row = rows
                    .entry(key.clone())
                    .or_insert_with(|| ReportRow::empty(key.clone()));
                row.absorb(order);
                if key != "Mixed" && key != "Unpaid" {
                    row.payment_type = Some(key);
                }
            }
            rows.into_values().collect()
        }
        GroupBy::SalesCategory => {
            let mut rows: BTreeMap<String, ReportRow> = BTreeMap::new();
            for order in orders {
                for (category, amount) in categories_of(order) {
                    let row = rows
                        .entry(category.clone())
                        .or_insert_with(|| ReportRow::empty(category.clone()));
                    row.order_count += 1;
                    row.subtotal += amount;
                    *row.by_category.entry(category).or_insert(Decimal::ZERO) += amount;
                }
            }
            rows.into_values().collect()
        }
    }
}

/// A finished report: rows plus the orders that could not be assembled.
///
/// One malformed order never aborts a multi-order report; its error is
/// collected here instead.
#[derive(Debug)]
pub struct Aggregation {
    /// The report rows.
    pub rows: Vec<ReportRow>,
    /// Errors from orders that failed assembly.
    pub failures: Vec<EngineError>,
}

impl Aggregation {
    /// Partitions per-order results into report rows and failures.
    pub fn from_results<I>(results: I, group_by: &GroupBy) -> Aggregation
    where
        I: IntoIterator<Item = EngineResult<Order>>,
    {
        let mut orders = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(order) => orders.push(order),
                Err(error) => {
                    warn!(%error, "order excluded from report");
                    failures.push(error);
                }
            }
        }
        Aggregation {
            rows: aggregate(&orders, group_by),
            failures,
        }
    }
}

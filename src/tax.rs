//! Tax computation and order-level financial totals.
//!
//! Tax is three flat tiers, each with its own rate captured on the
//! order at payment time and a per-item exemption flag. Tier 2 can
//! optionally stack on tier 1 (tax on tax), which some jurisdictions
//! require. Per-tier amounts accumulate unrounded across the whole
//! order and the combined total is rounded to cents exactly once, so a
//! many-item order never drifts from the receipt by accumulated
//! rounding error.

use rust_decimal::Decimal;

use crate::models::{LineItem, Order};
use crate::proration::round_currency;

/// Unrounded per-tier tax accumulations for one order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaxBreakdown {
    /// Tier 1 accumulation.
    pub tier1: Decimal,
    /// Tier 2 accumulation (includes tax-on-tax when stacking is on).
    pub tier2: Decimal,
    /// Tier 3 accumulation.
    pub tier3: Decimal,
}

impl TaxBreakdown {
    /// Returns the combined tax rounded to cents. This is the single
    /// rounding point for the whole order's tax.
    pub fn total(&self) -> Decimal {
        round_currency(self.tier1 + self.tier2 + self.tier3)
    }
}

/// The taxable base of one line: its post-discount subtotal, with
/// taxable discounts added back (a taxable discount reduces the price
/// but not the amount tax is charged on).
fn taxable_base(item: &LineItem) -> Decimal {
    let taxable_discounts: Decimal = item
        .discounts
        .iter()
        .chain(item.modifiers.iter().flat_map(|m| m.discounts.iter()))
        .filter(|d| d.taxable)
        .map(|d| d.amount)
        .sum();
    item.subtotal() + taxable_discounts
}

/// Accumulates per-tier tax across every line item of an order.
///
/// Each tier skips items flagged exempt from it. When the order stacks
/// tier 2 on tier 1, an item's tier-2 base includes the tier-1 tax
/// charged on that item (exempt items contribute no tier-1 tax to
/// stack). Gratuity joins the taxable base of every tier when the
/// order charges gratuity before tax.
pub fn tax_breakdown(order: &Order) -> TaxBreakdown {
    let mut breakdown = TaxBreakdown::default();
    for item in order.line_items() {
        let base = taxable_base(item);
        let tier1 = if item.exempt_tax1 {
            Decimal::ZERO
        } else {
            base * order.tax.rate1
        };
        breakdown.tier1 += tier1;
        if !item.exempt_tax2 {
            let base2 = if order.tax.stack_tax2_on_tax1 {
                base + tier1
            } else {
                base
            };
            breakdown.tier2 += base2 * order.tax.rate2;
        }
        if !item.exempt_tax3 {
            breakdown.tier3 += base * order.tax.rate3;
        }
    }
    if order.gratuity_before_tax {
        let tier1 = order.gratuity * order.tax.rate1;
        breakdown.tier1 += tier1;
        let base2 = if order.tax.stack_tax2_on_tax1 {
            order.gratuity + tier1
        } else {
            order.gratuity
        };
        breakdown.tier2 += base2 * order.tax.rate2;
        breakdown.tier3 += order.gratuity * order.tax.rate3;
    }
    breakdown
}

/// Returns the order's total tax, rounded to cents once.
///
/// # Example
///
/// ```
/// use order_engine::tax::order_tax;
/// # use order_engine::models::*;
/// # use chrono::NaiveDate;
/// # use rust_decimal::Decimal;
/// # use std::str::FromStr;
/// # use uuid::Uuid;
/// # fn dec(s: &str) -> Decimal { Decimal::from_str(s).unwrap() }
/// # let order = Order {
/// #     id: 1, uuid: Uuid::nil(), order_number: 1, bill_number: None,
/// #     table_name: None, party_name: None, party_size: None,
/// #     order_type: OrderType::DineIn, custom_takeout_type: None, waiter_name: None,
/// #     tax: TaxSettings {
/// #         rate1: dec("0.05"), rate2: Decimal::ZERO, rate3: Decimal::ZERO,
/// #         stack_tax2_on_tax1: false,
/// #     },
/// #     gratuity: Decimal::ZERO, gratuity_before_tax: false,
/// #     paid_at: NaiveDate::from_ymd_opt(2020, 6, 1).unwrap().and_hms_opt(19, 0, 0).unwrap(),
/// #     seated_at: None, outstanding_balance: Decimal::ZERO,
/// #     splits: vec![Split {
/// #         id: 1, split_index: 0, order_number: None, created_at: None, split_by: 1,
/// #         line_items: vec![LineItem {
/// #             id: 1, name: "Burger".into(), sales_category: "Food".into(),
/// #             unit_price: dec("20.00"), quantity: Decimal::ONE, open_price: None,
/// #             course: None, was_sent: true, sent_at: None, waiter_name: None,
/// #             is_return: false, exempt_tax1: false, exempt_tax2: false,
/// #             exempt_tax3: false, modifiers: vec![], discounts: vec![],
/// #         }],
/// #     }],
/// #     payments: vec![], loyalty: None,
/// # };
/// assert_eq!(order_tax(&order), dec("1.00"));
/// ```
pub fn order_tax(order: &Order) -> Decimal {
    tax_breakdown(order).total()
}

/// The reconciled financial summary of one order.
///
/// `net_sales` is what the venue actually took in for goods: gross
/// payments with tips backed out. `variance` compares that against
/// what the order says it was worth (subtotal plus gratuity plus tax);
/// a non-zero variance flags an order whose payments do not reconcile,
/// e.g. one with an outstanding balance or a partial refund.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTotals {
    /// Post-discount value of all line items and modifiers.
    pub subtotal: Decimal,
    /// Total tax, rounded to cents.
    pub tax: Decimal,
    /// Gratuity charged on the order.
    pub gratuity: Decimal,
    /// Sum of all payment amounts (refunds negative).
    pub gross_payments: Decimal,
    /// Sum of all payment tips.
    pub tips: Decimal,
    /// Gross payments minus tips.
    pub net_sales: Decimal,
    /// `net_sales` minus `(subtotal + gratuity + tax)`.
    pub variance: Decimal,
}

impl OrderTotals {
    /// Whether payments exactly cover the order's computed worth.
    pub fn reconciled(&self) -> bool {
        self.variance.is_zero()
    }
}

/// Computes the financial summary for an assembled order.
pub fn order_totals(order: &Order) -> OrderTotals {
    let subtotal = order.subtotal();
    let tax = order_tax(order);
    let gross_payments = order.payment_total();
    let tips = order.tip_total();
    let net_sales = gross_payments - tips;
    let variance = net_sales - (subtotal + order.gratuity + tax);
    OrderTotals {
        subtotal,
        tax,
        gratuity: order.gratuity,
        gross_payments,
        tips,
        net_sales,
        variance,
    }
}

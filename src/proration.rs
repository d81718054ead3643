//! Discount proration across sales categories.
//!
//! A line item's money may span several sales categories: the item
//! itself belongs to one, and each of its modifiers may belong to
//! another. Reports that break revenue down by category therefore need
//! item-level discounts spread across those categories in proportion to
//! what each contributed. This module performs that distribution with
//! exact decimal arithmetic and a largest-remainder correction, so the
//! prorated parts always re-add to the original discount to the cent.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};
use crate::models::LineItem;

/// Post-discount dollar amounts keyed by sales category name.
///
/// A `BTreeMap` keeps category iteration order deterministic, which
/// keeps report output stable across runs.
pub type CategoryAmounts = BTreeMap<String, Decimal>;

/// Rounds a dollar amount to cents, half-up away from zero.
///
/// This is the single rounding rule used everywhere money is rounded:
/// 0.005 rounds to 0.01 and -0.005 rounds to -0.01.
///
/// # Example
///
/// ```
/// use order_engine::proration::round_currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let d = Decimal::from_str("2.345").unwrap();
/// assert_eq!(round_currency(d), Decimal::from_str("2.35").unwrap());
/// let n = Decimal::from_str("-2.345").unwrap();
/// assert_eq!(round_currency(n), Decimal::from_str("-2.35").unwrap());
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// One pro-ratable slice of a line item's value.
struct Component<'a> {
    category: &'a str,
    /// Pre-discount amount, the proration weight.
    gross: Decimal,
    /// Running post-discount amount.
    net: Decimal,
}

/// Distributes a line item's post-discount value across sales
/// categories.
///
/// The item contributes its base price under its own category; each
/// modifier contributes its amount under the modifier's category.
/// Modifier-attached discounts reduce only their modifier. Each
/// item-attached discount is split across all components in proportion
/// to their pre-discount amounts, each share rounded to cents, with the
/// leftover cent (if any) assigned to the component with the largest
/// pre-discount amount (first in assembly order on ties). Successive
/// discounts are each prorated against the original pre-discount
/// amounts, so their distribution does not depend on application order.
///
/// Negative results are preserved: a discount larger than the item's
/// value legitimately yields negative category amounts, and the
/// category sums still re-add to the item's subtotal exactly.
///
/// A zero-value item carrying a discount cannot be prorated
/// proportionally; the whole discount is attributed to the item's own
/// category. Use [`prorate_strict`] to surface that case as an error
/// instead.
///
/// # Example
///
/// ```
/// use order_engine::models::{LineItem, Modifier};
/// use order_engine::proration::prorate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// # use order_engine::models::{Discount, DiscountKind};
/// # fn dec(s: &str) -> Decimal { Decimal::from_str(s).unwrap() }
/// # let item = LineItem {
/// #     id: 1, name: "Steak frites".into(), sales_category: "Food".into(),
/// #     unit_price: dec("15.00"), quantity: Decimal::ONE, open_price: None,
/// #     course: None, was_sent: true, sent_at: None, waiter_name: None,
/// #     is_return: false, exempt_tax1: false, exempt_tax2: false, exempt_tax3: false,
/// #     modifiers: vec![Modifier {
/// #         id: 10, name: "Wine pairing".into(), amount: dec("2.00"),
/// #         sales_category: "Drinks".into(), discounts: vec![],
/// #     }],
/// #     discounts: vec![Discount {
/// #         id: 100, label: "Manager comp".into(), amount: dec("7.50"),
/// #         kind: DiscountKind::Discount, taxable: false, returns_inventory: false,
/// #         waiter_name: None, authorizer_name: None, applied_at: None,
/// #     }],
/// # };
/// let by_category = prorate(&item);
/// assert_eq!(by_category["Food"], dec("8.38"));
/// assert_eq!(by_category["Drinks"], dec("1.12"));
/// ```
pub fn prorate(item: &LineItem) -> CategoryAmounts {
    let mut components: Vec<Component<'_>> = Vec::with_capacity(1 + item.modifiers.len());
    components.push(Component {
        category: &item.sales_category,
        gross: item.base_price(),
        net: item.base_price(),
    });
    for modifier in &item.modifiers {
        let net = modifier.amount - modifier.discount_total();
        components.push(Component {
            category: &modifier.sales_category,
            gross: modifier.amount,
            net,
        });
    }

    let total: Decimal = components.iter().map(|c| c.gross).sum();
    for discount in &item.discounts {
        if total.is_zero() {
            // Nothing to weight by; the item's own category absorbs it.
            components[0].net -= discount.amount;
            continue;
        }
        let mut distributed = Decimal::ZERO;
        let mut shares: Vec<Decimal> = Vec::with_capacity(components.len());
        for component in &components {
            let share = round_currency(discount.amount * component.gross / total);
            distributed += share;
            shares.push(share);
        }
        // Largest-remainder correction: the leftover cent lands on the
        // component with the largest pre-discount amount, first wins on
        // ties.
        let leftover = discount.amount - distributed;
        if !leftover.is_zero() {
            let heaviest = components
                .iter()
                .enumerate()
                .max_by(|(a_idx, a), (b_idx, b)| {
                    a.gross.cmp(&b.gross).then(b_idx.cmp(a_idx))
                })
                .map(|(idx, _)| idx)
                .unwrap_or(0);
            shares[heaviest] += leftover;
        }
        for (component, share) in components.iter_mut().zip(shares) {
            component.net -= share;
        }
    }

    let mut by_category = CategoryAmounts::new();
    for component in &components {
        *by_category
            .entry(component.category.to_string())
            .or_insert(Decimal::ZERO) += component.net;
    }
    debug_assert_eq!(
        by_category.values().copied().sum::<Decimal>(),
        item.subtotal(),
        "prorated categories must re-add to the item subtotal"
    );
    by_category
}

/// Like [`prorate`], but rejects zero-value items carrying a non-zero
/// discount instead of falling back to the item's own category.
///
/// # Errors
///
/// Returns [`EngineError::ProrationUndefined`] when the item's
/// pre-discount total is zero and at least one attached discount is
/// non-zero.
pub fn prorate_strict(item: &LineItem) -> EngineResult<CategoryAmounts> {
    let has_discount = item.discounts.iter().any(|d| !d.amount.is_zero());
    if item.gross_total().is_zero() && has_discount {
        return Err(EngineError::ProrationUndefined { item_id: item.id });
    }
    Ok(prorate(item))
}

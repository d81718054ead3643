//! Raw row types produced by the external loader.
//!
//! The engine never queries the data store itself. An external loader
//! (the [`RowSource`] implementor) fetches flat relational rows for a
//! timestamp interval, with foreign identifiers already resolved and all
//! timestamps already converted from the source epoch. The structs here
//! replace the source's column-keyed dictionaries with named, typed
//! fields; cross-row validation happens later, at assembly time.

use std::collections::HashMap;

use chrono::{NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::business_day::resolve_range;
use crate::error::EngineResult;

/// One paid-order row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
    /// Primary key of the order.
    pub order_id: i64,
    /// Source UUID of the order.
    pub uuid: Uuid,
    /// Customer-facing order number.
    pub order_number: i64,
    /// Bill number printed on the receipt.
    pub bill_number: Option<i64>,
    /// Table name, when seated.
    pub table_name: Option<String>,
    /// Party name, when named.
    pub party_name: Option<String>,
    /// Number of guests.
    pub party_size: Option<u32>,
    /// Raw takeout-type code: `None` dine-in, `0` takeout, `1` delivery,
    /// `2` bar tab.
    pub takeout_type: Option<i64>,
    /// Venue-defined takeout subtype name, when present.
    pub custom_takeout_type: Option<String>,
    /// Staff member who closed the bill.
    pub waiter_name: Option<String>,
    /// Tax tier 1 rate as a fraction.
    pub tax_rate_1: Decimal,
    /// Tax tier 2 rate as a fraction.
    pub tax_rate_2: Decimal,
    /// Tax tier 3 rate as a fraction.
    pub tax_rate_3: Decimal,
    /// Whether tier 2 tax stacks on the tier-1-taxed amount.
    pub stack_tax2_on_tax1: bool,
    /// Gratuity charged, in dollars.
    pub gratuity: Decimal,
    /// Whether gratuity joins the taxable base before tax is computed.
    pub gratuity_before_tax: bool,
    /// When the order was paid.
    pub paid_at: NaiveDateTime,
    /// When the party was seated.
    pub seated_at: Option<NaiveDateTime>,
    /// Balance still owing.
    pub outstanding_balance: Decimal,
    /// Foreign key of the payment group holding this order's payments.
    pub payment_group_id: i64,
}

/// One split row. An order that was never split has no split rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitRow {
    /// Primary key of the split.
    pub split_id: i64,
    /// The owning order.
    pub order_id: i64,
    /// Zero-based position within the order.
    pub split_index: u32,
    /// Customer-facing order number for this split's bill.
    pub order_number: Option<i64>,
    /// When the split was created.
    pub created_at: Option<NaiveDateTime>,
    /// How many ways the bill was divided.
    pub split_by: u32,
}

/// One line-item row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    /// Primary key of the item.
    pub item_id: i64,
    /// The owning order.
    pub order_id: i64,
    /// The owning split, or `None` when the order was never split.
    pub split_id: Option<i64>,
    /// Stored position within the split; receipt order.
    pub item_index: u32,
    /// Menu item name.
    pub name: String,
    /// Sales category label.
    pub sales_category: String,
    /// Menu unit price.
    pub unit_price: Decimal,
    /// Ordered quantity.
    pub quantity: Decimal,
    /// Open price overriding the menu price, when keyed in.
    pub open_price: Option<Decimal>,
    /// Course index, when coursing is used.
    pub course: Option<i32>,
    /// Whether the item was sent to the kitchen/bar.
    pub was_sent: bool,
    /// When the item was sent.
    pub sent_at: Option<NaiveDateTime>,
    /// Staff member who entered the item.
    pub waiter_name: Option<String>,
    /// Whether this line is a return.
    pub is_return: bool,
    /// Exempt from tax tier 1.
    pub exempt_tax1: bool,
    /// Exempt from tax tier 2.
    pub exempt_tax2: bool,
    /// Exempt from tax tier 3.
    pub exempt_tax3: bool,
}

/// One modifier row, attached to a line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierRow {
    /// Primary key of the modifier.
    pub modifier_id: i64,
    /// The owning line item.
    pub item_id: i64,
    /// Stored position within the item; receipt order.
    pub modifier_index: u32,
    /// Modifier name (including custom text).
    pub name: String,
    /// Modifier charge; zero for free modifiers.
    pub amount: Decimal,
    /// Sales category label; falls back to the owning item's category
    /// when absent.
    pub sales_category: Option<String>,
}

/// One discount row, attached to either a line item or a modifier
/// (exactly one of the two).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRow {
    /// Primary key of the discount.
    pub discount_id: i64,
    /// The owning line item, for item-level discounts.
    pub item_id: Option<i64>,
    /// The owning modifier, for modifier-level discounts.
    pub modifier_id: Option<i64>,
    /// Stored position among the parent's discounts.
    pub discount_index: u32,
    /// Discounted amount in dollars.
    pub amount: Decimal,
    /// Human-readable description.
    pub label: String,
    /// Raw type code: `0` void, `1` discount.
    pub kind_code: i64,
    /// Whether the discounted amount remains taxable.
    pub taxable: bool,
    /// Whether the discount returns inventory.
    pub returns_inventory: bool,
    /// Staff member who applied the discount.
    pub waiter_name: Option<String>,
    /// Staff member who authorized it, when approval was required.
    pub authorizer_name: Option<String>,
    /// When the discount was applied.
    pub applied_at: Option<NaiveDateTime>,
}

/// One payment row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRow {
    /// Source UUID of the payment.
    pub uuid: Uuid,
    /// The payment group this payment belongs to.
    pub payment_group_id: i64,
    /// Stored sequence within the group; receipt order.
    pub sequence: u32,
    /// Raw type code: `0` cash, `1` electronic, `5` customer account,
    /// `6` loyalty.
    pub type_code: i64,
    /// Settled amount; negative for refunds.
    pub amount: Decimal,
    /// Tip amount.
    pub tip: Decimal,
    /// Change given.
    pub change: Decimal,
    /// Portion still refundable.
    pub refundable_amount: Decimal,
    /// Card brand, electronic payments only.
    pub card_type: Option<String>,
    /// Authorization code, electronic payments only.
    pub auth_number: Option<String>,
    /// House account identifier, customer-account payments only.
    pub customer_account_id: Option<i64>,
    /// For refunds, the original payment's UUID.
    pub original_payment_uuid: Option<Uuid>,
    /// When the payment occurred.
    pub paid_at: Option<NaiveDateTime>,
}

/// One loyalty row; at most one per order by construction of the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyRow {
    /// The owning order.
    pub order_id: i64,
    /// Loyalty account name.
    pub account_name: Option<String>,
    /// Dollar credit balance after the order.
    pub credit_balance: Decimal,
    /// Point balance after the order.
    pub point_balance: Decimal,
    /// Points earned on the order.
    pub points_earned: Decimal,
    /// Points spent on the order.
    pub points_used: Decimal,
    /// Points refunded on the order.
    pub points_refunded: Decimal,
}

/// Everything the loader fetched for one order, bundled for assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRowSet {
    /// The order row itself.
    pub order: OrderRow,
    /// Split rows belonging to the order.
    pub splits: Vec<SplitRow>,
    /// Line-item rows belonging to the order.
    pub items: Vec<ItemRow>,
    /// Modifier rows belonging to the order's items.
    pub modifiers: Vec<ModifierRow>,
    /// Discount rows belonging to the order's items and modifiers.
    pub discounts: Vec<DiscountRow>,
    /// Payment rows in the order's payment group.
    pub payments: Vec<PaymentRow>,
    /// The order's loyalty row, if any.
    pub loyalty: Option<LoyaltyRow>,
}

/// The external loader contract.
///
/// Implementors own the data store and its read-only queries; the engine
/// only sees the rows. Each fetcher is keyed by the parent identifiers
/// produced at the previous stage, and every returned timestamp is
/// already in calendar time.
pub trait RowSource {
    /// Fetches order rows paid within `[start, end)`.
    fn fetch_orders(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> EngineResult<Vec<OrderRow>>;

    /// Fetches split rows for the given orders.
    fn fetch_splits(&self, order_ids: &[i64]) -> EngineResult<Vec<SplitRow>>;

    /// Fetches line-item rows for the given orders.
    fn fetch_items(&self, order_ids: &[i64]) -> EngineResult<Vec<ItemRow>>;

    /// Fetches modifier rows for the given line items.
    fn fetch_modifiers(&self, item_ids: &[i64]) -> EngineResult<Vec<ModifierRow>>;

    /// Fetches discount rows attached to the given items or modifiers.
    fn fetch_discounts(
        &self,
        item_ids: &[i64],
        modifier_ids: &[i64],
    ) -> EngineResult<Vec<DiscountRow>>;

    /// Fetches payment rows for the given payment groups.
    fn fetch_payments(&self, payment_group_ids: &[i64]) -> EngineResult<Vec<PaymentRow>>;

    /// Fetches the loyalty row for an order, if one exists.
    fn fetch_loyalty(&self, order_id: i64) -> EngineResult<Option<LoyaltyRow>>;
}

/// Loads every order paid in the given business-day range and bundles
/// each with its child rows, ready for assembly.
///
/// This is the staged fetch described by the loader contract: orders
/// first, then children keyed by the identifiers the previous stage
/// produced. Rows land in the bundle of whichever order owns them.
pub fn load_orders<S: RowSource>(
    source: &S,
    earliest: chrono::NaiveDate,
    latest: chrono::NaiveDate,
    boundary: NaiveTime,
) -> EngineResult<Vec<OrderRowSet>> {
    let (start, end) = resolve_range(earliest, latest, boundary)?;
    let orders = source.fetch_orders(start, end)?;
    tracing::debug!(count = orders.len(), %start, %end, "fetched orders");

    let order_ids: Vec<i64> = orders.iter().map(|o| o.order_id).collect();
    let group_ids: Vec<i64> = orders.iter().map(|o| o.payment_group_id).collect();

    let splits = source.fetch_splits(&order_ids)?;
    let items = source.fetch_items(&order_ids)?;
    let item_ids: Vec<i64> = items.iter().map(|i| i.item_id).collect();
    let modifiers = source.fetch_modifiers(&item_ids)?;
    let modifier_ids: Vec<i64> = modifiers.iter().map(|m| m.modifier_id).collect();
    let discounts = source.fetch_discounts(&item_ids, &modifier_ids)?;
    let payments = source.fetch_payments(&group_ids)?;

    // Map each item to its order so item-keyed children can be routed.
    let item_owner: HashMap<i64, i64> =
        items.iter().map(|i| (i.item_id, i.order_id)).collect();
    let modifier_owner: HashMap<i64, i64> = modifiers
        .iter()
        .filter_map(|m| item_owner.get(&m.item_id).map(|oid| (m.modifier_id, *oid)))
        .collect();

    let mut sets = Vec::with_capacity(orders.len());
    for order in orders {
        let loyalty = source.fetch_loyalty(order.order_id)?;
        let set = OrderRowSet {
            splits: splits
                .iter()
                .filter(|s| s.order_id == order.order_id)
                .cloned()
                .collect(),
            items: items
                .iter()
                .filter(|i| i.order_id == order.order_id)
                .cloned()
                .collect(),
            modifiers: modifiers
                .iter()
                .filter(|m| item_owner.get(&m.item_id) == Some(&order.order_id))
                .cloned()
                .collect(),
            discounts: discounts
                .iter()
                .filter(|d| {
                    d.item_id
                        .map(|id| item_owner.get(&id) == Some(&order.order_id))
                        .or_else(|| {
                            d.modifier_id
                                .map(|id| modifier_owner.get(&id) == Some(&order.order_id))
                        })
                        .unwrap_or(false)
                })
                .cloned()
                .collect(),
            payments: payments
                .iter()
                .filter(|p| p.payment_group_id == order.payment_group_id)
                .cloned()
                .collect(),
            loyalty,
            order,
        };
        sets.push(set);
    }
    Ok(sets)
}

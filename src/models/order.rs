//! Order and split models.
//!
//! An [`Order`] is one paid bill, reconstructed from a point-in-time
//! export. It owns its [`Split`]s (which own line items), its payments,
//! and an optional loyalty reference. Every entity here is a read-only
//! value; nothing is mutated after assembly.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LineItem, LoyaltyInfo, Payment};

/// The service type of an order.
///
/// Custom takeout variants (e.g. a named delivery partner) keep
/// [`OrderType::Takeout`] here and carry the custom name as the order's
/// takeout subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Eaten on premises.
    DineIn,
    /// Picked up by the customer.
    Takeout,
    /// Delivered to the customer.
    Delivery,
    /// Run as an open bar tab.
    BarTab,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::DineIn => write!(f, "dinein"),
            OrderType::Takeout => write!(f, "takeout"),
            OrderType::Delivery => write!(f, "delivery"),
            OrderType::BarTab => write!(f, "bartab"),
        }
    }
}

/// The three independently-configured flat tax rates for an order,
/// captured at payment time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSettings {
    /// Tax tier 1 rate, as a fraction (e.g. 0.05 for 5%).
    pub rate1: Decimal,
    /// Tax tier 2 rate, as a fraction.
    pub rate2: Decimal,
    /// Tax tier 3 rate, as a fraction.
    pub rate3: Decimal,
    /// When true, tier 2 is computed on the tier-1-taxed amount (tax on
    /// tax) rather than on the bare subtotal.
    pub stack_tax2_on_tax1: bool,
}

/// A sub-division of one bill into a separately payable unit.
///
/// Every order has at least one split: an order that was never split is
/// modeled as a single synthetic split (index 0) holding all of its line
/// items, so callers always see a uniform shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    /// The source identifier for this split, or the owning order's
    /// identifier for a synthetic split.
    pub id: i64,
    /// Zero-based position of this split within the order.
    pub split_index: u32,
    /// The customer-facing order number printed on this split's bill.
    pub order_number: Option<i64>,
    /// When the split was created. Synthetic splits have no creation
    /// time.
    pub created_at: Option<NaiveDateTime>,
    /// How many ways the bill was divided when this split was created.
    pub split_by: u32,
    /// The line items on this split, ordered by their stored index.
    pub line_items: Vec<LineItem>,
}

/// One paid bill, fully reconstructed.
///
/// # Example
///
/// ```
/// use order_engine::models::{Order, OrderType, Split, TaxSettings};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let order = Order {
///     id: 1201,
///     uuid: Uuid::nil(),
///     order_number: 40044,
///     bill_number: Some(312),
///     table_name: Some("Patio 4".to_string()),
///     party_name: None,
///     party_size: Some(2),
///     order_type: OrderType::DineIn,
///     custom_takeout_type: None,
///     waiter_name: Some("Dana".to_string()),
///     tax: TaxSettings {
///         rate1: Decimal::new(5, 2),
///         rate2: Decimal::ZERO,
///         rate3: Decimal::ZERO,
///         stack_tax2_on_tax1: false,
///     },
///     gratuity: Decimal::ZERO,
///     gratuity_before_tax: false,
///     paid_at: NaiveDate::from_ymd_opt(2020, 6, 1)
///         .unwrap()
///         .and_hms_opt(19, 30, 0)
///         .unwrap(),
///     seated_at: None,
///     outstanding_balance: Decimal::ZERO,
///     splits: vec![],
///     payments: vec![],
///     loyalty: None,
/// };
/// assert_eq!(order.subtotal(), Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// The source identifier for this order.
    pub id: i64,
    /// The source UUID for this order.
    pub uuid: Uuid,
    /// The customer-facing order number.
    pub order_number: i64,
    /// The bill number printed on the receipt.
    pub bill_number: Option<i64>,
    /// The table the party was seated at.
    pub table_name: Option<String>,
    /// The party name, for named parties and takeout orders.
    pub party_name: Option<String>,
    /// The number of guests in the party.
    pub party_size: Option<u32>,
    /// The service type of the order.
    pub order_type: OrderType,
    /// The custom takeout subtype name, when the venue defines its own
    /// takeout variants.
    pub custom_takeout_type: Option<String>,
    /// The staff member who closed the bill.
    pub waiter_name: Option<String>,
    /// The tax rates in force when the order was paid.
    pub tax: TaxSettings,
    /// The gratuity charged on the order, in dollars.
    pub gratuity: Decimal,
    /// When true, gratuity joins the taxable base before tax is
    /// computed; otherwise it is added after.
    pub gratuity_before_tax: bool,
    /// When the order was paid.
    pub paid_at: NaiveDateTime,
    /// When the party was seated, if recorded.
    pub seated_at: Option<NaiveDateTime>,
    /// The balance still owing on the order, in dollars.
    pub outstanding_balance: Decimal,
    /// The order's splits, ordered by split index. Never empty after
    /// assembly.
    pub splits: Vec<Split>,
    /// The order's payments, ordered by payment sequence.
    pub payments: Vec<Payment>,
    /// The loyalty account used on the order, if any.
    pub loyalty: Option<LoyaltyInfo>,
}

impl Order {
    /// Iterates over every line item in every split, in split order then
    /// stored item order.
    pub fn line_items(&self) -> impl Iterator<Item = &LineItem> {
        self.splits.iter().flat_map(|s| s.line_items.iter())
    }

    /// Returns the post-discount value of all line items and modifiers
    /// across all splits. Taxes not included.
    pub fn subtotal(&self) -> Decimal {
        self.line_items().map(|item| item.subtotal()).sum()
    }

    /// Returns the sum of all payment amounts. Refunds contribute
    /// negative amounts.
    pub fn payment_total(&self) -> Decimal {
        self.payments.iter().map(|p| p.amount).sum()
    }

    /// Returns the sum of all payment tips.
    pub fn tip_total(&self) -> Decimal {
        self.payments.iter().map(|p| p.tip).sum()
    }
}

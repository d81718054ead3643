//! Line item, modifier, and discount models.
//!
//! These are the pro-ratable components of an order: a [`LineItem`] owns
//! zero-or-more [`Modifier`]s and zero-or-more [`Discount`]s, and each
//! modifier may itself carry discounts. Modifiers never nest beyond one
//! level.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Distinguishes a void from a discount.
///
/// The source export stores both in the same table; a void is a line item
/// written off entirely (e.g. a kitchen mistake), while a discount is a
/// partial reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// A voided item (full write-off).
    Void,
    /// A partial price reduction.
    Discount,
}

/// A flat dollar-amount discount applied to a line item or a modifier.
///
/// The attachment point determines how the amount is allocated during
/// proration: a discount attached to a modifier reduces only that
/// modifier, while a discount attached to a line item is distributed
/// across the item and all of its modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    /// The source identifier for this discount row.
    pub id: i64,
    /// Human-readable description of the discount.
    pub label: String,
    /// The discounted amount in dollars (positive).
    pub amount: Decimal,
    /// Whether this is a void or a discount.
    pub kind: DiscountKind,
    /// Whether the discounted amount remains taxable.
    pub taxable: bool,
    /// Whether the discount returns inventory to stock.
    pub returns_inventory: bool,
    /// The staff member who applied the discount.
    pub waiter_name: Option<String>,
    /// The staff member who authorized the discount, when approval was
    /// required.
    pub authorizer_name: Option<String>,
    /// When the discount was applied.
    pub applied_at: Option<NaiveDateTime>,
}

/// A sub-charge attached to a line item.
///
/// Structurally identical to a line item in the fields relevant to
/// proration: it has an amount and a sales category, and may carry its
/// own discounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    /// The source identifier for this modifier row.
    pub id: i64,
    /// The modifier name (including custom text).
    pub name: String,
    /// The modifier charge in dollars. Zero for free modifiers.
    pub amount: Decimal,
    /// The sales category this modifier's revenue is booked under.
    pub sales_category: String,
    /// Discounts attached directly to this modifier.
    pub discounts: Vec<Discount>,
}

impl Modifier {
    /// Returns the total of all discounts attached to this modifier.
    pub fn discount_total(&self) -> Decimal {
        self.discounts.iter().map(|d| d.amount).sum()
    }

    /// Returns the modifier amount minus its own discounts.
    ///
    /// This value is never floored at zero; a discount larger than the
    /// modifier amount produces a negative subtotal.
    pub fn subtotal(&self) -> Decimal {
        self.amount - self.discount_total()
    }
}

/// One ordered menu item occurrence within a split.
///
/// # Example
///
/// ```
/// use order_engine::models::LineItem;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let item = LineItem {
///     id: 58,
///     name: "Chicken Tenders".to_string(),
///     sales_category: "Food".to_string(),
///     unit_price: Decimal::from_str("15.00").unwrap(),
///     quantity: Decimal::ONE,
///     open_price: None,
///     course: Some(2),
///     was_sent: true,
///     sent_at: None,
///     waiter_name: Some("Dana".to_string()),
///     is_return: false,
///     exempt_tax1: false,
///     exempt_tax2: false,
///     exempt_tax3: false,
///     modifiers: vec![],
///     discounts: vec![],
/// };
/// assert_eq!(item.base_price(), Decimal::from_str("15.00").unwrap());
/// assert_eq!(item.subtotal(), Decimal::from_str("15.00").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// The source identifier for this order item row.
    pub id: i64,
    /// The menu item name.
    pub name: String,
    /// The sales category this item's revenue is booked under.
    pub sales_category: String,
    /// The menu unit price in dollars.
    pub unit_price: Decimal,
    /// The ordered quantity. Fractional quantities are allowed for
    /// weighed items.
    pub quantity: Decimal,
    /// An open (keyed-in) price that replaces the menu unit price when
    /// present.
    pub open_price: Option<Decimal>,
    /// The course index, when the venue uses coursing.
    pub course: Option<i32>,
    /// Whether the item was sent to the kitchen/bar.
    pub was_sent: bool,
    /// When the item was sent, if it was.
    pub sent_at: Option<NaiveDateTime>,
    /// The staff member who entered the item.
    pub waiter_name: Option<String>,
    /// Whether this line is a return (negative sale).
    pub is_return: bool,
    /// Whether the item is exempt from tax tier 1.
    pub exempt_tax1: bool,
    /// Whether the item is exempt from tax tier 2.
    pub exempt_tax2: bool,
    /// Whether the item is exempt from tax tier 3.
    pub exempt_tax3: bool,
    /// Modifiers attached to this item, in assembly order.
    pub modifiers: Vec<Modifier>,
    /// Discounts attached directly to this item, in assembly order.
    pub discounts: Vec<Discount>,
}

impl LineItem {
    /// Returns the price of this line before discounts and modifiers,
    /// taking quantity into account.
    ///
    /// An open price, when present, replaces the menu unit price.
    pub fn base_price(&self) -> Decimal {
        let unit = self.open_price.unwrap_or(self.unit_price);
        self.quantity * unit
    }

    /// Returns the total of all modifier amounts (before modifier
    /// discounts).
    pub fn modifier_total(&self) -> Decimal {
        self.modifiers.iter().map(|m| m.amount).sum()
    }

    /// Returns the combined pre-discount total for the item and its
    /// modifiers.
    ///
    /// This is the denominator `T` used when prorating an item-level
    /// discount across components.
    pub fn gross_total(&self) -> Decimal {
        self.base_price() + self.modifier_total()
    }

    /// Returns the total of all discounts attached anywhere on this line:
    /// directly to the item, or to any of its modifiers.
    pub fn discount_total(&self) -> Decimal {
        let own: Decimal = self.discounts.iter().map(|d| d.amount).sum();
        let on_modifiers: Decimal = self.modifiers.iter().map(|m| m.discount_total()).sum();
        own + on_modifiers
    }

    /// Returns the post-discount value of the whole line: base price plus
    /// modifiers, minus every attached discount. Tax not included.
    pub fn subtotal(&self) -> Decimal {
        self.gross_total() - self.discount_total()
    }
}

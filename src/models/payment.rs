//! Payment and loyalty models.
//!
//! Payments settle an [`Order`](super::Order) as a whole; splits share the
//! order's payment pool. Refunds are ordinary payments with negative
//! amounts and a reference back to the payment being refunded.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a payment was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Cash tendered at the register.
    Cash,
    /// Card or other electronic settlement.
    Electronic,
    /// Charged to a house customer account.
    CustomerAccount,
    /// Paid from a loyalty account balance.
    Loyalty,
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentType::Cash => write!(f, "Cash"),
            PaymentType::Electronic => write!(f, "Electronic"),
            PaymentType::CustomerAccount => write!(f, "Customer Account"),
            PaymentType::Loyalty => write!(f, "Loyalty"),
        }
    }
}

/// One settlement against an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// The source UUID for this payment.
    pub uuid: Uuid,
    /// Zero-based position of this payment within the order's payment
    /// pool. Ordering is externally observable (receipt layout).
    pub sequence: u32,
    /// How the payment was settled.
    pub payment_type: PaymentType,
    /// The settled amount in dollars. Refunds are negative.
    pub amount: Decimal,
    /// The tip amount in dollars.
    pub tip: Decimal,
    /// Change given back to the customer.
    pub change: Decimal,
    /// The portion of the payment still refundable.
    pub refundable_amount: Decimal,
    /// Card brand, for electronic payments.
    pub card_type: Option<String>,
    /// Authorization code, for electronic payments.
    pub auth_number: Option<String>,
    /// House account identifier, for customer-account payments.
    pub customer_account_id: Option<i64>,
    /// For refunds, the UUID of the original payment being refunded.
    pub original_payment_uuid: Option<Uuid>,
    /// When the payment occurred.
    pub paid_at: Option<NaiveDateTime>,
}

impl Payment {
    /// Returns the customer-facing payment number (1-based).
    pub fn number(&self) -> u32 {
        self.sequence + 1
    }

    /// Returns true if this payment is a refund against an earlier
    /// payment.
    pub fn is_refund(&self) -> bool {
        self.original_payment_uuid.is_some() || self.amount < Decimal::ZERO
    }
}

/// Loyalty account state captured on an order. At most one per order.
///
/// The engine treats loyalty strictly as a payment line; ledger
/// bookkeeping lives upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyInfo {
    /// The loyalty account name.
    pub account_name: Option<String>,
    /// The account's dollar credit balance after the order.
    pub credit_balance: Decimal,
    /// The account's point balance after the order.
    pub point_balance: Decimal,
    /// Points earned on this order.
    pub points_earned: Decimal,
    /// Points spent on this order.
    pub points_used: Decimal,
    /// Points refunded on this order.
    pub points_refunded: Decimal,
}

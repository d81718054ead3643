//! Core data models for the Order Reconstruction Engine.
//!
//! This module contains the reconstructed order hierarchy: orders own
//! splits, splits own line items, line items own modifiers and discounts,
//! and orders own payments and an optional loyalty reference.

mod line_item;
mod order;
mod payment;

pub use line_item::{Discount, DiscountKind, LineItem, Modifier};
pub use order::{Order, OrderType, Split, TaxSettings};
pub use payment::{LoyaltyInfo, Payment, PaymentType};

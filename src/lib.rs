//! Order Reconstruction and Financial Proration Engine
//!
//! This crate reconstructs restaurant point-of-sale orders from a normalized
//! relational export and computes their financial breakdown: business-day
//! resolution, order assembly from flat rows, discount proration across
//! sales categories, three-tier tax, and report aggregation.

#![warn(missing_docs)]

pub mod assembly;
pub mod business_day;
pub mod config;
pub mod error;
pub mod models;
pub mod proration;
pub mod reporting;
pub mod rows;
pub mod tax;

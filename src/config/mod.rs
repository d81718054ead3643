//! Configuration loading and management for the Order Reconstruction Engine.
//!
//! This module provides functionality to load venue configuration from YAML
//! files: the business-day boundary, proration strictness, and tax tier
//! labels.
//!
//! # Example
//!
//! ```no_run
//! use order_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded venue: {}", config.venue().venue_name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{TaxLabels, VenueConfig};

//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading venue
//! configuration from YAML files.

use chrono::NaiveTime;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::VenueConfig;

/// Loads and provides access to venue configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/default/
/// └── venue.yaml    # Venue settings
/// ```
///
/// # Example
///
/// ```no_run
/// use order_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Venue: {}", loader.venue().venue_name);
/// println!("Day boundary: {}", loader.day_boundary());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    venue: VenueConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/default")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The venue file is missing
    /// - The file contains invalid YAML
    /// - A required field is missing from the configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use order_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/default")?;
    /// # Ok::<(), order_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let venue_path = path.join("venue.yaml");
        let venue = Self::load_yaml::<VenueConfig>(&venue_path)?;

        Ok(Self { venue })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the venue configuration.
    pub fn venue(&self) -> &VenueConfig {
        &self.venue
    }

    /// Returns the venue's business-day boundary time.
    pub fn day_boundary(&self) -> NaiveTime {
        self.venue.day_boundary
    }

    /// Whether the venue rejects un-proratable discounts instead of
    /// falling back.
    pub fn strict_proration(&self) -> bool {
        self.venue.strict_proration
    }
}

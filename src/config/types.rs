//! Configuration type definitions.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::business_day::default_day_boundary;
use crate::error::EngineResult;
use crate::models::LineItem;
use crate::proration::{prorate, prorate_strict, CategoryAmounts};

/// Display labels for the three tax tiers, as they appear on receipts
/// and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxLabels {
    /// Label for tax tier 1 (e.g. "GST").
    pub tax1: String,
    /// Label for tax tier 2 (e.g. "PST").
    pub tax2: String,
    /// Label for tax tier 3 (e.g. "Liquor Tax").
    pub tax3: String,
}

impl Default for TaxLabels {
    fn default() -> Self {
        TaxLabels {
            tax1: "Tax 1".to_string(),
            tax2: "Tax 2".to_string(),
            tax3: "Tax 3".to_string(),
        }
    }
}

/// Per-venue settings that shape reconstruction and reporting.
///
/// # Example
///
/// ```
/// use order_engine::config::VenueConfig;
///
/// let yaml = r#"
/// venue_name: "Harbour Bistro"
/// day_boundary: "04:00:00"
/// strict_proration: true
/// "#;
/// let config: VenueConfig = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(config.venue_name, "Harbour Bistro");
/// assert!(config.strict_proration);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueConfig {
    /// The venue's display name.
    pub venue_name: String,
    /// The time of day at which one business day ends and the next
    /// begins. Defaults to 02:00:00.
    #[serde(default = "default_day_boundary")]
    pub day_boundary: NaiveTime,
    /// When true, a zero-value item carrying a discount is an error
    /// instead of falling back to the item's own category.
    #[serde(default)]
    pub strict_proration: bool,
    /// Receipt labels for the tax tiers.
    #[serde(default)]
    pub tax_labels: TaxLabels,
}

impl VenueConfig {
    /// Prorates a line item under this venue's proration policy.
    ///
    /// # Errors
    ///
    /// In strict mode, returns the error described on
    /// [`prorate_strict`]; otherwise this never fails.
    pub fn prorate_item(&self, item: &LineItem) -> EngineResult<CategoryAmounts> {
        if self.strict_proration {
            prorate_strict(item)
        } else {
            Ok(prorate(item))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_for_omitted_fields() {
        let config: VenueConfig =
            serde_yaml::from_str("venue_name: \"Corner Cafe\"").unwrap();
        assert_eq!(config.day_boundary, default_day_boundary());
        assert!(!config.strict_proration);
        assert_eq!(config.tax_labels.tax1, "Tax 1");
    }

    #[test]
    fn test_round_trips_through_yaml() {
        let config = VenueConfig {
            venue_name: "Harbour Bistro".to_string(),
            day_boundary: NaiveTime::from_hms_opt(4, 0, 0).unwrap(),
            strict_proration: true,
            tax_labels: TaxLabels::default(),
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: VenueConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, back);
    }
}

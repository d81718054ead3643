//! Error types for the Order Reconstruction Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during order reconstruction,
//! proration, and reporting.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the Order Reconstruction Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use order_engine::error::EngineError;
/// use chrono::NaiveDate;
///
/// let error = EngineError::InvalidRange {
///     earliest: NaiveDate::from_ymd_opt(2020, 6, 2).unwrap(),
///     latest: NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Invalid date range: latest date 2020-06-01 is before earliest date 2020-06-02"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested report date range is inverted.
    ///
    /// Rejected before any row fetching takes place.
    #[error("Invalid date range: latest date {latest} is before earliest date {earliest}")]
    InvalidRange {
        /// The start of the requested range.
        earliest: NaiveDate,
        /// The end of the requested range.
        latest: NaiveDate,
    },

    /// A child row references a parent identifier that is absent from the
    /// supplied row set.
    ///
    /// This signals a data-consistency problem in the source export, not a
    /// programming error, and is surfaced with both identifiers rather
    /// than silently dropping the row.
    #[error("Orphaned {child_kind} row {child_id}: {parent_kind} {parent_id} not in row set")]
    OrphanRow {
        /// The kind of the orphaned child row (e.g. "modifier").
        child_kind: &'static str,
        /// The identifier of the orphaned child row.
        child_id: String,
        /// The kind of the missing parent (e.g. "line item").
        parent_kind: &'static str,
        /// The identifier the child referenced but which was not supplied.
        parent_id: String,
    },

    /// A row was structurally invalid (e.g. a discount naming both an item
    /// and a modifier as its parent, or neither).
    #[error("Invalid {kind} row {id}: {message}")]
    InvalidRow {
        /// The kind of row that failed validation.
        kind: &'static str,
        /// The identifier of the invalid row.
        id: String,
        /// A description of what made the row invalid.
        message: String,
    },

    /// Proration was requested in strict mode for a line item whose
    /// combined pre-discount total is zero.
    ///
    /// A proportional split is undefined when there is nothing to prorate
    /// over; non-strict callers get the documented fallback instead.
    #[error("Proration undefined for line item {item_id}: pre-discount total is zero")]
    ProrationUndefined {
        /// The identifier of the degenerate line item.
        item_id: i64,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

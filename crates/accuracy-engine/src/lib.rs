//! Redaction accuracy comparison engine
//!
//! Compares two attribute trees for one document, expected (ground truth)
//! vs. found (automatically produced), and classifies every found
//! redaction against every expected sensitive region by area overlap.
//! The result is a per-page list of accuracy details, reducible to
//! per-attribute-type reporting rows via [`aggregate`].
//!
//! Pipeline: [`selector`] -> [`overlap`] matrix -> [`classifier`] ->
//! [`aggregate`]. The engine is purely in-memory and single-threaded per
//! invocation; feeding it documents and persisting its output belong to
//! the callers on either side.

pub mod aggregate;
pub mod classifier;
pub mod error;
pub mod overlap;
pub mod selector;

use serde::{Deserialize, Serialize};
use shared_attributes::{AccuracyReport, Attribute};
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub use error::AccuracyError;
pub use overlap::{MatchInfo, MatchMatrix, OVERLAP_EPSILON};

/// Tunable decision thresholds, all in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum share of an expected region's area a found redaction must
    /// cover to count as an adequate match
    pub overlap_leniency_percent: f64,
    /// Excess redaction area percentage at or above which an adequately
    /// covering found redaction is additionally flagged as over-redacted
    pub over_redaction_erap: f64,
    /// Relative-area share a single zone pair must reach before any
    /// overlap between two attributes is credited at all
    pub overlap_minimum_percent: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            overlap_leniency_percent: 80.0,
            over_redaction_erap: 30.0,
            overlap_minimum_percent: 10.0,
        }
    }
}

/// AccuracyEngine entry point
pub struct AccuracyEngine {
    thresholds: Thresholds,
}

impl AccuracyEngine {
    pub fn new() -> Self {
        Self {
            thresholds: Thresholds::default(),
        }
    }

    pub fn with_thresholds(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Compare one document's expected tree against its found tree.
    ///
    /// `query` selects the attributes to compare from both trees (see
    /// [`selector::select`]) and must be non-empty. Both trees are
    /// read-only; the call owns no state beyond its own stack.
    pub fn compare(
        &self,
        expected: &Attribute,
        found: &Attribute,
        query: &str,
    ) -> Result<AccuracyReport, AccuracyError> {
        self.compare_inner(expected, found, query, None)
    }

    /// Like [`compare`](Self::compare), checking `cancel` at each outer
    /// loop iteration so a caller batching many documents can abort
    /// mid-document. A cancelled comparison returns
    /// [`AccuracyError::Cancelled`] and its partial results are discarded.
    pub fn compare_with_cancel(
        &self,
        expected: &Attribute,
        found: &Attribute,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<AccuracyReport, AccuracyError> {
        self.compare_inner(expected, found, query, Some(cancel))
    }

    fn compare_inner(
        &self,
        expected: &Attribute,
        found: &Attribute,
        query: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<AccuracyReport, AccuracyError> {
        let expected_items = selector::select(expected, query)?;
        let found_items = selector::select(found, query)?;
        debug!(
            expected = expected_items.len(),
            found = found_items.len(),
            "comparing selected attributes"
        );

        let details_by_page =
            classifier::classify(&expected_items, &found_items, &self.thresholds, cancel)?;
        debug!(pages = details_by_page.len(), "comparison complete");

        Ok(AccuracyReport {
            details_by_page,
            compared_at: chrono::Utc::now().timestamp() as u64,
        })
    }
}

impl Default for AccuracyEngine {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn check_cancelled(cancel: Option<&CancellationToken>) -> Result<(), AccuracyError> {
    match cancel {
        Some(token) if token.is_cancelled() => Err(AccuracyError::Cancelled),
        _ => Ok(()),
    }
}

//! Accuracy count aggregation
//!
//! A pure reduction from classified details to one row of counts per
//! attribute-type label. The persistence collaborator upserts these rows
//! into its reporting store; nothing here branches on geometry.

use std::collections::BTreeMap;

use shared_attributes::{AccuracyDetail, AccuracyReport, OutcomeLabel, PathCounts};

/// Reduce a whole report to per-type-label rows, sorted by label
pub fn counts_by_type(report: &AccuracyReport) -> Vec<PathCounts> {
    counts_from_details(report.details())
}

/// Reduce any collection of details to per-type-label rows, sorted by label
pub fn counts_from_details<'a>(
    details: impl IntoIterator<Item = &'a AccuracyDetail>,
) -> Vec<PathCounts> {
    let mut rows: BTreeMap<String, PathCounts> = BTreeMap::new();

    for detail in details {
        let row = rows
            .entry(detail.type_path.clone())
            .or_insert_with(|| PathCounts::new(detail.type_path.clone()));
        let count = u64::from(detail.count);
        match detail.label {
            OutcomeLabel::Expected => row.expected += count,
            OutcomeLabel::Found => row.found += count,
            OutcomeLabel::Correct => row.correct += count,
            OutcomeLabel::Missed => row.missed += count,
            OutcomeLabel::FalsePositive => row.false_positives += count,
            OutcomeLabel::OverRedacted => row.over_redacted += count,
            OutcomeLabel::UnderRedacted => row.under_redacted += count,
        }
    }

    rows.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detail(label: OutcomeLabel, type_path: &str) -> AccuracyDetail {
        AccuracyDetail {
            label,
            type_path: type_path.to_string(),
            count: 1,
        }
    }

    #[test]
    fn test_counts_grouped_by_type_label() {
        let details = vec![
            detail(OutcomeLabel::Expected, "SSN"),
            detail(OutcomeLabel::Found, "SSN"),
            detail(OutcomeLabel::Correct, "SSN"),
            detail(OutcomeLabel::Expected, "DOB"),
            detail(OutcomeLabel::Missed, "DOB"),
            detail(OutcomeLabel::Expected, "SSN"),
            detail(OutcomeLabel::UnderRedacted, "SSN"),
        ];

        let rows = counts_from_details(&details);

        assert_eq!(rows.len(), 2);
        // BTreeMap ordering: DOB before SSN
        assert_eq!(rows[0].type_path, "DOB");
        assert_eq!(rows[0].expected, 1);
        assert_eq!(rows[0].missed, 1);
        assert_eq!(rows[1].type_path, "SSN");
        assert_eq!(rows[1].expected, 2);
        assert_eq!(rows[1].found, 1);
        assert_eq!(rows[1].correct, 1);
        assert_eq!(rows[1].under_redacted, 1);
    }

    #[test]
    fn test_placeholder_detail_yields_all_zero_row() {
        let placeholder = AccuracyDetail {
            label: OutcomeLabel::Expected,
            type_path: String::new(),
            count: 0,
        };

        let rows = counts_from_details(std::iter::once(&placeholder));

        assert_eq!(rows, vec![PathCounts::new("")]);
    }

    #[test]
    fn test_empty_details_yield_no_rows() {
        let rows = counts_from_details(std::iter::empty());
        assert!(rows.is_empty());
    }
}

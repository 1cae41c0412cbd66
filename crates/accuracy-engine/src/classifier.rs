//! Outcome classification
//!
//! Two passes over the pairwise overlap matrix assign every expected and
//! found item its outcome details:
//!
//! 1. Per expected item: the first found item that adequately covers it
//!    wins `Correct`; inadequate covers emit `UnderRedacted` per match;
//!    an adequately covering found item is checked for over-redaction at
//!    most once; no adequate cover means `Missed`.
//! 2. Per found item: anything that never overlapped any expected item is
//!    a `FalsePositive`.
//!
//! Details land on the page of the relevant attribute's first zone, or
//! page 0 for non-spatial attributes.

use std::collections::BTreeMap;

use shared_attributes::{AccuracyDetail, Attribute, OutcomeLabel};
use tokio_util::sync::CancellationToken;

use crate::overlap::{self, OVERLAP_EPSILON};
use crate::{check_cancelled, AccuracyError, Thresholds};

/// Classify two selected attribute lists into per-page accuracy details.
///
/// Every expected item contributes exactly one `Expected` detail and one
/// of `Correct`/`Missed`; every found item contributes exactly one `Found`
/// detail. When both lists are empty the result is the single placeholder
/// `{Expected, "", 0}` on page 1, so the document still contributes a row
/// to per-page statistics.
pub fn classify(
    expected: &[&Attribute],
    found: &[&Attribute],
    thresholds: &Thresholds,
    cancel: Option<&CancellationToken>,
) -> Result<BTreeMap<u32, Vec<AccuracyDetail>>, AccuracyError> {
    let mut details: Vec<(u32, AccuracyDetail)> = Vec::new();

    // Degenerate cases are decided before any matrix is built
    if expected.is_empty() && found.is_empty() {
        details.push((
            1,
            AccuracyDetail {
                label: OutcomeLabel::Expected,
                type_path: String::new(),
                count: 0,
            },
        ));
        return Ok(group_by_page(details));
    }

    if found.is_empty() {
        for item in expected {
            emit(&mut details, item, OutcomeLabel::Expected);
            emit(&mut details, item, OutcomeLabel::Missed);
        }
        return Ok(group_by_page(details));
    }

    if expected.is_empty() {
        for item in found {
            emit(&mut details, item, OutcomeLabel::Found);
            emit(&mut details, item, OutcomeLabel::FalsePositive);
        }
        return Ok(group_by_page(details));
    }

    let matrix = overlap::build_matrix(expected, found, thresholds, cancel)?;

    for item in expected {
        emit(&mut details, item, OutcomeLabel::Expected);
    }
    for item in found {
        emit(&mut details, item, OutcomeLabel::Found);
    }

    let mut overlapped = vec![false; found.len()];
    let mut erap_checked = vec![false; found.len()];

    for (i, expected_item) in expected.iter().enumerate() {
        check_cancelled(cancel)?;

        let mut found_correct_this_expected = false;
        for (j, found_item) in found.iter().enumerate() {
            let cell = matrix.get(i, j);
            if cell.area_of_overlap == 0.0 {
                continue;
            }
            overlapped[j] = true;

            let covered_percent = 100.0 * cell.area_of_overlap / cell.area_of_expected;
            if covered_percent < thresholds.overlap_leniency_percent {
                // Every inadequate cover is reported, even several times
                // for the same found item against different expecteds
                emit(&mut details, found_item, OutcomeLabel::UnderRedacted);
                continue;
            }

            if !found_correct_this_expected {
                // Only the first adequate cover counts as the detection
                emit(&mut details, expected_item, OutcomeLabel::Correct);
                found_correct_this_expected = true;
            }

            if !erap_checked[j] {
                let total_overlap = matrix.total_overlap_for_found(j);
                // Signed: a found item undershooting the regions it
                // covers never registers as over-redacted
                if cell.area_of_found > OVERLAP_EPSILON {
                    let erap =
                        100.0 * (cell.area_of_found - total_overlap) / cell.area_of_found;
                    if erap >= thresholds.over_redaction_erap {
                        emit(&mut details, found_item, OutcomeLabel::OverRedacted);
                    }
                }
                erap_checked[j] = true;
            }
        }

        if !found_correct_this_expected {
            emit(&mut details, expected_item, OutcomeLabel::Missed);
        }
    }

    check_cancelled(cancel)?;
    for (j, found_item) in found.iter().enumerate() {
        if !overlapped[j] {
            emit(&mut details, found_item, OutcomeLabel::FalsePositive);
        }
    }

    Ok(group_by_page(details))
}

fn emit(details: &mut Vec<(u32, AccuracyDetail)>, attribute: &Attribute, label: OutcomeLabel) {
    details.push((
        attribute.first_page().unwrap_or(0),
        AccuracyDetail {
            label,
            type_path: attribute.type_label.clone(),
            count: 1,
        },
    ));
}

fn group_by_page(details: Vec<(u32, AccuracyDetail)>) -> BTreeMap<u32, Vec<AccuracyDetail>> {
    let mut by_page: BTreeMap<u32, Vec<AccuracyDetail>> = BTreeMap::new();
    for (page, detail) in details {
        by_page.entry(page).or_default().push(detail);
    }
    by_page
}

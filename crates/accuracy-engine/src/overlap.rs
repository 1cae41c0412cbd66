//! Pairwise geometry matching
//!
//! Builds the expected x found matrix of area figures the classifier
//! works from. Overlap for a pair of attributes is all-or-nothing: the
//! summed intersection over all same-page zone pairs is credited only if
//! at least one single zone pair crosses the minimum-overlap gate, and is
//! exactly `0.0` otherwise.

use shared_attributes::Attribute;
use tokio_util::sync::CancellationToken;

use crate::error::AccuracyError;
use crate::{check_cancelled, Thresholds};

/// Overlaps at or below this are treated as numeric noise
pub const OVERLAP_EPSILON: f64 = 1e-8;

/// Area figures for one expected x found pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchInfo {
    /// Sum of the expected attribute's zone areas; 0 when non-spatial
    pub area_of_expected: f64,
    /// Sum of the found attribute's zone areas; 0 when non-spatial
    pub area_of_found: f64,
    /// Full summed overlap for the pair, or exactly 0.0 when no zone pair
    /// crossed the minimum-overlap gate; never a partial value
    pub area_of_overlap: f64,
}

/// Dense expected x found matrix of [`MatchInfo`]
#[derive(Debug, Clone, PartialEq)]
pub struct MatchMatrix {
    cells: Vec<MatchInfo>,
    expected_len: usize,
    found_len: usize,
}

impl MatchMatrix {
    pub fn expected_len(&self) -> usize {
        self.expected_len
    }

    pub fn found_len(&self) -> usize {
        self.found_len
    }

    pub fn get(&self, expected: usize, found: usize) -> &MatchInfo {
        &self.cells[expected * self.found_len + found]
    }

    /// Total overlap credited to one found item across every expected item
    pub fn total_overlap_for_found(&self, found: usize) -> f64 {
        (0..self.expected_len)
            .map(|expected| self.get(expected, found).area_of_overlap)
            .sum()
    }
}

/// Build the full pairwise matrix for two selected attribute lists.
///
/// Checks `cancel` once per expected item. Fails with
/// [`AccuracyError::Geometry`] if any zone carries a non-finite area.
pub fn build_matrix(
    expected: &[&Attribute],
    found: &[&Attribute],
    thresholds: &Thresholds,
    cancel: Option<&CancellationToken>,
) -> Result<MatchMatrix, AccuracyError> {
    let expected_areas = validated_areas(expected)?;
    let found_areas = validated_areas(found)?;

    let mut cells = Vec::with_capacity(expected.len() * found.len());
    for (i, expected_item) in expected.iter().enumerate() {
        check_cancelled(cancel)?;
        for (j, found_item) in found.iter().enumerate() {
            let area_of_overlap = if expected_item.is_spatial() && found_item.is_spatial() {
                pair_overlap(expected_item, found_item, thresholds.overlap_minimum_percent)
            } else {
                0.0
            };
            cells.push(MatchInfo {
                area_of_expected: expected_areas[i],
                area_of_found: found_areas[j],
                area_of_overlap,
            });
        }
    }

    Ok(MatchMatrix {
        cells,
        expected_len: expected.len(),
        found_len: found.len(),
    })
}

fn validated_areas(items: &[&Attribute]) -> Result<Vec<f64>, AccuracyError> {
    items
        .iter()
        .map(|item| {
            for zone in &item.value.zones {
                if !zone.area.is_finite() {
                    return Err(AccuracyError::Geometry(format!(
                        "non-finite zone area for attribute {:?} on page {}",
                        item.name, zone.page_number
                    )));
                }
            }
            Ok(item.value.total_area())
        })
        .collect()
}

fn pair_overlap(expected: &Attribute, found: &Attribute, minimum_percent: f64) -> f64 {
    let mut total_overlap = 0.0;
    let mut qualifies = false;

    for expected_zone in &expected.value.zones {
        for found_zone in &found.value.zones {
            let overlap = expected_zone.intersection_area(found_zone);
            if overlap <= OVERLAP_EPSILON {
                continue;
            }
            total_overlap += overlap;

            let smaller = expected_zone.area.min(found_zone.area);
            if smaller > OVERLAP_EPSILON && overlap / smaller * 100.0 >= minimum_percent {
                qualifies = true;
            }
        }
    }

    if qualifies {
        total_overlap
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_attributes::{RasterZone, SpatialText};

    fn spatial(zones: Vec<RasterZone>) -> Attribute {
        Attribute::new("HCData", SpatialText::spatial("x", zones))
    }

    fn matrix(expected: &[&Attribute], found: &[&Attribute]) -> MatchMatrix {
        build_matrix(expected, found, &Thresholds::default(), None).unwrap()
    }

    #[test]
    fn test_non_spatial_side_yields_zero_overlap() {
        let expected = Attribute::new("HCData", SpatialText::non_spatial("text only"));
        let found = spatial(vec![RasterZone::from_bounds(1, 0, 0, 100, 100)]);

        let m = matrix(&[&expected], &[&found]);
        let cell = m.get(0, 0);
        assert_eq!(cell.area_of_expected, 0.0);
        assert_eq!(cell.area_of_found, 10000.0);
        assert_eq!(cell.area_of_overlap, 0.0);
    }

    #[test]
    fn test_full_overlap_credits_whole_area() {
        let expected = spatial(vec![RasterZone::from_bounds(1, 0, 0, 100, 100)]);
        let found = spatial(vec![RasterZone::from_bounds(1, 0, 0, 100, 100)]);

        let m = matrix(&[&expected], &[&found]);
        assert_eq!(m.get(0, 0).area_of_overlap, 10000.0);
    }

    #[test]
    fn test_zones_on_different_pages_never_overlap() {
        let expected = spatial(vec![RasterZone::from_bounds(1, 0, 0, 100, 100)]);
        let found = spatial(vec![RasterZone::from_bounds(2, 0, 0, 100, 100)]);

        let m = matrix(&[&expected], &[&found]);
        assert_eq!(m.get(0, 0).area_of_overlap, 0.0);
    }

    #[test]
    fn test_negligible_touch_reports_exactly_zero() {
        // 2% of the smaller zone's area, under the 10% gate
        let expected = spatial(vec![RasterZone::from_bounds(1, 0, 0, 100, 100)]);
        let found = spatial(vec![RasterZone::from_bounds(1, 98, 0, 198, 100)]);

        let m = matrix(&[&expected], &[&found]);
        assert_eq!(m.get(0, 0).area_of_overlap, 0.0);
    }

    #[test]
    fn test_qualifying_pair_unlocks_full_summed_overlap() {
        // First zone pair crosses the gate; the second is a sliver that
        // would not qualify on its own but is still included in the sum
        let expected = spatial(vec![
            RasterZone::from_bounds(1, 0, 0, 100, 100),
            RasterZone::from_bounds(1, 200, 0, 300, 100),
        ]);
        let found = spatial(vec![
            RasterZone::from_bounds(1, 0, 0, 100, 100),
            RasterZone::from_bounds(1, 298, 0, 398, 100),
        ]);

        let m = matrix(&[&expected], &[&found]);
        assert_eq!(m.get(0, 0).area_of_overlap, 10000.0 + 200.0);
    }

    #[test]
    fn test_matrix_is_idempotent() {
        let expected = spatial(vec![RasterZone::from_bounds(1, 10, 10, 90, 90)]);
        let found = spatial(vec![
            RasterZone::from_bounds(1, 0, 0, 50, 50),
            RasterZone::from_bounds(1, 40, 40, 120, 120),
        ]);

        let first = matrix(&[&expected], &[&found]);
        let second = matrix(&[&expected], &[&found]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_total_overlap_for_found_sums_column() {
        let e1 = spatial(vec![RasterZone::from_bounds(1, 0, 0, 10, 100)]);
        let e2 = spatial(vec![RasterZone::from_bounds(1, 50, 0, 60, 100)]);
        let found = spatial(vec![RasterZone::from_bounds(1, 0, 0, 100, 100)]);

        let m = matrix(&[&e1, &e2], &[&found]);
        assert_eq!(m.total_overlap_for_found(0), 2000.0);
    }

    #[test]
    fn test_non_finite_zone_area_is_a_geometry_error() {
        let mut zone = RasterZone::from_bounds(1, 0, 0, 100, 100);
        zone.area = f64::NAN;
        let expected = spatial(vec![zone]);
        let found = spatial(vec![RasterZone::from_bounds(1, 0, 0, 100, 100)]);

        let result = build_matrix(&[&expected], &[&found], &Thresholds::default(), None);
        assert!(matches!(result, Err(AccuracyError::Geometry(_))));
    }

    #[test]
    fn test_cancel_aborts_matrix_build() {
        let expected = spatial(vec![RasterZone::from_bounds(1, 0, 0, 100, 100)]);
        let found = spatial(vec![RasterZone::from_bounds(1, 0, 0, 100, 100)]);

        let token = CancellationToken::new();
        token.cancel();

        let result = build_matrix(&[&expected], &[&found], &Thresholds::default(), Some(&token));
        assert!(matches!(result, Err(AccuracyError::Cancelled)));
    }
}

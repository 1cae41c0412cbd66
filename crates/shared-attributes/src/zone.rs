//! Raster zone geometry
//!
//! A raster zone is one rectangular region of an attribute's value on a
//! single page. Zones carry a precomputed `area` (treated as authoritative
//! by consumers) and a skew baseline running through the rectangle.

use serde::{Deserialize, Serialize};

/// One endpoint of a zone's skew baseline, in page-relative units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonePoint {
    pub x: i32,
    pub y: i32,
}

/// One rectangular spatial region on one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterZone {
    /// 1-based page number
    pub page_number: u32,
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
    /// Baseline start, typically the mid-left of the rectangle
    pub start_point: ZonePoint,
    /// Baseline end, typically the mid-right of the rectangle
    pub end_point: ZonePoint,
    /// Precomputed scalar area of the zone
    pub area: f64,
}

impl RasterZone {
    /// Build an axis-aligned zone from rectangular bounds.
    ///
    /// The baseline is derived as the horizontal midline and `area` as
    /// `width * height`. Callers with skewed input supply their own
    /// baseline and area via a struct literal instead.
    pub fn from_bounds(page_number: u32, top: i32, left: i32, bottom: i32, right: i32) -> Self {
        let mid = (top + bottom) / 2;
        Self {
            page_number,
            top,
            left,
            bottom,
            right,
            start_point: ZonePoint { x: left, y: mid },
            end_point: ZonePoint { x: right, y: mid },
            area: f64::from(bottom - top) * f64::from(right - left),
        }
    }

    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    /// Area of the geometric intersection of the two zones' bounds.
    ///
    /// Zones on different pages never intersect. Returns `0.0` when the
    /// rectangles are disjoint or touch only along an edge.
    pub fn intersection_area(&self, other: &RasterZone) -> f64 {
        if self.page_number != other.page_number {
            return 0.0;
        }

        let width = self.right.min(other.right) - self.left.max(other.left);
        let height = self.bottom.min(other.bottom) - self.top.max(other.top);

        if width <= 0 || height <= 0 {
            0.0
        } else {
            f64::from(width) * f64::from(height)
        }
    }
}

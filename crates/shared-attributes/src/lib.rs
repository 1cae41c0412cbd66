pub mod types;
pub mod zone;

pub use types::{
    AccuracyDetail, AccuracyReport, Attribute, OutcomeLabel, PathCounts, SpatialText,
};
pub use zone::{RasterZone, ZonePoint};

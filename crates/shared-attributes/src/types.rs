use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::zone::RasterZone;

/// An attribute's value: text plus zero or more raster zones.
///
/// An attribute with no zones is non-spatial; it can never overlap anything
/// during comparison.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpatialText {
    pub text: String,
    pub zones: Vec<RasterZone>,
}

impl SpatialText {
    pub fn non_spatial(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            zones: Vec::new(),
        }
    }

    pub fn spatial(text: impl Into<String>, zones: Vec<RasterZone>) -> Self {
        Self {
            text: text.into(),
            zones,
        }
    }

    pub fn is_spatial(&self) -> bool {
        !self.zones.is_empty()
    }

    /// Page number of the first zone, in input order
    pub fn first_page(&self) -> Option<u32> {
        self.zones.first().map(|z| z.page_number)
    }

    /// Sum of the zones' precomputed areas
    pub fn total_area(&self) -> f64 {
        self.zones.iter().map(|z| z.area).sum()
    }
}

/// A named, typed, optionally-spatial extracted field.
///
/// Attributes form a tree via `sub_attributes`; trees are built fresh per
/// comparison run and never mutated by the engine. `type_label` may be a
/// `+`-delimited composite of several type tags; the empty string means
/// "untyped".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default)]
    pub type_label: String,
    pub value: SpatialText,
    #[serde(default)]
    pub sub_attributes: Vec<Attribute>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: SpatialText) -> Self {
        Self {
            name: name.into(),
            type_label: String::new(),
            value,
            sub_attributes: Vec::new(),
        }
    }

    pub fn typed(name: impl Into<String>, type_label: impl Into<String>, value: SpatialText) -> Self {
        Self {
            name: name.into(),
            type_label: type_label.into(),
            value,
            sub_attributes: Vec::new(),
        }
    }

    /// A valueless grouping node, e.g. a document root holding the
    /// top-level attributes of one attribute set
    pub fn container(name: impl Into<String>) -> Self {
        Self::new(name, SpatialText::default())
    }

    pub fn with_child(mut self, child: Attribute) -> Self {
        self.sub_attributes.push(child);
        self
    }

    pub fn is_spatial(&self) -> bool {
        self.value.is_spatial()
    }

    pub fn first_page(&self) -> Option<u32> {
        self.value.first_page()
    }
}

/// Outcome category assigned to a single detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeLabel {
    Expected,
    Found,
    Correct,
    Missed,
    FalsePositive,
    OverRedacted,
    UnderRedacted,
}

/// One classified detection: an outcome label, the attribute-type label it
/// belongs to, and a count (always 1 except the empty-file placeholder)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyDetail {
    pub label: OutcomeLabel,
    pub type_path: String,
    pub count: u32,
}

/// Result of comparing one document's expected tree against its found tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    /// Classified details grouped by page number; page 0 holds details for
    /// attributes with no spatial info
    pub details_by_page: BTreeMap<u32, Vec<AccuracyDetail>>,
    pub compared_at: u64,
}

impl AccuracyReport {
    /// Flat iteration over every detail in page order
    pub fn details(&self) -> impl Iterator<Item = &AccuracyDetail> {
        self.details_by_page.values().flatten()
    }
}

/// Aggregated accuracy counts for one attribute-type label
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathCounts {
    pub type_path: String,
    pub expected: u64,
    pub found: u64,
    pub correct: u64,
    pub missed: u64,
    pub false_positives: u64,
    pub over_redacted: u64,
    pub under_redacted: u64,
}

impl PathCounts {
    pub fn new(type_path: impl Into<String>) -> Self {
        Self {
            type_path: type_path.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_page_follows_zone_order() {
        let value = SpatialText::spatial(
            "123-45-6789",
            vec![
                RasterZone::from_bounds(3, 0, 0, 10, 10),
                RasterZone::from_bounds(1, 0, 0, 10, 10),
            ],
        );
        let attr = Attribute::new("SSN", value);
        assert_eq!(attr.first_page(), Some(3));
    }

    #[test]
    fn test_non_spatial_attribute_has_no_page() {
        let attr = Attribute::new("Notes", SpatialText::non_spatial("free text"));
        assert!(!attr.is_spatial());
        assert_eq!(attr.first_page(), None);
    }

    #[test]
    fn test_total_area_sums_zone_areas() {
        let value = SpatialText::spatial(
            "x",
            vec![
                RasterZone::from_bounds(1, 0, 0, 10, 10),
                RasterZone::from_bounds(2, 0, 0, 20, 20),
            ],
        );
        assert_eq!(value.total_area(), 500.0);
    }

    #[test]
    fn test_attribute_deserializes_without_optional_fields() {
        let json = r#"{"name":"SSN","value":{"text":"123-45-6789","zones":[]}}"#;
        let attr: Attribute = serde_json::from_str(json).unwrap();
        assert_eq!(attr.type_label, "");
        assert!(attr.sub_attributes.is_empty());
    }

    #[test]
    fn test_path_counts_serializes_camel_case() {
        let row = PathCounts {
            expected: 2,
            false_positives: 1,
            ..PathCounts::new("HCData")
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["typePath"], "HCData");
        assert_eq!(json["falsePositives"], 1);
    }
}

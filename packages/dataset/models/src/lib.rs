#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Vector dataset record and collection types.
//!
//! A [`Dataset`] is an ordered sequence of [`Record`]s loaded from a
//! vector file. Record order is file order and is semantically
//! meaningful: a record's identity is its index within its dataset, and
//! the value-mode resampler restores that order in its output.

use std::collections::BTreeMap;

use geo::{BoundingRect, Geometry, Rect};

/// A single vector feature: a geometry plus its numeric attributes.
///
/// Records are immutable once loaded. The resampling engine keeps bin
/// annotations in auxiliary structures, never on the record itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Attribute name -> numeric value.
    pub attributes: BTreeMap<String, f64>,
    /// Point or polygon geometry in dataset coordinates.
    pub geometry: Geometry<f64>,
}

impl Record {
    /// Creates a record from a geometry and its attribute map.
    #[must_use]
    pub const fn new(geometry: Geometry<f64>, attributes: BTreeMap<String, f64>) -> Self {
        Self {
            attributes,
            geometry,
        }
    }

    /// Returns the value of the named attribute, if present.
    #[must_use]
    pub fn attribute(&self, field: &str) -> Option<f64> {
        self.attributes.get(field).copied()
    }

    /// Axis-aligned bounding rectangle of the geometry.
    ///
    /// `None` for degenerate geometries with no extent (e.g. an empty
    /// multi-part geometry).
    #[must_use]
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.geometry.bounding_rect()
    }
}

/// An ordered collection of records.
///
/// The collection is append-only at load time and never mutated by the
/// resampling engine; sampling produces a fresh `Dataset` of cloned rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Wraps an ordered sequence of records.
    #[must_use]
    pub const fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The records in file order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Extracts the named attribute as a dense column in record order.
    ///
    /// # Errors
    ///
    /// Returns the index of the first record missing the field.
    pub fn field_values(&self, field: &str) -> Result<Vec<f64>, usize> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| record.attribute(field).ok_or(index))
            .collect()
    }

    /// Union bounding rectangle over all record geometries.
    ///
    /// `None` when no record contributes an extent.
    #[must_use]
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.records
            .iter()
            .filter_map(Record::bounding_rect)
            .reduce(|acc, rect| {
                Rect::new(
                    geo::coord! {
                        x: acc.min().x.min(rect.min().x),
                        y: acc.min().y.min(rect.min().y),
                    },
                    geo::coord! {
                        x: acc.max().x.max(rect.max().x),
                        y: acc.max().y.max(rect.max().y),
                    },
                )
            })
    }

    /// New dataset cloning the rows at `indices`, in the given order.
    ///
    /// Indices may repeat (with-replacement sampling selects the same
    /// row more than once).
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    #[must_use]
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
        }
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use geo::{point, polygon};

    use super::*;

    fn point_record(x: f64, y: f64, value: f64) -> Record {
        let mut attributes = BTreeMap::new();
        attributes.insert("value".to_string(), value);
        Record::new(point! { x: x, y: y }.into(), attributes)
    }

    #[test]
    fn extracts_field_column_in_order() {
        let dataset = Dataset::new(vec![
            point_record(0.0, 0.0, 3.0),
            point_record(1.0, 1.0, 1.0),
            point_record(2.0, 2.0, 2.0),
        ]);
        assert_eq!(dataset.field_values("value").unwrap(), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn missing_field_reports_first_offending_index() {
        let mut incomplete = point_record(0.0, 0.0, 1.0);
        incomplete.attributes.clear();
        let dataset = Dataset::new(vec![point_record(0.0, 0.0, 1.0), incomplete]);
        assert_eq!(dataset.field_values("value"), Err(1));
    }

    #[test]
    fn bounding_rect_unions_all_geometries() {
        let dataset = Dataset::new(vec![
            point_record(-3.0, 2.0, 0.0),
            point_record(7.0, -1.0, 0.0),
            Record::new(
                polygon![
                    (x: 0.0, y: 0.0),
                    (x: 4.0, y: 0.0),
                    (x: 4.0, y: 9.0),
                    (x: 0.0, y: 9.0),
                ]
                .into(),
                BTreeMap::new(),
            ),
        ]);

        let rect = dataset.bounding_rect().unwrap();
        assert!((rect.min().x - -3.0).abs() < f64::EPSILON);
        assert!((rect.min().y - -1.0).abs() < f64::EPSILON);
        assert!((rect.max().x - 7.0).abs() < f64::EPSILON);
        assert!((rect.max().y - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_dataset_has_no_bounding_rect() {
        assert!(Dataset::default().bounding_rect().is_none());
    }

    #[test]
    fn subset_preserves_requested_order_and_repeats() {
        let dataset = Dataset::new(vec![
            point_record(0.0, 0.0, 10.0),
            point_record(1.0, 1.0, 20.0),
            point_record(2.0, 2.0, 30.0),
        ]);

        let subset = dataset.subset(&[2, 0, 2]);
        let values = subset.field_values("value").unwrap();
        assert_eq!(values, vec![30.0, 10.0, 30.0]);
    }
}

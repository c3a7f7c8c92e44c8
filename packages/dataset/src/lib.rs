#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! GeoJSON dataset loading, saving, and field projection.
//!
//! Reads a `GeoJSON` `FeatureCollection` into a [`Dataset`], keeping
//! only the geometry and the requested numeric attribute fields, and
//! writes datasets back out in the same shape. Record order follows
//! feature order in the file and survives a round-trip.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use geojson::{Feature, FeatureCollection, GeoJson};
use strata_map_dataset_models::{Dataset, Record};
use thiserror::Error;

/// Errors that can occur while reading or writing datasets.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    Geojson(#[from] geojson::Error),

    /// A requested attribute field is absent or non-numeric on a feature.
    #[error("Feature {index} is missing numeric field '{field}'")]
    MissingField {
        /// The requested attribute field.
        field: String,
        /// Index of the first offending feature.
        index: usize,
    },

    /// Data conversion error.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Loads a `FeatureCollection` file into a [`Dataset`], keeping geometry
/// plus the requested fields.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read or parsed, a
/// feature lacks a usable geometry, or any requested field is absent or
/// non-numeric on any feature.
pub fn load_dataset(path: &Path, fields: &[String]) -> Result<Dataset, DatasetError> {
    let contents = fs::read_to_string(path)?;
    let dataset = parse_feature_collection(&contents, fields)?;
    log::info!(
        "loaded {} records from {} ({} field(s) kept)",
        dataset.len(),
        path.display(),
        fields.len()
    );
    Ok(dataset)
}

/// Writes a [`Dataset`] to a `FeatureCollection` file.
///
/// # Errors
///
/// Returns [`DatasetError`] if a record cannot be converted back to
/// `GeoJSON` or the file cannot be written.
pub fn save_dataset(path: &Path, dataset: &Dataset) -> Result<(), DatasetError> {
    let rendered = render_feature_collection(dataset)?;
    fs::write(path, rendered)?;
    log::info!("wrote {} records to {}", dataset.len(), path.display());
    Ok(())
}

/// Copies a `FeatureCollection` file keeping only geometry plus the
/// named fields, without resampling.
///
/// # Errors
///
/// Returns [`DatasetError`] if loading or saving fails, including when a
/// requested field is absent from the collection.
pub fn strip(input: &Path, output: &Path, fields: &[String]) -> Result<(), DatasetError> {
    let dataset = load_dataset(input, fields)?;
    save_dataset(output, &dataset)
}

/// Parses `FeatureCollection` text into a [`Dataset`], projecting each
/// feature down to its geometry and the requested fields.
///
/// # Errors
///
/// Returns [`DatasetError`] if the text is not a `FeatureCollection`, a
/// feature lacks a usable geometry, or a requested field is absent or
/// non-numeric on any feature.
pub fn parse_feature_collection(
    contents: &str,
    fields: &[String],
) -> Result<Dataset, DatasetError> {
    let geojson: GeoJson = contents.parse()?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(DatasetError::Conversion {
            message: "expected a FeatureCollection document".to_string(),
        });
    };

    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| parse_feature(index, feature, fields))
        .collect::<Result<Vec<Record>, DatasetError>>()
        .map(Dataset::new)
}

fn parse_feature(
    index: usize,
    feature: Feature,
    fields: &[String],
) -> Result<Record, DatasetError> {
    let Some(geometry) = feature.geometry else {
        return Err(DatasetError::Conversion {
            message: format!("feature {index} has no geometry"),
        });
    };
    let geometry: geo::Geometry<f64> =
        geometry.try_into().map_err(|e: geojson::Error| {
            DatasetError::Conversion {
                message: format!("feature {index} has an unsupported geometry: {e}"),
            }
        })?;

    let properties = feature.properties.unwrap_or_default();
    let mut attributes = BTreeMap::new();
    for field in fields {
        let value = properties
            .get(field)
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| DatasetError::MissingField {
                field: field.clone(),
                index,
            })?;
        attributes.insert(field.clone(), value);
    }

    Ok(Record::new(geometry, attributes))
}

/// Renders a [`Dataset`] as `FeatureCollection` text.
///
/// # Errors
///
/// Returns [`DatasetError::Conversion`] if an attribute value is not
/// representable in JSON (NaN or infinite).
pub fn render_feature_collection(dataset: &Dataset) -> Result<String, DatasetError> {
    let features = dataset
        .records()
        .iter()
        .map(|record| {
            let mut properties = geojson::JsonObject::new();
            for (field, &value) in &record.attributes {
                let number = serde_json::Number::from_f64(value).ok_or_else(|| {
                    DatasetError::Conversion {
                        message: format!("field '{field}' value {value} is not valid JSON"),
                    }
                })?;
                properties.insert(field.clone(), serde_json::Value::Number(number));
            }

            Ok(Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(
                    &record.geometry,
                ))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect::<Result<Vec<Feature>, DatasetError>>()?;

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };
    Ok(GeoJson::from(collection).to_string())
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Stratified resampling engine for vector datasets.
//!
//! Reduces a dataset to a representative sample by partitioning records
//! into strata and drawing a fixed quota from each. Two stratifications
//! are supported: quantile bins over a target numeric attribute
//! ([`quantile`] + [`bins`]), and a regular rectangular grid over the
//! dataset extent ([`grid`]). [`resample`] wires either path to the
//! quota sampler ([`sample`]) and hands back a fresh dataset.
//!
//! The engine is synchronous, performs no IO, and never mutates its
//! input; repeated calls with the same seed are deterministic.

pub mod bins;
pub mod grid;
pub mod quantile;
pub mod sample;

use std::collections::BTreeMap;

use strata_map_dataset_models::Dataset;
use thiserror::Error;

/// Errors that can occur during resampling.
#[derive(Debug, Error)]
pub enum ResampleError {
    /// Input failed validation (empty dataset, zero bin/grid counts,
    /// non-finite attribute values, zero requested samples).
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Description of what went wrong.
        message: String,
    },

    /// A record is missing the target attribute field.
    #[error("Record {index} is missing field '{field}'")]
    MissingField {
        /// The requested attribute field.
        field: String,
        /// Index of the first offending record.
        index: usize,
    },

    /// No record geometry contributes an extent to grid over.
    #[error("Dataset has no spatial extent to build a grid from")]
    EmptyExtent,
}

/// Which stratification to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResampleMode {
    /// Quantile bins over a target numeric attribute.
    Value {
        /// Attribute field to stratify on.
        target_field: String,
        /// Number of value bins.
        bins: usize,
    },
    /// Regular grid over the dataset bounding box.
    Spatial {
        /// Number of grid rows (y subdivisions).
        rows: usize,
        /// Number of grid columns (x subdivisions).
        cols: usize,
    },
}

/// Configuration for a resampling run.
#[derive(Debug, Clone)]
pub struct ResampleOptions {
    /// Stratification mode.
    pub mode: ResampleMode,
    /// Desired output size; defaults to the input size.
    pub total_samples: Option<usize>,
    /// Whether strata are sampled with replacement.
    pub replace: bool,
    /// Seed for the draw; a random seed is drawn and logged when unset.
    pub seed: Option<u64>,
}

impl ResampleOptions {
    /// Value-mode options with default sampling parameters.
    #[must_use]
    pub fn value(target_field: impl Into<String>, bins: usize) -> Self {
        Self {
            mode: ResampleMode::Value {
                target_field: target_field.into(),
                bins,
            },
            total_samples: None,
            replace: true,
            seed: None,
        }
    }

    /// Spatial-mode options with default sampling parameters.
    #[must_use]
    pub const fn spatial(rows: usize, cols: usize) -> Self {
        Self {
            mode: ResampleMode::Spatial { rows, cols },
            total_samples: None,
            replace: true,
            seed: None,
        }
    }
}

/// Result of a resampling run.
#[derive(Debug, Clone)]
pub struct ResampleOutcome {
    /// The sampled dataset.
    pub dataset: Dataset,
    /// Declared bin/cell ids that held no records and were skipped.
    pub empty_bins: Vec<usize>,
}

/// Resamples `dataset` according to `options`.
///
/// In value mode the output restores original record order (indices are
/// sorted ascending after the draw); in spatial mode records stay in
/// draw order, grouped by grid cell. Empty strata are logged, skipped,
/// and reported in the outcome; any failure aborts the whole call with
/// no partial output.
///
/// # Errors
///
/// Returns [`ResampleError`] if the dataset is empty, the requested
/// sample count is zero, bin/grid counts are zero, the target field is
/// missing or non-finite on any record, or no geometry provides an
/// extent for the spatial grid.
pub fn resample(
    dataset: &Dataset,
    options: &ResampleOptions,
) -> Result<ResampleOutcome, ResampleError> {
    if dataset.is_empty() {
        return Err(ResampleError::InvalidInput {
            message: "cannot resample an empty dataset".to_string(),
        });
    }

    let total_desired = options.total_samples.unwrap_or_else(|| dataset.len());
    if total_desired == 0 {
        return Err(ResampleError::InvalidInput {
            message: "requested sample count must be at least 1".to_string(),
        });
    }

    let seed = options.seed.unwrap_or_else(|| {
        let drawn: u64 = rand::random();
        log::info!("no seed supplied, drew {drawn}");
        drawn
    });

    match &options.mode {
        ResampleMode::Value { target_field, bins } => resample_by_value(
            dataset,
            target_field,
            *bins,
            total_desired,
            options.replace,
            seed,
        ),
        ResampleMode::Spatial { rows, cols } => resample_spatially(
            dataset,
            *rows,
            *cols,
            total_desired,
            options.replace,
            seed,
        ),
    }
}

fn resample_by_value(
    dataset: &Dataset,
    target_field: &str,
    bins: usize,
    total_desired: usize,
    replace: bool,
    seed: u64,
) -> Result<ResampleOutcome, ResampleError> {
    if bins == 0 {
        return Err(ResampleError::InvalidInput {
            message: "bin count must be at least 1".to_string(),
        });
    }

    let values =
        dataset
            .field_values(target_field)
            .map_err(|index| ResampleError::MissingField {
                field: target_field.to_string(),
                index,
            })?;

    let edges = quantile::compute_edges(&values, bins)?;
    let assignment = bins::assign(&values, &edges);
    let groups = bins::group_by_bin(&assignment);
    let empty_bins = report_empty(&groups, bins, "bin");

    let mut selected = sample::sample(&groups, bins, total_desired, replace, seed);
    selected.sort_unstable();

    log::info!(
        "value resample over '{target_field}': {} of {} records kept across {bins} bins",
        selected.len(),
        dataset.len()
    );

    Ok(ResampleOutcome {
        dataset: dataset.subset(&selected),
        empty_bins,
    })
}

fn resample_spatially(
    dataset: &Dataset,
    rows: usize,
    cols: usize,
    total_desired: usize,
    replace: bool,
    seed: u64,
) -> Result<ResampleOutcome, ResampleError> {
    if rows == 0 || cols == 0 {
        return Err(ResampleError::InvalidInput {
            message: "grid rows and cols must each be at least 1".to_string(),
        });
    }

    let bounds = dataset.bounding_rect().ok_or(ResampleError::EmptyExtent)?;
    let cells = grid::build_grid(bounds, rows, cols);
    let groups = grid::assign_spatial(dataset, &cells);
    let empty_bins = report_empty(&groups, cells.len(), "cell");

    let selected = sample::sample(&groups, cells.len(), total_desired, replace, seed);

    log::info!(
        "spatial resample: {} of {} records kept across a {rows}x{cols} grid",
        selected.len(),
        dataset.len()
    );

    Ok(ResampleOutcome {
        dataset: dataset.subset(&selected),
        empty_bins,
    })
}

/// Logs and collects the declared strata that hold no records.
fn report_empty(groups: &BTreeMap<usize, Vec<usize>>, declared: usize, kind: &str) -> Vec<usize> {
    let empty: Vec<usize> = (0..declared).filter(|id| !groups.contains_key(id)).collect();
    for id in &empty {
        log::info!("{kind} {id} contains no records, skipping");
    }
    empty
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use geo::point;
    use strata_map_dataset_models::Record;

    use super::*;

    fn point_record(x: f64, y: f64, value: f64) -> Record {
        let mut attributes = BTreeMap::new();
        attributes.insert("grade".to_string(), value);
        Record::new(point! { x: x, y: y }.into(), attributes)
    }

    /// 40 records on a line, grades 0..40.
    fn graded_dataset() -> Dataset {
        (0..40)
            .map(|i| point_record(f64::from(i), 0.0, f64::from(i)))
            .collect()
    }

    #[test]
    fn value_mode_restores_original_record_order() {
        let dataset = graded_dataset();
        let mut options = ResampleOptions::value("grade", 4);
        options.total_samples = Some(20);
        options.seed = Some(17);

        let outcome = resample(&dataset, &options).unwrap();
        let grades = outcome.dataset.field_values("grade").unwrap();

        assert_eq!(grades.len(), 20);
        assert!(grades.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn value_mode_defaults_to_input_size() {
        let dataset = graded_dataset();
        let mut options = ResampleOptions::value("grade", 4);
        options.seed = Some(3);

        let outcome = resample(&dataset, &options).unwrap();

        // floor(40 / 4) = 10 per bin, all bins populated.
        assert_eq!(outcome.dataset.len(), 40);
        assert!(outcome.empty_bins.is_empty());
    }

    #[test]
    fn identical_seeds_reproduce_identical_datasets() {
        let dataset = graded_dataset();
        let mut options = ResampleOptions::value("grade", 5);
        options.total_samples = Some(15);
        options.seed = Some(99);

        let first = resample(&dataset, &options).unwrap();
        let second = resample(&dataset, &options).unwrap();

        assert_eq!(first.dataset, second.dataset);
    }

    #[test]
    fn missing_target_field_fails_with_offending_index() {
        let mut records: Vec<Record> = (0..3)
            .map(|i| point_record(f64::from(i), 0.0, f64::from(i)))
            .collect();
        records[2].attributes.clear();
        let dataset = Dataset::new(records);

        let err = resample(&dataset, &ResampleOptions::value("grade", 2)).unwrap_err();
        assert!(matches!(
            err,
            ResampleError::MissingField { index: 2, .. }
        ));
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let err = resample(&Dataset::default(), &ResampleOptions::value("grade", 2)).unwrap_err();
        assert!(matches!(err, ResampleError::InvalidInput { .. }));
    }

    #[test]
    fn zero_requested_samples_is_rejected() {
        let dataset = graded_dataset();
        let mut options = ResampleOptions::value("grade", 2);
        options.total_samples = Some(0);

        assert!(matches!(
            resample(&dataset, &options).unwrap_err(),
            ResampleError::InvalidInput { .. }
        ));
    }

    #[test]
    fn zero_bins_is_rejected() {
        let dataset = graded_dataset();
        assert!(matches!(
            resample(&dataset, &ResampleOptions::value("grade", 0)).unwrap_err(),
            ResampleError::InvalidInput { .. }
        ));
    }

    #[test]
    fn spatial_mode_samples_each_populated_cell() {
        // One record per 2x2 cell, plus a heavy cluster in cell 0.
        let mut records = vec![
            point_record(2.0, 2.0, 0.0),
            point_record(8.0, 2.0, 0.0),
            point_record(2.0, 8.0, 0.0),
            point_record(8.0, 8.0, 0.0),
        ];
        records.extend((0..20).map(|i| point_record(1.0 + f64::from(i) * 0.1, 1.0, 0.0)));
        let dataset = Dataset::new(records);

        let mut options = ResampleOptions::spatial(2, 2);
        options.total_samples = Some(8);
        options.replace = false;
        options.seed = Some(5);

        let outcome = resample(&dataset, &options).unwrap();

        // Quota floor(8 / 4) = 2; cells 1-3 hold a single record each.
        assert_eq!(outcome.dataset.len(), 2 + 1 + 1 + 1);
        assert!(outcome.empty_bins.is_empty());
    }

    #[test]
    fn spatial_mode_reports_empty_cells() {
        // Everything clustered in the lower-left; upper cells stay empty
        // apart from one outlier pinning the extent.
        let mut records: Vec<Record> =
            (0..10).map(|i| point_record(f64::from(i) * 0.1, 0.0, 0.0)).collect();
        records.push(point_record(10.0, 10.0, 0.0));
        let dataset = Dataset::new(records);

        let mut options = ResampleOptions::spatial(2, 2);
        options.seed = Some(8);

        let outcome = resample(&dataset, &options).unwrap();

        assert_eq!(outcome.empty_bins, vec![1, 2]);
    }

    #[test]
    fn zero_grid_dimension_is_rejected() {
        let dataset = graded_dataset();
        assert!(matches!(
            resample(&dataset, &ResampleOptions::spatial(0, 3)).unwrap_err(),
            ResampleError::InvalidInput { .. }
        ));
    }
}

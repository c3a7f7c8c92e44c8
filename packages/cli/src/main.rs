#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the stratified resampling toolchain.
//!
//! Wires the `GeoJSON` loader to the resampling engine and back to the
//! writer. Value mode stratifies on a target attribute's quantile bins;
//! spatial mode stratifies on a regular grid over the dataset extent;
//! `strip` only projects fields without resampling.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use strata_map_dataset::{load_dataset, save_dataset, strip};
use strata_map_resample::{resample, ResampleMode, ResampleOptions};

#[derive(Parser)]
#[command(
    name = "strata_map_cli",
    about = "Stratified resampling for GeoJSON datasets"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resample by quantile bins over a target numeric field
    Resample {
        /// Input FeatureCollection path
        #[arg(long)]
        input: PathBuf,
        /// Output FeatureCollection path
        #[arg(long)]
        output: PathBuf,
        /// Target field to stratify on (always kept in the output)
        #[arg(long)]
        field: String,
        /// Number of value bins
        #[arg(long, default_value = "10")]
        bins: usize,
        /// Additional fields to keep in the output (repeatable)
        #[arg(long)]
        keep: Vec<String>,
        /// Number of output samples; defaults to the input size
        #[arg(long)]
        samples: Option<usize>,
        /// Sample without replacement (quotas clamp to stratum size)
        #[arg(long)]
        no_replace: bool,
        /// Seed for reproducible draws; random (and logged) when unset
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Resample by a rows x cols grid over the dataset extent
    ResampleSpatial {
        /// Input FeatureCollection path
        #[arg(long)]
        input: PathBuf,
        /// Output FeatureCollection path
        #[arg(long)]
        output: PathBuf,
        /// Number of grid rows (y subdivisions)
        #[arg(long, default_value = "10")]
        rows: usize,
        /// Number of grid columns (x subdivisions)
        #[arg(long, default_value = "10")]
        cols: usize,
        /// Fields to keep in the output (repeatable)
        #[arg(long)]
        keep: Vec<String>,
        /// Number of output samples; defaults to the input size
        #[arg(long)]
        samples: Option<usize>,
        /// Sample without replacement (quotas clamp to stratum size)
        #[arg(long)]
        no_replace: bool,
        /// Seed for reproducible draws; random (and logged) when unset
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Copy a collection keeping only geometry plus the named fields
    Strip {
        /// Input FeatureCollection path
        #[arg(long)]
        input: PathBuf,
        /// Output FeatureCollection path
        #[arg(long)]
        output: PathBuf,
        /// Fields to keep (repeatable, at least one)
        #[arg(long, required = true)]
        keep: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Resample {
            input,
            output,
            field,
            bins,
            mut keep,
            samples,
            no_replace,
            seed,
        } => {
            if !keep.contains(&field) {
                keep.push(field.clone());
            }
            let options = ResampleOptions {
                mode: ResampleMode::Value {
                    target_field: field,
                    bins,
                },
                total_samples: samples,
                replace: !no_replace,
                seed,
            };
            run_resample(&input, &output, &keep, &options)?;
        }
        Commands::ResampleSpatial {
            input,
            output,
            rows,
            cols,
            keep,
            samples,
            no_replace,
            seed,
        } => {
            let options = ResampleOptions {
                mode: ResampleMode::Spatial { rows, cols },
                total_samples: samples,
                replace: !no_replace,
                seed,
            };
            run_resample(&input, &output, &keep, &options)?;
        }
        Commands::Strip {
            input,
            output,
            keep,
        } => {
            strip(&input, &output, &keep)?;
        }
    }

    Ok(())
}

fn run_resample(
    input: &Path,
    output: &Path,
    keep: &[String],
    options: &ResampleOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load_dataset(input, keep)?;
    let outcome = resample(&dataset, options)?;

    if !outcome.empty_bins.is_empty() {
        log::warn!(
            "{} of the declared strata held no records: {:?}",
            outcome.empty_bins.len(),
            outcome.empty_bins
        );
    }

    save_dataset(output, &outcome.dataset)?;
    log::info!(
        "resampled {} records down to {}",
        dataset.len(),
        outcome.dataset.len()
    );
    Ok(())
}

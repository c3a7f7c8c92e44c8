//! Spatial grid construction and first-enclosing-cell assignment.
//!
//! The dataset bounding box is divided into `cols` equal-width columns
//! and `rows` equal-height rows. Cells are enumerated row-major with
//! row 0 at the minimum y and column 0 at the minimum x, so cell id
//! `r * cols + c` is deterministic across runs. A record on a shared
//! cell boundary joins the first enclosing cell in enumeration order.

use std::collections::BTreeMap;

use geo::{coord, Rect};
use strata_map_dataset_models::Dataset;

/// Divides `bounds` into a `rows` x `cols` grid of cells in row-major
/// order.
///
/// Interior cell edges are placed at equal fractions of the extent; the
/// outermost edges reuse the exact bounds coordinates so that closed
/// containment never loses a record sitting on the extent itself.
///
/// # Panics
///
/// Panics if `rows` or `cols` is zero.
#[must_use]
pub fn build_grid(bounds: Rect<f64>, rows: usize, cols: usize) -> Vec<Rect<f64>> {
    assert!(rows >= 1 && cols >= 1, "grid must have at least one cell");

    let x_edges = axis_edges(bounds.min().x, bounds.max().x, cols);
    let y_edges = axis_edges(bounds.min().y, bounds.max().y, rows);

    let mut cells = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            cells.push(Rect::new(
                coord! { x: x_edges[c], y: y_edges[r] },
                coord! { x: x_edges[c + 1], y: y_edges[r + 1] },
            ));
        }
    }
    cells
}

/// `segments + 1` evenly spaced edge coordinates from `min` to `max`,
/// with both endpoints exact.
fn axis_edges(min: f64, max: f64, segments: usize) -> Vec<f64> {
    #[allow(clippy::cast_precision_loss)]
    let step = (max - min) / segments as f64;
    (0..=segments)
        .map(|i| {
            if i == segments {
                max
            } else {
                #[allow(clippy::cast_precision_loss)]
                let i = i as f64;
                step.mul_add(i, min)
            }
        })
        .collect()
}

/// Assigns each record to the first cell that entirely contains it,
/// grouped as cell id -> record indices in order of first appearance.
///
/// A geometry is contained in a cell when its bounding rectangle lies
/// inside the cell's closed bounds; for an axis-aligned cell this is
/// equivalent to containment of the geometry itself. Records contained
/// in no cell (a polygon straddling a cell boundary, or a geometry with
/// no extent) are dropped from the assignment and logged at debug level.
#[must_use]
pub fn assign_spatial(dataset: &Dataset, cells: &[Rect<f64>]) -> BTreeMap<usize, Vec<usize>> {
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

    for (index, record) in dataset.records().iter().enumerate() {
        let Some(envelope) = record.bounding_rect() else {
            log::debug!("record {index} has no extent, dropped from spatial assignment");
            continue;
        };

        match cells.iter().position(|cell| contains(cell, &envelope)) {
            Some(cell_id) => groups.entry(cell_id).or_default().push(index),
            None => {
                log::debug!("record {index} is contained in no grid cell, dropped");
            }
        }
    }

    groups
}

/// Closed-bounds containment of `envelope` within `cell`.
fn contains(cell: &Rect<f64>, envelope: &Rect<f64>) -> bool {
    envelope.min().x >= cell.min().x
        && envelope.max().x <= cell.max().x
        && envelope.min().y >= cell.min().y
        && envelope.max().y <= cell.max().y
}

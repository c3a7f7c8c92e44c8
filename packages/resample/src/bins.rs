//! Value-based bin assignment against precomputed edges.
//!
//! Edges define half-open intervals `[edges[i], edges[i + 1])`, with the
//! lowest edge inclusive and the highest interval closed on the right.
//! Values outside the edge range clamp to the nearest bin rather than
//! failing, matching the behavior callers see when edges were computed
//! from the same column they are bucketing.

use std::collections::BTreeMap;

/// Assigns each value to a bin id in `[0, edges.len() - 1)`.
///
/// A value equal to the lowest edge lands in bin 0; a value equal to the
/// highest edge lands in the last bin. Out-of-range values clamp to the
/// nearest bin and are logged at debug level. Coincident edges (possible
/// when there were fewer unique values than bins) produce zero-width
/// intervals that never win: the search places a value in the interval
/// that starts at the last edge not exceeding it.
///
/// # Panics
///
/// Panics if `edges` has fewer than two entries.
#[must_use]
pub fn assign(values: &[f64], edges: &[f64]) -> Vec<usize> {
    assert!(edges.len() >= 2, "edges must define at least one interval");
    let last_bin = edges.len() - 2;

    values
        .iter()
        .map(|&value| {
            if value <= edges[0] {
                if value < edges[0] {
                    log::debug!("value {value} below lowest edge {}, clamped to bin 0", edges[0]);
                }
                0
            } else if value >= edges[edges.len() - 1] {
                if value > edges[edges.len() - 1] {
                    log::debug!(
                        "value {value} above highest edge {}, clamped to bin {last_bin}",
                        edges[edges.len() - 1]
                    );
                }
                last_bin
            } else {
                // First index whose edge exceeds the value, minus one:
                // the interval starting at the last edge <= value.
                edges.partition_point(|edge| *edge <= value) - 1
            }
        })
        .collect()
}

/// Groups a per-record assignment into bin id -> record indices, keeping
/// order of first appearance within each bin.
#[must_use]
pub fn group_by_bin(assignment: &[usize]) -> BTreeMap<usize, Vec<usize>> {
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (index, &bin) in assignment.iter().enumerate() {
        groups.entry(bin).or_default().push(index);
    }
    groups
}

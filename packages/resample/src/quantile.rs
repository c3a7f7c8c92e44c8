//! Quantile bin-edge computation over unique attribute values.
//!
//! Computing sample quantiles directly over a duplicate-laden vector can
//! produce repeated edges when a single value dominates many records,
//! which collapses the half-open intervals downstream. Deduplicating
//! first keeps the edges spread across the distinct values that actually
//! occur, at the cost of no longer weighting strata by record count.

use crate::ResampleError;

/// Computes `bins + 1` non-decreasing bin edges over the unique values
/// of `values`, placing an approximately equal count of unique values in
/// each bin.
///
/// The first edge is the minimum unique value and the last is the
/// maximum. Edges may still coincide when there are fewer unique values
/// than bins; the interval search in [`crate::bins`] tolerates the
/// resulting zero-width intervals.
///
/// # Errors
///
/// Returns [`ResampleError::InvalidInput`] if `values` is empty, if
/// `bins` is zero, or if any value is NaN or infinite (non-finite values
/// have no place in a total order over edges).
pub fn compute_edges(values: &[f64], bins: usize) -> Result<Vec<f64>, ResampleError> {
    if values.is_empty() {
        return Err(ResampleError::InvalidInput {
            message: "cannot compute bin edges over an empty value vector".to_string(),
        });
    }
    if bins == 0 {
        return Err(ResampleError::InvalidInput {
            message: "bin count must be at least 1".to_string(),
        });
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(ResampleError::InvalidInput {
            message: format!("target field contains a non-finite value ({bad})"),
        });
    }

    let mut unique = values.to_vec();
    unique.sort_unstable_by(f64::total_cmp);
    unique.dedup();

    #[allow(clippy::cast_precision_loss)]
    let edges = (0..=bins)
        .map(|i| quantile(&unique, i as f64 / bins as f64))
        .collect();

    Ok(edges)
}

/// Sample quantile of an ascending-sorted slice at `q` in `[0, 1]`,
/// with linear interpolation between order statistics.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let position = q * (sorted.len() - 1) as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let below = position.floor() as usize;
    let above = (below + 1).min(sorted.len() - 1);
    #[allow(clippy::cast_precision_loss)]
    let fraction = position - below as f64;

    (sorted[above] - sorted[below]).mul_add(fraction, sorted[below])
}

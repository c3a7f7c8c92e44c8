//! Per-stratum quota sampling with an explicit seed.
//!
//! The quota is `floor(total_desired / declared_bins)` over the declared
//! bin count, not the non-empty count: empty strata shrink the output
//! instead of inflating their neighbors. All randomness flows from the
//! seed passed in; there is no global random state.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Draws `floor(total_desired / declared_bins)` record indices from each
/// non-empty stratum, concatenated in ascending bin-id order.
///
/// With `replace` set, each draw is independent and uniform over the
/// stratum, so duplicates are possible and the full quota is always met.
/// Without replacement, a quota above the stratum population clamps to
/// the whole stratum (logged at debug level) rather than failing.
///
/// Identical inputs and an identical `seed` produce an identical output
/// sequence.
#[must_use]
pub fn sample(
    groups: &BTreeMap<usize, Vec<usize>>,
    declared_bins: usize,
    total_desired: usize,
    replace: bool,
    seed: u64,
) -> Vec<usize> {
    let quota = total_desired / declared_bins.max(1);
    if quota == 0 {
        log::warn!(
            "per-stratum quota is zero ({total_desired} samples over {declared_bins} strata)"
        );
        return Vec::new();
    }

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut selected = Vec::with_capacity(quota * groups.len());

    for (bin, members) in groups {
        if members.is_empty() {
            continue;
        }
        if replace {
            selected.extend((0..quota).map(|_| members[rng.gen_range(0..members.len())]));
        } else {
            if quota > members.len() {
                log::debug!(
                    "stratum {bin} holds {} records, short of the {quota} requested; \
                     drawing all of them",
                    members.len()
                );
            }
            selected.extend(draw_without_replacement(members, quota, &mut rng));
        }
    }

    selected
}

/// Up to `count` distinct members via a partial Fisher-Yates shuffle.
fn draw_without_replacement(
    members: &[usize],
    count: usize,
    rng: &mut Xoshiro256PlusPlus,
) -> Vec<usize> {
    let count = count.min(members.len());
    let mut positions: Vec<usize> = (0..members.len()).collect();
    for i in 0..count {
        let j = rng.gen_range(i..positions.len());
        positions.swap(i, j);
    }
    positions[..count].iter().map(|&p| members[p]).collect()
}

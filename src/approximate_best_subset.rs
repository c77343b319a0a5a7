// SPDX-License-Identifier: CC0-1.0
//
//! Approximate Best Subset.
//!
//! This module introduces a stochastic approximation of subset sum, used to
//! pick a set of small UTXOs whose total lands as close as possible above a
//! target.

use bitcoin::Amount;
use rand::Rng;

/// Outcome of [`approximate_best_subset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BestSubset {
    /// `included[i]` is true if `values[i]` is part of the subset.
    pub(crate) included: Vec<bool>,
    /// Sum of the included values.
    pub(crate) total: Amount,
}

impl BestSubset {
    /// Indexes of the included values.
    pub(crate) fn indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.included.iter().enumerate().filter(|(_, inc)| **inc).map(|(i, _)| i)
    }
}

/// Search for the subset of `values` with the smallest total that still meets
/// `target`.
///
/// The search starts from the trivial solution (every value included, summing
/// to `total`) and runs at most `iterations` randomized trials, returning early
/// once a subset hits `target` exactly.  The result is only approximately
/// optimal: subset sum is NP-hard and the trial count bounds the work to
/// `O(iterations * values.len())`.
///
/// `values` should be sorted in descending order.  Walking large values first
/// lets each trial overshoot early and then refine the overshoot with the
/// smaller values that follow.
///
/// ## Parameters
///
/// * `values` - candidate amounts, largest first.
/// * `total` - the sum of `values`.  The caller has already checked this sum
///   for overflow, so no subset total can overflow.
/// * `target` - the amount a subset must reach.
/// * `iterations` - the maximum number of trials.
/// * `rng` - used primarily by tests to make the selection deterministic.

// Each trial is made of at most two passes over `values`:
//
// Pass one flips a coin for every value and includes it on heads.
// Pass two includes every value pass one left out.
//
// Whenever the running total reaches the target the subset is recorded if it
// beats the best total seen so far.  The value that crossed the target is
// then dropped again and the walk carries on, looking for a smaller value that
// crosses the target by less.  For values [5, 4, 3, 1] and a target of 6:
//
//   include 5          total 5
//   include 4          total 9  >= 6, record 9, drop 4 -> total 5
//   skip    3 (tails)  total 5
//   include 1          total 6  >= 6, record 6, drop 1 -> total 5
//
// Since a solution was reached in pass one, pass two is skipped.  6 equals the
// target so no further trials are needed.
pub(crate) fn approximate_best_subset<R: Rng + ?Sized>(
    values: &[Amount],
    total: Amount,
    target: Amount,
    iterations: u32,
    rng: &mut R,
) -> BestSubset {
    let mut best = BestSubset { included: vec![true; values.len()], total };
    let mut included = vec![false; values.len()];

    let mut trial = 0;
    while trial < iterations && best.total != target {
        included.iter_mut().for_each(|inc| *inc = false);

        let mut running = Amount::ZERO;
        let mut reached_target = false;

        for pass in 0..2 {
            if reached_target {
                break;
            }

            for (i, value) in values.iter().enumerate() {
                let take = if pass == 0 { rng.gen::<bool>() } else { !included[i] };
                if !take {
                    continue;
                }

                running += *value;
                included[i] = true;

                if running >= target {
                    reached_target = true;
                    if running < best.total {
                        log::trace!("trial {} improved best subset to {}", trial, running);
                        best.total = running;
                        best.included.copy_from_slice(&included);
                    }
                    running -= *value;
                    included[i] = false;
                }
            }
        }

        trial += 1;
    }

    log::trace!("approximate best subset {} after {} trials (target {})", best.total, trial, target);
    best
}

// SPDX-License-Identifier: CC0-1.0
//
//! Coin Selector.
//!
//! Chooses between an exact single coin, the whole pool of small coins, the
//! smallest coin larger than the target, and an approximate best subset of
//! the small coins.

use bitcoin::Amount;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::approximate_best_subset::approximate_best_subset;
use crate::eligibility::{eligible, ConfirmationPolicy};
use crate::error::SelectionError;
use crate::selection_result::SelectionResult;
use crate::{Utxo, CENT, ITERATIONS};

/// What a selection round has to pay for, and which coins it may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRequest {
    /// The amount to cover.
    pub target: Amount,
    /// Minimum confirmations per candidate class.
    pub policy: ConfirmationPolicy,
}

impl SelectionRequest {
    /// Request `target` under the strictest default confirmation policy.
    pub fn new(target: Amount) -> Self {
        SelectionRequest { target, policy: ConfirmationPolicy::default() }
    }

    /// Replace the confirmation thresholds.
    pub fn with_confirmations(mut self, min_conf_self: u32, min_conf_others: u32) -> Self {
        self.policy = ConfirmationPolicy::new(min_conf_self, min_conf_others);
        self
    }

    /// Replace the confirmation policy.
    pub fn with_policy(mut self, policy: ConfirmationPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Selects coins for a target using a stochastic subset-sum search.
///
/// The selector holds no state between calls.  Every call works on its own
/// snapshot of candidates and its own rng, so one selector may serve many
/// threads at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinSelector {
    /// Change below this amount is considered not worth creating.
    pub dust_threshold: Amount,
    /// Maximum number of trials of the subset search.
    pub iterations: u32,
}

impl Default for CoinSelector {
    fn default() -> Self {
        CoinSelector { dust_threshold: CENT, iterations: ITERATIONS }
    }
}

impl CoinSelector {
    /// A selector with the default dust threshold and trial count.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dust threshold.
    pub fn with_dust_threshold(mut self, dust_threshold: Amount) -> Self {
        self.dust_threshold = dust_threshold;
        self
    }

    /// Set the maximum number of subset search trials.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Select coins from `candidates` that cover `request.target`.
    ///
    /// In order of preference the selection is:
    ///
    /// 1. a single coin worth exactly the target.
    /// 2. every coin smaller than target + dust_threshold, when they add up
    ///    to exactly the target or exactly target + dust_threshold.
    /// 3. the smallest coin larger than the target, when the small coins
    ///    cannot cover the target with at least dust_threshold to spare.
    /// 4. the best subset of the small coins found by a randomized subset
    ///    search, unless the smallest larger coin overshoots by no more than
    ///    that subset does.
    ///
    /// The subset search first looks for a subset worth exactly the target.
    /// If there is none and the small coins can afford it, it searches again
    /// for target + dust_threshold so that the change output is not dust.
    ///
    /// ## Returns
    ///
    /// * `Ok(SelectionResult)` with `success == false` if the eligible coins sum
    ///   to less than the target.  This is not an error.
    /// * `Err(SelectionError::ZeroTarget)` if the target is zero.
    /// * `Err(SelectionError::Overflow)` / `Err(SelectionError::TargetOverflow)`
    ///   if amounts do not fit in an `Amount`.
    ///
    /// ## Parameters
    ///
    /// * `candidates` - the wallet's spendable coins.  Not modified.
    /// * `request` - target and confirmation policy.
    /// * `rng` - shuffles the candidates and drives the subset search.  Seed it
    ///   to make the selection reproducible.
    pub fn select<U: Utxo, R: Rng + ?Sized>(
        &self,
        candidates: &[U],
        request: &SelectionRequest,
        rng: &mut R,
    ) -> Result<SelectionResult, SelectionError> {
        let target = request.target;
        if target == Amount::ZERO {
            return Err(SelectionError::ZeroTarget);
        }

        let dust_target = target.checked_add(self.dust_threshold).ok_or(
            SelectionError::TargetOverflow { target, dust_threshold: self.dust_threshold },
        )?;

        let mut coins = eligible(candidates, &request.policy);
        coins.shuffle(rng);

        let mut lower: Vec<&U> = vec![];
        let mut total_lower = Amount::ZERO;
        let mut lowest_larger: Option<&U> = None;

        for coin in coins.iter().copied() {
            let value = coin.value();

            if value == target {
                log::debug!("exact single coin {} for target {}", coin.outpoint(), target);
                return SelectionResult::from_selection(target, Some(coin));
            }

            if value < dust_target {
                lower.push(coin);
                total_lower = total_lower
                    .checked_add(value)
                    .ok_or(SelectionError::Overflow(lower.len()))?;
            } else if lowest_larger.map_or(true, |l| value < l.value()) {
                lowest_larger = Some(coin);
            }
        }

        if total_lower == target || total_lower == dust_target {
            log::debug!("all {} small coins sum to {} for target {}", lower.len(), total_lower, target);
            return SelectionResult::from_selection(target, lower);
        }

        let required = if lowest_larger.is_some() { dust_target } else { target };
        if total_lower < required {
            return match lowest_larger {
                Some(coin) => {
                    log::debug!(
                        "small coins sum to {}, using larger coin {} worth {}",
                        total_lower,
                        coin.outpoint(),
                        coin.value()
                    );
                    SelectionResult::from_selection(target, Some(coin))
                }
                None => {
                    log::debug!("insufficient funds: {} available for target {}", total_lower, target);
                    Ok(SelectionResult::insufficient(target))
                }
            };
        }

        // Stable: equal values keep their shuffled order.
        lower.sort_by(|a, b| b.value().cmp(&a.value()));
        let values: Vec<Amount> = lower.iter().map(|u| u.value()).collect();

        let mut best = approximate_best_subset(&values, total_lower, target, self.iterations, rng);

        // No exact subset: aim for at least dust_threshold of change instead of
        // dust, if the small coins allow it.
        if best.total != target && total_lower >= dust_target {
            log::trace!("no exact subset for {}, searching for {}", target, dust_target);
            best = approximate_best_subset(&values, total_lower, dust_target, self.iterations, rng);
        }

        if let Some(coin) = lowest_larger {
            // A larger coin implies total_lower >= dust_target, so an inexact
            // subset here leaves at least dust_threshold of change.
            if coin.value() <= best.total {
                log::debug!(
                    "larger coin {} worth {} beats best subset {}",
                    coin.outpoint(),
                    coin.value(),
                    best.total
                );
                return SelectionResult::from_selection(target, Some(coin));
            }
        }

        log::debug!(
            "best subset of {} coins totals {} for target {}",
            best.indexes().count(),
            best.total,
            target
        );
        SelectionResult::from_selection(target, best.indexes().map(|i| lower[i]))
    }

    /// Retry [`CoinSelector::select`] for each policy in `tiers`, returning the
    /// first successful result.
    ///
    /// If no tier succeeds the last failed result is returned.  An empty
    /// `tiers` list fails without looking at the candidates.
    pub fn select_with_tiers<U: Utxo, R: Rng + ?Sized>(
        &self,
        candidates: &[U],
        target: Amount,
        tiers: &[ConfirmationPolicy],
        rng: &mut R,
    ) -> Result<SelectionResult, SelectionError> {
        if target == Amount::ZERO {
            return Err(SelectionError::ZeroTarget);
        }

        let mut result = SelectionResult::insufficient(target);
        for policy in tiers {
            let request = SelectionRequest::new(target).with_policy(*policy);
            result = self.select(candidates, &request, rng)?;
            if result.success {
                break;
            }
            log::debug!("no selection under {:?}, relaxing", policy);
        }

        Ok(result)
    }
}

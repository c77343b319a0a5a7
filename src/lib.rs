// SPDX-License-Identifier: CC0-1.0
//
//! # stochastic-coin-selection
//! Helper functions to select a set of UTXOs from a given UTXO pool to reach
//! a given target amount, preferring selections that need no change output
//! and avoiding change outputs too small to be worth spending.
//!
//! Coins are filtered by confirmation depth, then either a single coin, the
//! whole set of small coins, or an approximate best subset of small coins
//! found by a randomized search is returned.  The search is driven by a
//! caller supplied rng, so a seeded rng makes the selection reproducible.
//!
//! ```
//! use bitcoin::hashes::Hash;
//! use bitcoin::{Amount, OutPoint, Txid};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use stochastic_coin_selection::{select_coins, Candidate, CENT};
//!
//! let txid = Txid::all_zeros();
//! let pool: Vec<Candidate> = [1u64, 2, 5, 10, 20]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, c)| Candidate::new(OutPoint::new(txid, i as u32), CENT * *c, 6, false))
//!     .collect();
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let result = select_coins(&pool, CENT * 3, &mut rng).unwrap();
//!
//! assert!(result.success);
//! assert_eq!(result.total_value, CENT * 3);
//! assert_eq!(result.change(), None);
//! ```

mod approximate_best_subset;
mod eligibility;
mod error;
mod selection_result;
mod selector;

use bitcoin::{Amount, OutPoint};
use rand::Rng;

pub use crate::eligibility::{ConfirmationPolicy, DEFAULT_CONFIRMATION_TIERS};
pub use crate::error::SelectionError;
pub use crate::selection_result::SelectionResult;
pub use crate::selector::{CoinSelector, SelectionRequest};

/// One hundredth of a bitcoin, the default dust threshold.  Change smaller than
/// this is avoided when the wallet holds coins that allow it.
pub const CENT: Amount = Amount::from_sat(1_000_000);

/// Default number of trials of the subset search.
pub const ITERATIONS: u32 = 1000;

/// A spendable output as seen by the selector.
pub trait Utxo {
    /// Identifies the output.  Only used to report the selection.
    fn outpoint(&self) -> OutPoint;

    /// The value of the output.
    fn value(&self) -> Amount;

    /// Depth of the block containing the output, 0 while unconfirmed.
    fn confirmations(&self) -> u32;

    /// True if the transaction creating the output was made by this wallet.
    fn is_from_self(&self) -> bool;
}

/// A plain [`Utxo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    /// The transaction output this coin is.
    pub outpoint: OutPoint,
    /// Value of the coin.
    pub value: Amount,
    /// Confirmation depth, 0 while unconfirmed.
    pub confirmations: u32,
    /// Whether this wallet created the transaction paying the coin.
    pub is_from_self: bool,
}

impl Candidate {
    /// Create a candidate from its parts.
    pub fn new(outpoint: OutPoint, value: Amount, confirmations: u32, is_from_self: bool) -> Self {
        Candidate { outpoint, value, confirmations, is_from_self }
    }

    /// Replace the confirmation depth.
    pub fn with_confirmations(mut self, confirmations: u32) -> Self {
        self.confirmations = confirmations;
        self
    }

    /// Mark the coin as created by this wallet.
    pub fn from_self(mut self) -> Self {
        self.is_from_self = true;
        self
    }
}

impl Utxo for Candidate {
    fn outpoint(&self) -> OutPoint {
        self.outpoint
    }

    fn value(&self) -> Amount {
        self.value
    }

    fn confirmations(&self) -> u32 {
        self.confirmations
    }

    fn is_from_self(&self) -> bool {
        self.is_from_self
    }
}

impl<U: Utxo> Utxo for &U {
    fn outpoint(&self) -> OutPoint {
        (**self).outpoint()
    }

    fn value(&self) -> Amount {
        (**self).value()
    }

    fn confirmations(&self) -> u32 {
        (**self).confirmations()
    }

    fn is_from_self(&self) -> bool {
        (**self).is_from_self()
    }
}

/// Select coins with the default [`CoinSelector`], relaxing the confirmation
/// requirements through [`DEFAULT_CONFIRMATION_TIERS`] until a selection
/// succeeds.
///
/// Returns a result with `success == false` if even the most permissive tier
/// cannot cover `target`.
pub fn select_coins<U: Utxo, R: Rng + ?Sized>(
    candidates: &[U],
    target: Amount,
    rng: &mut R,
) -> Result<SelectionResult, SelectionError> {
    CoinSelector::default().select_with_tiers(candidates, target, &DEFAULT_CONFIRMATION_TIERS, rng)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use arbitrary::Unstructured;
    use bitcoin::hashes::Hash;
    use bitcoin::Txid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    pub(crate) use crate::CENT;
    pub(crate) const COIN: Amount = Amount::from_sat(100_000_000);

    const ONE_BTC: Amount = COIN;
    const TWO_BTC: Amount = Amount::from_sat(2 * 100_000_000);
    const THREE_BTC: Amount = Amount::from_sat(3 * 100_000_000);
    const FOUR_BTC: Amount = Amount::from_sat(4 * 100_000_000);

    /// A mature coin from someone else, distinguished by `vout`.
    pub(crate) fn candidate(vout: u32, value: Amount) -> Candidate {
        Candidate::new(OutPoint::new(Txid::all_zeros(), vout), value, 6 * 24, false)
    }

    fn utxo_pool() -> Vec<Candidate> {
        [ONE_BTC, TWO_BTC, THREE_BTC, FOUR_BTC]
            .iter()
            .enumerate()
            .map(|(i, v)| candidate(i as u32, *v))
            .collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(2012)
    }

    #[test]
    fn select_coins_single_exact() {
        for target in [ONE_BTC, TWO_BTC, THREE_BTC, FOUR_BTC] {
            let result = select_coins(&utxo_pool(), target, &mut rng()).unwrap();

            assert_eq!(result.len(), 1);
            assert_eq!(result.total_value, target);
        }
    }

    #[test]
    fn select_coins_5_btc() {
        // 1 + 4 or 2 + 3 pay 5 BTC without change.
        let result = select_coins(&utxo_pool(), ONE_BTC * 5, &mut rng()).unwrap();

        assert_eq!(result.total_value, ONE_BTC * 5);
        assert_eq!(result.len(), 2);
        assert_eq!(result.change(), None);
    }

    #[test]
    fn select_coins_whole_pool() {
        let result = select_coins(&utxo_pool(), ONE_BTC * 10, &mut rng()).unwrap();
        assert_eq!(result.len(), 4);

        // leaves exactly a cent of change.
        let result = select_coins(&utxo_pool(), ONE_BTC * 10 - CENT, &mut rng()).unwrap();
        assert_eq!(result.len(), 4);
        assert_eq!(result.change(), Some(CENT));
    }

    #[test]
    fn select_coins_11_btc_not_possible() {
        let result = select_coins(&utxo_pool(), ONE_BTC * 11, &mut rng()).unwrap();

        assert!(!result.success);
        assert!(result.is_empty());
    }

    #[test]
    fn select_coins_empty_pool() {
        let pool: Vec<Candidate> = vec![];
        let result = select_coins(&pool, Amount::from_sat(1), &mut rng()).unwrap();

        assert!(!result.success);
    }

    #[test]
    fn select_coins_by_reference() {
        let pool = utxo_pool();
        let refs: Vec<&Candidate> = pool.iter().collect();

        let result = select_coins(&refs, THREE_BTC, &mut rng()).unwrap();
        assert!(result.chosen.contains(&pool[2].outpoint));
    }

    #[test]
    fn select_coins_from_large_utxo_pool() {
        let pool: Vec<Candidate> =
            (0..10_000u32).map(|i| candidate(i, Amount::from_sat(100_000 + u64::from(i)))).collect();

        let result = select_coins(&pool, ONE_BTC + Amount::from_sat(1), &mut rng()).unwrap();

        assert!(result.success);
        assert!(result.total_value > ONE_BTC);
    }

    fn arbitrary_pool(u: &mut Unstructured<'_>) -> arbitrary::Result<Vec<Candidate>> {
        let len = u.int_in_range(0..=24)?;
        let mut pool = Vec::with_capacity(len);

        for i in 0..len {
            let value = Amount::from_sat(u.int_in_range(1..=50_000_000)?);
            let mut c = candidate(i as u32, value).with_confirmations(u.int_in_range(0..=8)?);
            if u.arbitrary()? {
                c = c.from_self();
            }
            pool.push(c);
        }

        Ok(pool)
    }

    #[test]
    fn select_properties() {
        arbtest::arbtest(|u| {
            let pool = arbitrary_pool(u)?;
            let target = Amount::from_sat(u.int_in_range(1..=200_000_000)?);
            let policy = ConfirmationPolicy::new(u.int_in_range(0..=2)?, u.int_in_range(0..=6)?);
            let seed: u64 = u.arbitrary()?;

            let request = SelectionRequest::new(target).with_policy(policy);
            let selector = CoinSelector::new().with_iterations(100);
            let run = || selector.select(&pool, &request, &mut StdRng::seed_from_u64(seed)).unwrap();

            let result = run();
            assert_eq!(result, run());

            let eligible: HashMap<OutPoint, Amount> = pool
                .iter()
                .filter(|c| policy.accepts(*c))
                .map(|c| (c.outpoint, c.value))
                .collect();
            let available: Amount = eligible.values().copied().sum();

            assert_eq!(result.success, available >= target);
            assert_eq!(result.target, target);

            if result.success {
                assert!(result.total_value >= target);

                let chosen_total: Amount = result
                    .chosen
                    .iter()
                    .map(|o| eligible.get(o).copied().expect("chosen coin is not eligible"))
                    .sum();
                assert_eq!(chosen_total, result.total_value);
            } else {
                assert!(result.is_empty());
            }

            Ok(())
        });
    }
}

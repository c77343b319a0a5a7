// SPDX-License-Identifier: CC0-1.0
//
//! The outcome of a selection round.

use std::collections::BTreeSet;

use bitcoin::{Amount, OutPoint};

use crate::error::SelectionError;
use crate::Utxo;

/// Coins chosen to fund a payment.
///
/// `chosen` is ordered by outpoint so two identical rounds compare equal
/// regardless of the order the coins were picked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionResult {
    /// Outpoints of the selected coins.
    pub chosen: BTreeSet<OutPoint>,
    /// Sum of the selected coin values.
    pub total_value: Amount,
    /// False if the eligible coins could not cover `target`.
    pub success: bool,
    /// The amount the selection was asked to cover.
    pub target: Amount,
}

impl SelectionResult {
    /// A failed round: nothing is chosen.
    pub fn insufficient(target: Amount) -> Self {
        SelectionResult { chosen: BTreeSet::new(), total_value: Amount::ZERO, success: false, target }
    }

    /// Build a successful result from the selected coins.
    pub(crate) fn from_selection<'a, U, I>(target: Amount, selection: I) -> Result<Self, SelectionError>
    where
        U: Utxo + 'a,
        I: IntoIterator<Item = &'a U>,
    {
        let mut chosen = BTreeSet::new();
        let mut total_value = Amount::ZERO;

        for utxo in selection {
            let fresh = chosen.insert(utxo.outpoint());
            debug_assert!(fresh, "{} selected twice", utxo.outpoint());
            total_value = total_value
                .checked_add(utxo.value())
                .ok_or(SelectionError::Overflow(chosen.len()))?;
        }

        debug_assert!(total_value >= target, "selected {} for a target of {}", total_value, target);

        Ok(SelectionResult { chosen, total_value, success: true, target })
    }

    /// `total_value - target`, zero for a failed round.
    pub fn excess(&self) -> Amount {
        self.total_value.checked_sub(self.target).unwrap_or(Amount::ZERO)
    }

    /// The value to return to the wallet as a change output, if any.
    pub fn change(&self) -> Option<Amount> {
        if self.success && self.total_value > self.target {
            Some(self.excess())
        } else {
            None
        }
    }

    /// Number of selected coins.
    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    /// Returns true if no coin was selected.
    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }
}

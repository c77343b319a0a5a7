// SPDX-License-Identifier: CC0-1.0
//
//! Confirmation policy filtering.

use std::collections::HashSet;

use crate::Utxo;

/// Minimum confirmation depth a candidate needs, depending on whether the
/// wallet created the transaction that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfirmationPolicy {
    /// Depth required for outputs of transactions this wallet created.
    pub min_conf_self: u32,
    /// Depth required for everything else.
    pub min_conf_others: u32,
}

impl ConfirmationPolicy {
    /// Create a policy from the two thresholds.
    pub const fn new(min_conf_self: u32, min_conf_others: u32) -> Self {
        ConfirmationPolicy { min_conf_self, min_conf_others }
    }

    /// Returns true if `utxo` is deep enough to be spent under this policy.
    pub fn accepts<U: Utxo>(&self, utxo: &U) -> bool {
        let required = if utxo.is_from_self() { self.min_conf_self } else { self.min_conf_others };
        utxo.confirmations() >= required
    }
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        DEFAULT_CONFIRMATION_TIERS[0]
    }
}

/// Policies tried in order by [`crate::select_coins`], strictest first.
pub const DEFAULT_CONFIRMATION_TIERS: [ConfirmationPolicy; 3] = [
    ConfirmationPolicy::new(1, 6),
    ConfirmationPolicy::new(1, 1),
    ConfirmationPolicy::new(0, 1),
];

/// Returns the candidates spendable under `policy`, in input order.
///
/// An outpoint seen a second time is dropped so it can never be counted
/// twice.
pub(crate) fn eligible<'a, U: Utxo>(candidates: &'a [U], policy: &ConfirmationPolicy) -> Vec<&'a U> {
    let mut seen = HashSet::with_capacity(candidates.len());

    candidates
        .iter()
        .filter(|u| policy.accepts(*u))
        .filter(|u| {
            let fresh = seen.insert(u.outpoint());
            if !fresh {
                log::warn!("ignoring duplicate candidate {}", u.outpoint());
            }
            fresh
        })
        .collect()
}

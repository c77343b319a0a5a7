// SPDX-License-Identifier: CC0-1.0
//
//! Selection errors.
//!
//! Insufficient funds is not an error: it is reported through
//! [`crate::SelectionResult::success`].  The variants here indicate a broken
//! request from the calling layer.

use bitcoin::Amount;
use thiserror::Error;

/// A request the selector refuses to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The target must be strictly positive.
    #[error("selection target must be greater than zero")]
    ZeroTarget,

    /// Summing the values of the eligible candidates exceeded the range of
    /// `Amount`.
    #[error("amount overflow while summing {0} candidate values")]
    Overflow(usize),

    /// The target plus the dust threshold overflowed.
    #[error("target {target} plus dust threshold {dust_threshold} overflows")]
    TargetOverflow { target: Amount, dust_threshold: Amount },
}

//! Fee estimation.
//!
//! The selector charges a fee per selected input and asks for it through
//! [`FeeEstimator`], so a market-based estimator can replace the flat rate
//! without touching selection.

use sompi_core::constants::DEFAULT_FEE_PER_INPUT;

/// Computes the total fee for a transaction spending `n` inputs.
pub trait FeeEstimator: Send + Sync {
    /// `None` when the fee is not representable in sompi.
    fn fee_for_input_count(&self, n: usize) -> Option<u64>;
}

/// Flat fee per input. The shipped estimator; its rate is configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFeePerInput(pub u64);

impl Default for FixedFeePerInput {
    fn default() -> Self {
        Self(DEFAULT_FEE_PER_INPUT)
    }
}

impl FeeEstimator for FixedFeePerInput {
    fn fee_for_input_count(&self, n: usize) -> Option<u64> {
        u64::try_from(n).ok()?.checked_mul(self.0)
    }
}

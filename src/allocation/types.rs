//! # Allocation Types
//!
//! $$
//! \mathbf{w} \in \Delta^{N-1} = \{\mathbf{w} : w_i \ge 0,\ \textstyle\sum_i w_i = 1\}
//! $$
//!
//! Shared result containers, configuration enums and the error taxonomy.

use thiserror::Error;

/// Errors surfaced by the allocation core.
///
/// Every operation in the core is a deterministic pure computation, so none
/// of these are retriable: a retry would reproduce the identical error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
  /// Fewer than two return periods were supplied; covariance is undefined.
  #[error("insufficient data: {periods} period(s) supplied, covariance needs at least 2")]
  InsufficientData {
    /// Number of periods in the offending return series.
    periods: usize,
  },

  /// Malformed configuration or input shape, rejected before any computation.
  #[error("invalid parameter: {0}")]
  InvalidParameter(String),

  /// Portfolio quadratic form went negative beyond numeric tolerance,
  /// indicating an ill-conditioned or non-PSD covariance estimate.
  #[error("negative portfolio variance {variance:e} exceeds tolerance {tolerance:e}")]
  NegativeVariance {
    /// Value of the quadratic form.
    variance: f64,
    /// Tolerance that was exceeded.
    tolerance: f64,
  },

  /// Zero or near-zero per-asset variance breaks inverse-variance weighting.
  #[error("degenerate variance {variance:e} for asset index {asset}")]
  DegenerateVariance {
    /// Canonical index of the offending asset.
    asset: usize,
    /// Estimated variance of that asset.
    variance: f64,
  },
}

/// Specialized result type for allocation operations.
pub type AllocationResult<T> = Result<T, AllocationError>;

/// Divisor used by the sample covariance estimator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CovDivisor {
  /// Divide by `P - 1` (unbiased sample covariance).
  #[default]
  Unbiased,
  /// Divide by `P` (maximum-likelihood estimate).
  Population,
}

/// Output of a single portfolio evaluation or allocation.
#[derive(Clone, Debug, Default)]
pub struct PortfolioResult {
  /// Portfolio weights in canonical asset order.
  pub weights: Vec<f64>,
  /// Expected portfolio return (annualized if inputs are annualized).
  pub expected_return: f64,
  /// Portfolio volatility (standard deviation).
  pub volatility: f64,
  /// Sharpe ratio computed as `(expected_return - risk_free) / volatility`,
  /// defined as zero when volatility is exactly zero.
  pub sharpe: f64,
}

//! # Portfolio Evaluation
//!
//! $$
//! \mu_p = \mathbf{w}^\top \mu, \qquad
//! \sigma_p = \sqrt{\mathbf{w}^\top \Sigma \mathbf{w}}
//! $$
//!
//! Shared pure evaluator turning a weight vector and a moment set into
//! expected return, volatility and Sharpe ratio.

use super::moments::MomentSet;
use super::types::AllocationError;
use super::types::AllocationResult;
use super::types::PortfolioResult;

/// Relative tolerance for a negative quadratic form before it is treated as
/// a broken covariance estimate rather than floating-point noise.
const NEGATIVE_VARIANCE_REL_TOL: f64 = 1e-10;

/// Evaluate a weight vector against annualized moments.
///
/// A quadratic form that is slightly negative (within tolerance, scaled by
/// the largest diagonal covariance entry) is clamped to zero; a larger
/// negative value fails with [`AllocationError::NegativeVariance`] instead
/// of being silently masked.
pub fn evaluate(
  weights: &[f64],
  moments: &MomentSet,
  risk_free: f64,
) -> AllocationResult<PortfolioResult> {
  let n = moments.n_assets();
  if weights.len() != n {
    return Err(AllocationError::InvalidParameter(format!(
      "{} weight(s) supplied for {n} asset(s)",
      weights.len()
    )));
  }

  let mean = moments.mean();
  let cov = moments.cov();

  let mut expected_return = 0.0;
  for i in 0..n {
    expected_return += weights[i] * mean[i];
  }

  let mut quad_form = 0.0;
  for i in 0..n {
    let mut row = 0.0;
    for j in 0..n {
      row += cov[(i, j)] * weights[j];
    }
    quad_form += weights[i] * row;
  }

  let scale = (0..n).fold(1.0f64, |acc, i| acc.max(cov[(i, i)].abs()));
  let tolerance = NEGATIVE_VARIANCE_REL_TOL * scale;
  if quad_form < -tolerance {
    return Err(AllocationError::NegativeVariance {
      variance: quad_form,
      tolerance,
    });
  }

  let volatility = quad_form.max(0.0).sqrt();
  let sharpe = if volatility > 0.0 {
    (expected_return - risk_free) / volatility
  } else {
    0.0
  };

  Ok(PortfolioResult {
    weights: weights.to_vec(),
    expected_return,
    volatility,
    sharpe,
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::Array1;
  use ndarray::Array2;

  use super::*;

  fn identity_moments(n: usize, sigma_sq: f64) -> MomentSet {
    let mean = Array1::from_elem(n, 0.1);
    let cov = Array2::from_diag(&Array1::from_elem(n, sigma_sq));
    MomentSet::new(mean, cov).unwrap()
  }

  #[test]
  fn equal_weight_identity_volatility_is_sigma_over_sqrt_n() {
    for n in [1usize, 4, 9] {
      let sigma = 0.3;
      let moments = identity_moments(n, sigma * sigma);
      let w = vec![1.0 / n as f64; n];
      let res = evaluate(&w, &moments, 0.0).unwrap();
      assert_abs_diff_eq!(res.volatility, sigma / (n as f64).sqrt(), epsilon = 1e-12);
    }
  }

  #[test]
  fn sharpe_is_zero_at_zero_volatility() {
    let moments = identity_moments(2, 0.04);
    let res = evaluate(&[0.0, 0.0], &moments, 0.0).unwrap();
    assert_eq!(res.volatility, 0.0);
    assert_eq!(res.sharpe, 0.0);
  }

  #[test]
  fn large_negative_quadratic_form_is_an_error() {
    // Non-PSD by construction: off-diagonal dominates the diagonal.
    let mean = Array1::from_vec(vec![0.1, 0.1]);
    let cov = Array2::from_shape_vec((2, 2), vec![1.0, -2.0, -2.0, 1.0]).unwrap();
    let moments = MomentSet::new(mean, cov).unwrap();

    let res = evaluate(&[0.5, 0.5], &moments, 0.0);
    assert!(matches!(
      res,
      Err(AllocationError::NegativeVariance { .. })
    ));
  }

  #[test]
  fn weight_length_mismatch_is_rejected() {
    let moments = identity_moments(3, 0.04);
    let res = evaluate(&[0.5, 0.5], &moments, 0.0);
    assert!(matches!(res, Err(AllocationError::InvalidParameter(_))));
  }

  #[test]
  fn sharpe_subtracts_the_risk_free_rate() {
    let moments = identity_moments(1, 0.04);
    let res = evaluate(&[1.0], &moments, 0.02).unwrap();
    assert!((res.sharpe - (0.1 - 0.02) / 0.2).abs() < 1e-12);
  }
}

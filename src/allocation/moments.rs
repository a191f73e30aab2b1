//! # Moment Estimation
//!
//! $$
//! \hat\mu_i = \frac{A}{P}\sum_t r_{t,i}, \qquad
//! \hat\Sigma_{ij} = \frac{A}{P-1}\sum_t (r_{t,i}-\bar r_i)(r_{t,j}-\bar r_j)
//! $$
//!
//! Annualized mean vector and covariance matrix estimated from a return
//! series. Both scale linearly with the annualization factor under the
//! i.i.d. assumption.

use ndarray::Array1;
use ndarray::Array2;

use super::data::ReturnSeries;
use super::types::AllocationError;
use super::types::AllocationResult;
use super::types::CovDivisor;

/// Per-asset variance at or below this threshold is treated as degenerate.
pub(crate) const DEGENERATE_VARIANCE_EPS: f64 = 1e-12;

/// Immutable annualized moment pair derived once per run.
#[derive(Clone, Debug)]
pub struct MomentSet {
  mean: Array1<f64>,
  cov: Array2<f64>,
}

impl MomentSet {
  /// Wrap a precomputed mean vector and covariance matrix.
  pub fn new(mean: Array1<f64>, cov: Array2<f64>) -> AllocationResult<Self> {
    let n = mean.len();
    if cov.nrows() != n || cov.ncols() != n {
      return Err(AllocationError::InvalidParameter(format!(
        "covariance is {}x{} for a {n}-asset mean vector",
        cov.nrows(),
        cov.ncols()
      )));
    }

    Ok(Self { mean, cov })
  }

  /// Number of assets covered by the moments.
  pub fn n_assets(&self) -> usize {
    self.mean.len()
  }

  /// Annualized mean-return vector.
  pub fn mean(&self) -> &Array1<f64> {
    &self.mean
  }

  /// Annualized covariance matrix.
  pub fn cov(&self) -> &Array2<f64> {
    &self.cov
  }

  /// Derive the correlation matrix from the covariance matrix.
  ///
  /// Fails with [`AllocationError::DegenerateVariance`] when a diagonal
  /// entry is at or below numeric zero, since the corresponding standard
  /// deviation cannot normalize anything.
  pub fn correlation(&self) -> AllocationResult<Array2<f64>> {
    let n = self.n_assets();
    let mut std = Vec::with_capacity(n);
    for i in 0..n {
      let v = self.cov[(i, i)];
      if v <= DEGENERATE_VARIANCE_EPS {
        return Err(AllocationError::DegenerateVariance {
          asset: i,
          variance: v,
        });
      }
      std.push(v.sqrt());
    }

    let mut corr = Array2::zeros((n, n));
    for i in 0..n {
      for j in 0..n {
        corr[(i, j)] = if i == j {
          1.0
        } else {
          (self.cov[(i, j)] / (std[i] * std[j])).clamp(-1.0, 1.0)
        };
      }
    }

    Ok(corr)
  }
}

/// Estimator turning a [`ReturnSeries`] into an annualized [`MomentSet`].
#[derive(Clone, Copy, Debug)]
pub struct MomentEstimator {
  /// Annualization factor (periods per year, 252 for daily data).
  pub periods_per_year: f64,
  /// Covariance divisor choice.
  pub divisor: CovDivisor,
}

impl Default for MomentEstimator {
  fn default() -> Self {
    Self {
      periods_per_year: 252.0,
      divisor: CovDivisor::Unbiased,
    }
  }
}

impl MomentEstimator {
  /// Estimate annualized moments. Pure; fails when fewer than two periods
  /// are supplied.
  pub fn estimate(&self, series: &ReturnSeries) -> AllocationResult<MomentSet> {
    let p = series.n_periods();
    if p < 2 {
      return Err(AllocationError::InsufficientData { periods: p });
    }

    let n = series.n_assets();
    let returns = series.returns();

    let mut mean_period = Array1::zeros(n);
    for i in 0..n {
      mean_period[i] = returns.column(i).sum() / p as f64;
    }

    let divisor = match self.divisor {
      CovDivisor::Unbiased => (p - 1) as f64,
      CovDivisor::Population => p as f64,
    };

    let mut cov = Array2::zeros((n, n));
    for i in 0..n {
      for j in i..n {
        let mut acc = 0.0;
        for t in 0..p {
          acc += (returns[(t, i)] - mean_period[i]) * (returns[(t, j)] - mean_period[j]);
        }
        let c = acc / divisor * self.periods_per_year;
        cov[(i, j)] = c;
        cov[(j, i)] = c;
      }
    }

    let mean = mean_period * self.periods_per_year;
    MomentSet::new(mean, cov)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn series(rows: &[Vec<f64>]) -> ReturnSeries {
    let assets = (0..rows[0].len()).map(|i| format!("A{i}")).collect();
    ReturnSeries::from_rows(assets, rows).unwrap()
  }

  #[test]
  fn fails_below_two_periods() {
    let s = series(&[vec![0.01, 0.02]]);
    let res = MomentEstimator::default().estimate(&s);
    assert!(matches!(
      res,
      Err(AllocationError::InsufficientData { periods: 1 })
    ));
  }

  #[test]
  fn annualizes_mean_and_covariance() {
    let s = series(&[vec![0.01], vec![0.03]]);
    let m = MomentEstimator::default().estimate(&s).unwrap();

    // mean 0.02 * 252, variance 2e-4 * 252 with the unbiased divisor
    assert!((m.mean()[0] - 0.02 * 252.0).abs() < 1e-12);
    assert!((m.cov()[(0, 0)] - 2e-4 * 252.0).abs() < 1e-10);
  }

  #[test]
  fn population_divisor_shrinks_covariance() {
    let s = series(&[vec![0.01], vec![0.03]]);
    let unbiased = MomentEstimator::default().estimate(&s).unwrap();
    let population = MomentEstimator {
      divisor: CovDivisor::Population,
      ..MomentEstimator::default()
    }
    .estimate(&s)
    .unwrap();

    assert!((population.cov()[(0, 0)] - unbiased.cov()[(0, 0)] * 0.5).abs() < 1e-12);
  }

  #[test]
  fn permutation_invariant_under_relabeling() {
    let rows = vec![
      vec![0.010, -0.004, 0.002],
      vec![-0.003, 0.007, 0.001],
      vec![0.005, 0.002, -0.006],
      vec![0.001, -0.001, 0.004],
    ];
    let permuted: Vec<Vec<f64>> = rows.iter().map(|r| vec![r[2], r[0], r[1]]).collect();

    let m = MomentEstimator::default().estimate(&series(&rows)).unwrap();
    let mp = MomentEstimator::default()
      .estimate(&series(&permuted))
      .unwrap();

    // permutation sends original index i to position perm[i]
    let perm = [1usize, 2, 0];
    for i in 0..3 {
      assert!((m.mean()[i] - mp.mean()[perm[i]]).abs() < 1e-12);
      for j in 0..3 {
        assert!((m.cov()[(i, j)] - mp.cov()[(perm[i], perm[j])]).abs() < 1e-12);
      }
    }
  }

  #[test]
  fn correlation_rejects_zero_variance() {
    let s = series(&[vec![0.01, 0.0], vec![0.03, 0.0]]);
    let m = MomentEstimator::default().estimate(&s).unwrap();
    assert!(matches!(
      m.correlation(),
      Err(AllocationError::DegenerateVariance { asset: 1, .. })
    ));
  }

  #[test]
  fn correlation_diagonal_is_one() {
    let s = series(&[
      vec![0.01, 0.02],
      vec![-0.02, 0.01],
      vec![0.015, -0.005],
    ]);
    let m = MomentEstimator::default().estimate(&s).unwrap();
    let corr = m.correlation().unwrap();

    assert!((corr[(0, 0)] - 1.0).abs() < 1e-12);
    assert!((corr[(1, 1)] - 1.0).abs() < 1e-12);
    assert!((corr[(0, 1)] - corr[(1, 0)]).abs() < 1e-12);
    assert!(corr[(0, 1)].abs() <= 1.0);
  }
}

//! # Return Series
//!
//! $$
//! r_{t,i} = \frac{p_{t,i}}{p_{t-1,i}} - 1
//! $$
//!
//! Validated holder for per-period, per-asset returns. The asset order fixed
//! at construction is the canonical index for every vector and matrix
//! downstream.

use ndarray::Array2;

use super::types::AllocationError;
use super::types::AllocationResult;

/// Time-indexed table of periodic returns, one column per asset.
///
/// Invariant: every period holds a finite return for every asset; gaps must
/// be resolved by the data collaborator before this boundary.
#[derive(Clone, Debug)]
pub struct ReturnSeries {
  assets: Vec<String>,
  returns: Array2<f64>,
}

impl ReturnSeries {
  /// Build a return series from an already materialized `P x N` matrix.
  pub fn new(assets: Vec<String>, returns: Array2<f64>) -> AllocationResult<Self> {
    if assets.is_empty() {
      return Err(AllocationError::InvalidParameter(
        "asset universe is empty".to_string(),
      ));
    }

    for (i, a) in assets.iter().enumerate() {
      if assets[..i].contains(a) {
        return Err(AllocationError::InvalidParameter(format!(
          "duplicate asset identifier `{a}`"
        )));
      }
    }

    if returns.ncols() != assets.len() {
      return Err(AllocationError::InvalidParameter(format!(
        "return matrix has {} column(s) for {} asset(s)",
        returns.ncols(),
        assets.len()
      )));
    }

    if returns.iter().any(|r| !r.is_finite()) {
      return Err(AllocationError::InvalidParameter(
        "return matrix contains non-finite values".to_string(),
      ));
    }

    Ok(Self { assets, returns })
  }

  /// Build a return series from row-major period rows.
  pub fn from_rows(assets: Vec<String>, rows: &[Vec<f64>]) -> AllocationResult<Self> {
    let n = assets.len();
    for (t, row) in rows.iter().enumerate() {
      if row.len() != n {
        return Err(AllocationError::InvalidParameter(format!(
          "period {t} has {} value(s) for {n} asset(s)",
          row.len()
        )));
      }
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    let returns = Array2::from_shape_vec((rows.len(), n), flat)
      .map_err(|e| AllocationError::InvalidParameter(e.to_string()))?;

    Self::new(assets, returns)
  }

  /// Convert closing-price rows to simple returns and build a series.
  ///
  /// `P + 1` price rows yield `P` return rows. Prices must be strictly
  /// positive.
  pub fn from_prices(assets: Vec<String>, prices: &[Vec<f64>]) -> AllocationResult<Self> {
    if prices.len() < 2 {
      return Err(AllocationError::InsufficientData {
        periods: prices.len().saturating_sub(1),
      });
    }

    let n = assets.len();
    let mut rows = Vec::with_capacity(prices.len() - 1);
    for t in 1..prices.len() {
      let (prev, curr) = (&prices[t - 1], &prices[t]);
      if prev.len() != n || curr.len() != n {
        return Err(AllocationError::InvalidParameter(format!(
          "price row {t} does not match universe size {n}"
        )));
      }

      let mut row = Vec::with_capacity(n);
      for i in 0..n {
        if prev[i] <= 0.0 {
          return Err(AllocationError::InvalidParameter(format!(
            "non-positive price {} for asset index {i} at row {}",
            prev[i],
            t - 1
          )));
        }
        row.push(curr[i] / prev[i] - 1.0);
      }
      rows.push(row);
    }

    Self::from_rows(assets, &rows)
  }

  /// Canonical ordered asset identifiers.
  pub fn assets(&self) -> &[String] {
    &self.assets
  }

  /// Number of assets in the universe.
  pub fn n_assets(&self) -> usize {
    self.assets.len()
  }

  /// Number of return periods.
  pub fn n_periods(&self) -> usize {
    self.returns.nrows()
  }

  /// Borrow the `P x N` return matrix.
  pub fn returns(&self) -> &Array2<f64> {
    &self.returns
  }
}

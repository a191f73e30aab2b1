//! # Monte Carlo Frontier Search
//!
//! $$
//! \max_{\mathbf{w}^{(k)}} \frac{\mu_p^{(k)} - r_f}{\sigma_p^{(k)}},
//! \qquad \mathbf{w}^{(k)} \sim \Delta^{N-1}
//! $$
//!
//! Draws many random long-only weight vectors, evaluates each against the
//! moment set and retains the full sample plus the max-Sharpe and
//! min-volatility portfolios.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::Dirichlet;
use rand_distr::Distribution;
use rayon::prelude::*;

use super::evaluate::evaluate;
use super::moments::MomentSet;
use super::types::AllocationError;
use super::types::AllocationResult;
use super::types::PortfolioResult;

/// Strategy for drawing a random point on the weight simplex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimplexSampler {
  /// N uniform [0,1) draws normalized by their sum. This is the commonly
  /// used approximation and the historical default; it is NOT a uniform
  /// sample of the simplex (that would require Dirichlet(1,...,1) draws)
  /// and is mildly biased toward the simplex center.
  #[default]
  UniformNormalized,
  /// Dirichlet(1,...,1) draws, an exact uniform simplex sample.
  Dirichlet,
}

/// Configuration for [`search`] and [`search_par`].
#[derive(Clone, Copy, Debug)]
pub struct MonteCarloConfig {
  /// Number of random portfolios to draw.
  pub num_trials: usize,
  /// Base seed; every trial derives its own generator from it.
  pub seed: u64,
  /// Risk-free rate used in Sharpe computations.
  pub risk_free: f64,
  /// Simplex sampling strategy.
  pub sampler: SimplexSampler,
}

impl Default for MonteCarloConfig {
  fn default() -> Self {
    Self {
      num_trials: 20_000,
      seed: 0,
      risk_free: 0.0,
      sampler: SimplexSampler::UniformNormalized,
    }
  }
}

/// Full Monte Carlo sample plus the two extremal portfolios.
#[derive(Clone, Debug)]
pub struct FrontierSample {
  /// Every evaluated trial in trial order, for downstream plotting.
  pub all: Vec<PortfolioResult>,
  /// Highest-Sharpe portfolio, ties broken by first-seen.
  pub max_sharpe: PortfolioResult,
  /// Lowest-volatility portfolio, ties broken by first-seen.
  pub min_volatility: PortfolioResult,
}

// Splitmix64 finalizer over a trial-indexed stream. The per-trial seed is a
// pure function of (seed, trial), so sequential and parallel searches see
// identical draws.
fn trial_seed(seed: u64, trial: u64) -> u64 {
  let mut z = seed.wrapping_add(trial.wrapping_mul(0x9E37_79B9_7F4A_7C15));
  z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
  z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
  z ^ (z >> 31)
}

fn draw_weights(n: usize, sampler: SimplexSampler, rng: &mut StdRng) -> AllocationResult<Vec<f64>> {
  if n == 1 {
    return Ok(vec![1.0]);
  }

  match sampler {
    SimplexSampler::UniformNormalized => {
      let raw: Vec<f64> = (0..n).map(|_| rng.gen::<f64>()).collect();
      let sum: f64 = raw.iter().sum();
      if sum <= 0.0 {
        // all-zero draw, vanishingly unlikely but well-defined
        return Ok(vec![1.0 / n as f64; n]);
      }
      Ok(raw.into_iter().map(|x| x / sum).collect())
    }
    SimplexSampler::Dirichlet => {
      let dirichlet = Dirichlet::new_with_size(1.0, n)
        .map_err(|e| AllocationError::InvalidParameter(format!("dirichlet sampler: {e}")))?;
      Ok(dirichlet.sample(rng))
    }
  }
}

fn run_trial(
  moments: &MomentSet,
  config: &MonteCarloConfig,
  trial: usize,
) -> AllocationResult<PortfolioResult> {
  let mut rng = StdRng::seed_from_u64(trial_seed(config.seed, trial as u64));
  let weights = draw_weights(moments.n_assets(), config.sampler, &mut rng)?;
  evaluate(&weights, moments, config.risk_free)
}

fn pick_extremes(all: Vec<PortfolioResult>) -> FrontierSample {
  let mut max_sharpe = all[0].clone();
  let mut min_volatility = all[0].clone();
  for r in &all[1..] {
    if r.sharpe > max_sharpe.sharpe {
      max_sharpe = r.clone();
    }
    if r.volatility < min_volatility.volatility {
      min_volatility = r.clone();
    }
  }

  FrontierSample {
    all,
    max_sharpe,
    min_volatility,
  }
}

fn validate(moments: &MomentSet, config: &MonteCarloConfig) -> AllocationResult<()> {
  if config.num_trials == 0 {
    return Err(AllocationError::InvalidParameter(
      "num_trials must be positive".to_string(),
    ));
  }
  if moments.n_assets() == 0 {
    return Err(AllocationError::InvalidParameter(
      "moment set covers no assets".to_string(),
    ));
  }
  Ok(())
}

/// Sequential Monte Carlo search. Deterministic given the configured seed.
pub fn search(moments: &MomentSet, config: &MonteCarloConfig) -> AllocationResult<FrontierSample> {
  validate(moments, config)?;

  let mut all = Vec::with_capacity(config.num_trials);
  for trial in 0..config.num_trials {
    all.push(run_trial(moments, config, trial)?);
  }

  Ok(pick_extremes(all))
}

/// Parallel Monte Carlo search over rayon workers.
///
/// Produces output identical to [`search`]: trials are independently seeded,
/// results are collected in trial order and the extremal scan runs over the
/// ordered vector.
pub fn search_par(
  moments: &MomentSet,
  config: &MonteCarloConfig,
) -> AllocationResult<FrontierSample> {
  validate(moments, config)?;

  let all = (0..config.num_trials)
    .into_par_iter()
    .map(|trial| run_trial(moments, config, trial))
    .collect::<AllocationResult<Vec<_>>>()?;

  Ok(pick_extremes(all))
}

#[cfg(test)]
mod tests {
  use ndarray::Array1;
  use ndarray::Array2;

  use super::*;

  fn sample_moments() -> MomentSet {
    let mean = Array1::from_vec(vec![0.10, 0.08, 0.12]);
    let cov = Array2::from_shape_vec(
      (3, 3),
      vec![
        0.040, 0.006, 0.000, //
        0.006, 0.010, 0.004, //
        0.000, 0.004, 0.090,
      ],
    )
    .unwrap();
    MomentSet::new(mean, cov).unwrap()
  }

  #[test]
  fn zero_trials_fail_fast() {
    let config = MonteCarloConfig {
      num_trials: 0,
      ..MonteCarloConfig::default()
    };
    let res = search(&sample_moments(), &config);
    assert!(matches!(res, Err(AllocationError::InvalidParameter(_))));
  }

  #[test]
  fn weights_stay_on_the_simplex() {
    for sampler in [SimplexSampler::UniformNormalized, SimplexSampler::Dirichlet] {
      let config = MonteCarloConfig {
        num_trials: 500,
        seed: 7,
        sampler,
        ..MonteCarloConfig::default()
      };
      let frontier = search(&sample_moments(), &config).unwrap();
      assert_eq!(frontier.all.len(), 500);

      for r in &frontier.all {
        let sum: f64 = r.weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(r.weights.iter().all(|&w| w >= -1e-12));
      }
    }
  }

  #[test]
  fn fixed_seed_reproduces_extremes() {
    let config = MonteCarloConfig {
      num_trials: 2_000,
      seed: 42,
      ..MonteCarloConfig::default()
    };

    let a = search(&sample_moments(), &config).unwrap();
    let b = search(&sample_moments(), &config).unwrap();

    assert_eq!(a.max_sharpe.weights, b.max_sharpe.weights);
    assert_eq!(a.min_volatility.weights, b.min_volatility.weights);
    assert_eq!(a.max_sharpe.sharpe, b.max_sharpe.sharpe);
  }

  #[test]
  fn parallel_search_matches_sequential() {
    let config = MonteCarloConfig {
      num_trials: 1_000,
      seed: 11,
      ..MonteCarloConfig::default()
    };

    let seq = search(&sample_moments(), &config).unwrap();
    let par = search_par(&sample_moments(), &config).unwrap();

    assert_eq!(seq.all.len(), par.all.len());
    assert_eq!(seq.max_sharpe.weights, par.max_sharpe.weights);
    assert_eq!(seq.min_volatility.weights, par.min_volatility.weights);
    for (s, p) in seq.all.iter().zip(par.all.iter()) {
      assert_eq!(s.weights, p.weights);
    }
  }

  #[test]
  fn extremes_come_from_the_sample() {
    let config = MonteCarloConfig {
      num_trials: 300,
      seed: 3,
      ..MonteCarloConfig::default()
    };
    let frontier = search(&sample_moments(), &config).unwrap();

    let best_sharpe = frontier
      .all
      .iter()
      .map(|r| r.sharpe)
      .fold(f64::NEG_INFINITY, f64::max);
    let least_vol = frontier
      .all
      .iter()
      .map(|r| r.volatility)
      .fold(f64::INFINITY, f64::min);

    assert_eq!(frontier.max_sharpe.sharpe, best_sharpe);
    assert_eq!(frontier.min_volatility.volatility, least_vol);
  }

  #[test]
  fn single_asset_universe_is_fully_allocated() {
    let moments = MomentSet::new(
      Array1::from_vec(vec![0.1]),
      Array2::from_shape_vec((1, 1), vec![0.04]).unwrap(),
    )
    .unwrap();
    let config = MonteCarloConfig {
      num_trials: 10,
      ..MonteCarloConfig::default()
    };

    let frontier = search(&moments, &config).unwrap();
    assert_eq!(frontier.max_sharpe.weights, vec![1.0]);
    assert_eq!(frontier.min_volatility.weights, vec![1.0]);
  }
}

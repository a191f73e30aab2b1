//! # Allocation Engine
//!
//! $$
//! \text{ReturnSeries} \mapsto (\mu, \Sigma) \mapsto
//! \{\text{frontier sample}, \text{HRP weights}\}
//! $$
//!
//! High-level orchestration: estimate moments once, then feed them
//! independently into the Monte Carlo search and the HRP allocator. The
//! engine is the only layer that logs; the core stays silent.

use tracing::debug;

use super::data::ReturnSeries;
use super::evaluate::evaluate;
use super::hrp::allocate_hrp;
use super::moments::MomentEstimator;
use super::moments::MomentSet;
use super::monte_carlo::FrontierSample;
use super::monte_carlo::MonteCarloConfig;
use super::monte_carlo::SimplexSampler;
use super::monte_carlo::search;
use super::monte_carlo::search_par;
use super::types::AllocationResult;
use super::types::CovDivisor;
use super::types::PortfolioResult;

/// Runtime configuration for [`AllocationEngine`].
#[derive(Clone, Copy, Debug)]
pub struct AllocationConfig {
  /// Annualization factor (periods per year).
  pub periods_per_year: f64,
  /// Covariance divisor choice.
  pub divisor: CovDivisor,
  /// Number of Monte Carlo trials.
  pub num_trials: usize,
  /// Base random seed for the Monte Carlo search.
  pub seed: u64,
  /// Risk-free rate for Sharpe computations.
  pub risk_free: f64,
  /// Simplex sampling strategy.
  pub sampler: SimplexSampler,
  /// Run the Monte Carlo trials over rayon workers.
  pub parallel: bool,
}

impl Default for AllocationConfig {
  fn default() -> Self {
    Self {
      periods_per_year: 252.0,
      divisor: CovDivisor::Unbiased,
      num_trials: 20_000,
      seed: 0,
      risk_free: 0.0,
      sampler: SimplexSampler::UniformNormalized,
      parallel: false,
    }
  }
}

/// Everything one engine run produces for reporting and plotting.
#[derive(Clone, Debug)]
pub struct AllocationReport {
  /// Annualized moments the allocators consumed.
  pub moments: MomentSet,
  /// Monte Carlo sample with max-Sharpe and min-volatility portfolios.
  pub frontier: FrontierSample,
  /// Evaluated HRP portfolio.
  pub hrp: PortfolioResult,
}

/// Single entry point wiring the estimator and both allocators together.
#[derive(Clone, Debug, Default)]
pub struct AllocationEngine {
  config: AllocationConfig,
}

impl AllocationEngine {
  /// Construct an engine with explicit configuration.
  pub fn new(config: AllocationConfig) -> Self {
    Self { config }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &AllocationConfig {
    &self.config
  }

  /// Run the full pipeline on a return series.
  pub fn run(&self, series: &ReturnSeries) -> AllocationResult<AllocationReport> {
    debug!(
      n_assets = series.n_assets(),
      n_periods = series.n_periods(),
      "estimating moments"
    );
    let estimator = MomentEstimator {
      periods_per_year: self.config.periods_per_year,
      divisor: self.config.divisor,
    };
    let moments = estimator.estimate(series)?;

    let mc = MonteCarloConfig {
      num_trials: self.config.num_trials,
      seed: self.config.seed,
      risk_free: self.config.risk_free,
      sampler: self.config.sampler,
    };
    debug!(
      num_trials = mc.num_trials,
      seed = mc.seed,
      parallel = self.config.parallel,
      "running Monte Carlo search"
    );
    let frontier = if self.config.parallel {
      search_par(&moments, &mc)?
    } else {
      search(&moments, &mc)?
    };

    debug!("running HRP allocation");
    let hrp_weights = allocate_hrp(&moments)?;
    let hrp = evaluate(&hrp_weights, &moments, self.config.risk_free)?;

    Ok(AllocationReport {
      moments,
      frontier,
      hrp,
    })
  }
}

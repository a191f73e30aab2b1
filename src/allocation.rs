//! # Allocation
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Portfolio allocation core: moment estimation, Monte Carlo efficient
//! frontier search and Hierarchical Risk Parity.

pub mod data;
pub mod engine;
pub mod evaluate;
pub mod hrp;
pub mod moments;
pub mod monte_carlo;
pub mod types;

pub use data::ReturnSeries;
pub use engine::AllocationConfig;
pub use engine::AllocationEngine;
pub use engine::AllocationReport;
pub use evaluate::evaluate;
pub use hrp::ClusterNode;
pub use hrp::ClusterTree;
pub use hrp::allocate_hrp;
pub use hrp::distance_matrix;
pub use hrp::single_linkage;
pub use moments::MomentEstimator;
pub use moments::MomentSet;
pub use monte_carlo::FrontierSample;
pub use monte_carlo::MonteCarloConfig;
pub use monte_carlo::SimplexSampler;
pub use monte_carlo::search;
pub use monte_carlo::search_par;
pub use types::AllocationError;
pub use types::AllocationResult;
pub use types::CovDivisor;
pub use types::PortfolioResult;

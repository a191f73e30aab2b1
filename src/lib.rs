//! # frontier-rs
//!
//! $$
//! \mathbf{w}^\* = \arg\max_{\mathbf{w} \in \Delta^{N-1}}
//! \frac{\mathbb E[R_p] - r_f}{\sigma_p}
//! $$
//!
//! Portfolio allocation over a fixed asset universe under two competing
//! theories: mean-variance optimization approximated by a seeded Monte Carlo
//! search of the long-only simplex, and Hierarchical Risk Parity built from
//! correlation-distance clustering, quasi-diagonal reordering and recursive
//! bisection. Console reporting and efficient-frontier charts live in
//! [`report`] and [`plot`]; the core in [`allocation`] performs no I/O.

pub mod allocation;
pub mod plot;
pub mod report;

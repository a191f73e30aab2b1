//! # Hierarchical Risk Parity
//!
//! $$
//! d_{ij} = \sqrt{\tfrac{1}{2}(1 - \rho_{ij})}, \qquad
//! \alpha = 1 - \frac{V_{\text{left}}}{V_{\text{left}} + V_{\text{right}}}
//! $$
//!
//! Lopez de Prado's three-stage allocator: single-linkage clustering on the
//! correlation-distance matrix, quasi-diagonal reordering of the covariance
//! matrix, and top-down recursive bisection of the weight mass. No sampling,
//! fully deterministic for a given moment set.

use ndarray::Array2;

use super::moments::DEGENERATE_VARIANCE_EPS;
use super::moments::MomentSet;
use super::types::AllocationError;
use super::types::AllocationResult;

const DISTANCE_TIE_EPS: f64 = 1e-12;

/// One merge step of the agglomeration. Child ids below the leaf count refer
/// to assets; higher ids refer to earlier merges (`id - n_leaves` indexes
/// the arena).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterNode {
  /// Left child id.
  pub left: usize,
  /// Right child id.
  pub right: usize,
  /// Single-linkage distance at which the children merged.
  pub distance: f64,
}

/// Binary merge tree over assets, stored as an arena of [`ClusterNode`]s in
/// merge order. Built once by [`single_linkage`], read-only afterward.
#[derive(Clone, Debug)]
pub struct ClusterTree {
  nodes: Vec<ClusterNode>,
  n_leaves: usize,
}

impl ClusterTree {
  /// Number of leaf assets.
  pub fn n_leaves(&self) -> usize {
    self.n_leaves
  }

  /// Merge nodes in creation order.
  pub fn nodes(&self) -> &[ClusterNode] {
    &self.nodes
  }

  /// Id of the root node (the final merge, or the lone leaf for `N == 1`).
  pub fn root(&self) -> usize {
    if self.nodes.is_empty() {
      0
    } else {
      self.n_leaves + self.nodes.len() - 1
    }
  }

  /// Left-to-right leaf traversal: the quasi-diagonal permutation of asset
  /// indices. The tree itself is the only source of order.
  pub fn leaf_order(&self) -> Vec<usize> {
    let mut order = Vec::with_capacity(self.n_leaves);
    let mut stack = vec![self.root()];
    while let Some(id) = stack.pop() {
      if id < self.n_leaves {
        order.push(id);
      } else {
        let node = self.nodes[id - self.n_leaves];
        stack.push(node.right);
        stack.push(node.left);
      }
    }
    order
  }
}

/// Map a correlation matrix to the correlation-distance matrix
/// `d = sqrt((1 - rho) / 2)`, with identical assets at distance 0 and
/// perfectly anti-correlated assets at distance 1.
pub fn distance_matrix(corr: &Array2<f64>) -> Array2<f64> {
  let n = corr.nrows();
  let mut dist = Array2::zeros((n, n));
  for i in 0..n {
    for j in 0..n {
      let rho = corr[(i, j)].clamp(-1.0, 1.0);
      dist[(i, j)] = ((1.0 - rho) / 2.0).max(0.0).sqrt();
    }
  }
  dist
}

/// Single-linkage agglomerative clustering over a distance matrix.
///
/// Merges the pair of clusters with the smallest minimum inter-member
/// distance until one root remains. Equal distances are broken by the
/// lexicographically smallest (min-member-index, min-member-index) pair, and
/// the child holding the smaller index becomes the left child, so the tree
/// and its leaf order are reproducible.
pub fn single_linkage(dist: &Array2<f64>) -> ClusterTree {
  struct Cluster {
    id: usize,
    members: Vec<usize>,
    key: usize,
  }

  let n = dist.nrows();
  let mut clusters: Vec<Cluster> = (0..n)
    .map(|i| Cluster {
      id: i,
      members: vec![i],
      key: i,
    })
    .collect();
  let mut nodes = Vec::with_capacity(n.saturating_sub(1));

  while clusters.len() > 1 {
    let mut best = (0usize, 1usize);
    let mut best_d = f64::INFINITY;
    let mut best_key = (usize::MAX, usize::MAX);

    for i in 0..clusters.len() {
      for j in (i + 1)..clusters.len() {
        let mut d = f64::INFINITY;
        for &a in &clusters[i].members {
          for &b in &clusters[j].members {
            d = d.min(dist[(a, b)]);
          }
        }

        let ka = clusters[i].key.min(clusters[j].key);
        let kb = clusters[i].key.max(clusters[j].key);
        if d + DISTANCE_TIE_EPS < best_d
          || ((d - best_d).abs() <= DISTANCE_TIE_EPS && (ka, kb) < best_key)
        {
          best = (i, j);
          best_d = d;
          best_key = (ka, kb);
        }
      }
    }

    let (i, j) = best;
    let second = clusters.remove(j);
    let first = clusters.remove(i);
    let (left, right) = if first.key <= second.key {
      (first, second)
    } else {
      (second, first)
    };

    nodes.push(ClusterNode {
      left: left.id,
      right: right.id,
      distance: best_d,
    });

    let mut members = left.members;
    members.extend(right.members);
    clusters.push(Cluster {
      id: n + nodes.len() - 1,
      members,
      key: left.key.min(right.key),
    });
  }

  ClusterTree { nodes, n_leaves: n }
}

/// Inverse-variance weights within a cluster, from diagonal covariance
/// entries only. Zero or near-zero variance is a hard error by policy; no
/// silent equal-weight fallback.
fn inverse_variance_weights(cov: &Array2<f64>, members: &[usize]) -> AllocationResult<Vec<f64>> {
  let mut inv = Vec::with_capacity(members.len());
  for &i in members {
    let v = cov[(i, i)];
    if v <= DEGENERATE_VARIANCE_EPS {
      return Err(AllocationError::DegenerateVariance {
        asset: i,
        variance: v,
      });
    }
    inv.push(1.0 / v);
  }

  let sum: f64 = inv.iter().sum();
  Ok(inv.into_iter().map(|x| x / sum).collect())
}

/// Variance of a cluster under its internal inverse-variance weighting,
/// using the full covariance sub-matrix of the cluster's assets.
fn cluster_variance(cov: &Array2<f64>, members: &[usize]) -> AllocationResult<f64> {
  let w = inverse_variance_weights(cov, members)?;
  let mut var = 0.0;
  for (a, &i) in members.iter().enumerate() {
    for (b, &j) in members.iter().enumerate() {
      var += w[a] * cov[(i, j)] * w[b];
    }
  }
  Ok(var.max(0.0))
}

/// Stage 3: split weight mass top-down along the quasi-diagonal order.
///
/// Every range splits at its midpoint (the extra element of an odd range
/// goes to the left half); each half scales by its share of inverse cluster
/// variance. The two halves of every split carry exactly the pre-split
/// weight, so the final weights sum to 1 by construction.
fn recursive_bisection(cov: &Array2<f64>, order: &[usize]) -> AllocationResult<Vec<f64>> {
  let n = order.len();
  let mut weights = vec![1.0; cov.nrows()];
  let mut ranges = vec![(0usize, n)];

  while let Some((start, end)) = ranges.pop() {
    let len = end - start;
    if len <= 1 {
      continue;
    }

    let mid = start + (len + 1) / 2;
    let left = &order[start..mid];
    let right = &order[mid..end];

    let lv = cluster_variance(cov, left)?;
    let rv = cluster_variance(cov, right)?;
    let denom = lv + rv;
    let alpha = if denom > 0.0 { 1.0 - lv / denom } else { 0.5 };

    for &i in left {
      weights[i] *= alpha;
    }
    for &i in right {
      weights[i] *= 1.0 - alpha;
    }

    ranges.push((start, mid));
    ranges.push((mid, end));
  }

  Ok(weights)
}

/// Compute the HRP weight vector for a moment set.
///
/// Deterministic; the covariance input is never mutated. Fails with
/// [`AllocationError::DegenerateVariance`] when any asset carries (near)
/// zero estimated variance.
pub fn allocate_hrp(moments: &MomentSet) -> AllocationResult<Vec<f64>> {
  let n = moments.n_assets();
  if n == 0 {
    return Err(AllocationError::InvalidParameter(
      "moment set covers no assets".to_string(),
    ));
  }
  if n == 1 {
    // still subject to the degenerate-variance policy
    inverse_variance_weights(moments.cov(), &[0])?;
    return Ok(vec![1.0]);
  }

  let corr = moments.correlation()?;
  let dist = distance_matrix(&corr);
  let tree = single_linkage(&dist);
  let order = tree.leaf_order();

  recursive_bisection(moments.cov(), &order)
}

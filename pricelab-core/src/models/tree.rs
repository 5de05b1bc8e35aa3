//! Single-feature regression tree (CART, squared-error criterion).
//!
//! Leaves store the one-step growth ratio `target / input` and predictions
//! rescale it by the input. A tree that stored price levels could never
//! forecast outside the range it was trained on; ratios let a trending series
//! keep trending.
//!
//! With one feature, sorting the samples once makes every node a contiguous
//! range of the sorted order, so split search is a prefix-sum scan.

use std::cmp::Ordering;

use super::{check_fit_input, not_fitted, Regressor};
use crate::error::PredictError;

/// Decision tree configuration.
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Maximum depth of tree (`None` grows until leaves are pure).
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node.
    pub min_samples_split: usize,
    /// Minimum samples in each leaf.
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Leaf {
        value: f64,
    },
    Split {
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub(crate) fn eval(&self, x: f64) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    threshold,
                    left,
                    right,
                } => node = if x <= *threshold { left } else { right },
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::Split { left, right, .. } => left.leaves() + right.leaves(),
        }
    }
}

/// Growth ratios `y / x`. Inputs must be strictly positive prices.
pub(crate) fn growth_ratios(name: &str, x: &[f64], y: &[f64]) -> Result<Vec<f64>, PredictError> {
    check_fit_input(name, x, y)?;
    if x.iter().any(|v| *v <= 0.0) {
        return Err(PredictError::ModelFitFailure(format!(
            "{name}: inputs must be positive prices"
        )));
    }
    Ok(x.iter().zip(y).map(|(a, b)| b / a).collect())
}

const PURITY_TOLERANCE: f64 = 1e-12;

struct Grower<'a> {
    config: &'a TreeConfig,
    xs: Vec<f64>,
    ys: Vec<f64>,
    center: f64,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl<'a> Grower<'a> {
    fn new(config: &'a TreeConfig, samples: impl Iterator<Item = (f64, f64)>) -> Self {
        let mut pairs: Vec<(f64, f64)> = samples.collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();

        // Prefix sums over centered targets limit cancellation in the SSE.
        let center = ys.iter().sum::<f64>() / ys.len().max(1) as f64;
        let mut sum = Vec::with_capacity(ys.len() + 1);
        let mut sum_sq = Vec::with_capacity(ys.len() + 1);
        sum.push(0.0);
        sum_sq.push(0.0);
        for y in &ys {
            let d = y - center;
            sum.push(sum[sum.len() - 1] + d);
            sum_sq.push(sum_sq[sum_sq.len() - 1] + d * d);
        }

        Self {
            config,
            xs,
            ys,
            center,
            sum,
            sum_sq,
        }
    }

    fn sse(&self, lo: usize, hi: usize) -> f64 {
        let n = (hi - lo) as f64;
        let s = self.sum[hi] - self.sum[lo];
        ((self.sum_sq[hi] - self.sum_sq[lo]) - s * s / n).max(0.0)
    }

    fn mean(&self, lo: usize, hi: usize) -> f64 {
        (self.sum[hi] - self.sum[lo]) / (hi - lo) as f64 + self.center
    }

    /// Targets equal up to rounding noise.
    fn is_pure(&self, lo: usize, hi: usize) -> bool {
        let (min, max) = self.ys[lo..hi]
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(*y), hi.max(*y)));
        max - min <= PURITY_TOLERANCE * max.abs().max(1.0)
    }

    fn build(&self, lo: usize, hi: usize, depth: usize) -> Node {
        let n = hi - lo;
        let leaf = || Node::Leaf {
            value: self.mean(lo, hi),
        };

        if n < self.config.min_samples_split
            || self.config.max_depth.is_some_and(|max| depth >= max)
            || self.is_pure(lo, hi)
        {
            return leaf();
        }

        let min_leaf = self.config.min_samples_leaf.max(1);
        let mut best: Option<(usize, f64)> = None;
        for k in (lo + min_leaf)..=(hi - min_leaf) {
            // Only split between distinct inputs.
            if self.xs[k - 1].partial_cmp(&self.xs[k]) != Some(Ordering::Less) {
                continue;
            }
            let cost = self.sse(lo, k) + self.sse(k, hi);
            if best.map_or(true, |(_, c)| cost < c) {
                best = Some((k, cost));
            }
        }

        match best {
            Some((k, _)) => Node::Split {
                threshold: (self.xs[k - 1] + self.xs[k]) / 2.0,
                left: Box::new(self.build(lo, k, depth + 1)),
                right: Box::new(self.build(k, hi, depth + 1)),
            },
            None => leaf(),
        }
    }
}

/// Grow a tree mapping `x` to `targets`.
pub(crate) fn grow(config: &TreeConfig, samples: impl Iterator<Item = (f64, f64)>) -> Node {
    let grower = Grower::new(config, samples);
    if grower.xs.is_empty() {
        return Node::Leaf { value: 1.0 };
    }
    grower.build(0, grower.xs.len(), 0)
}

/// Decision tree model.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    config: TreeConfig,
    root: Option<Node>,
}

impl DecisionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self { config, root: None }
    }

    pub fn depth(&self) -> usize {
        self.root.as_ref().map(Node::depth).unwrap_or(0)
    }

    pub fn n_leaves(&self) -> usize {
        self.root.as_ref().map(Node::leaves).unwrap_or(0)
    }
}

impl Regressor for DecisionTree {
    fn name(&self) -> &str {
        "DecisionTree"
    }

    fn fit(&mut self, x: &[f64], y: &[f64]) -> Result<(), PredictError> {
        let ratios = growth_ratios(self.name(), x, y)?;
        let root = grow(&self.config, x.iter().copied().zip(ratios));
        tracing::debug!(depth = root.depth(), leaves = root.leaves(), "decision tree grown");
        self.root = Some(root);
        Ok(())
    }

    fn predict(&self, x: &[f64]) -> Result<Vec<f64>, PredictError> {
        let root = self.root.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        Ok(x.iter().map(|&v| v * root.eval(v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memorizes_training_data() {
        let x = [10.0, 11.0, 12.5, 12.0, 14.0];
        let y = [11.0, 12.5, 12.0, 14.0, 13.0];
        let mut tree = DecisionTree::new(TreeConfig::default());
        tree.fit(&x, &y).unwrap();
        let predicted = tree.predict(&x).unwrap();
        for (p, t) in predicted.iter().zip(&y) {
            assert!((p - t).abs() < 1e-9);
        }
        assert_eq!(tree.n_leaves(), 5);
    }

    #[test]
    fn constant_growth_is_single_leaf_and_extrapolates() {
        let x: Vec<f64> = (0..20).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let y: Vec<f64> = x.iter().map(|v| v * 1.01).collect();
        let mut tree = DecisionTree::new(TreeConfig::default());
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.n_leaves(), 1);
        let next = tree.predict_one(200.0).unwrap();
        assert!((next - 202.0).abs() < 1e-9);
    }

    #[test]
    fn max_depth_limits_growth() {
        let x: Vec<f64> = (1..=64).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| v * (1.0 + (v * 0.7).sin() * 0.05)).collect();
        let mut tree = DecisionTree::new(TreeConfig {
            max_depth: Some(3),
            ..TreeConfig::default()
        });
        tree.fit(&x, &y).unwrap();
        assert!(tree.depth() <= 4);
        assert!(tree.n_leaves() <= 8);
    }

    #[test]
    fn duplicate_inputs_are_never_separated() {
        let x = [5.0, 5.0, 6.0];
        let y = [5.5, 6.0, 6.6];
        let mut tree = DecisionTree::new(TreeConfig::default());
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn rejects_non_positive_inputs() {
        let mut tree = DecisionTree::new(TreeConfig::default());
        assert!(tree.fit(&[0.0, 1.0], &[1.0, 2.0]).is_err());
    }
}

//! Random forest: bootstrap-aggregated regression trees.
//!
//! Trees are grown in parallel with rayon. Each tree draws its bootstrap
//! sample from its own sub-seed, so the fitted forest is identical regardless
//! of thread count or scheduling.

use rand::Rng;
use rayon::prelude::*;

use super::tree::{grow, growth_ratios, Node, TreeConfig};
use super::{not_fitted, Regressor};
use crate::error::PredictError;
use crate::rng::SeedHierarchy;

const TREE_SEED_SCOPE: &str = "RandomForest/tree";

#[derive(Debug, Clone)]
pub struct ForestConfig {
    /// Number of trees.
    pub n_trees: usize,
    /// Configuration shared by every tree.
    pub tree: TreeConfig,
    /// Fit each tree on a bootstrap sample instead of the full partition.
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            tree: TreeConfig::default(),
            bootstrap: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    seeds: SeedHierarchy,
    trees: Vec<Node>,
}

impl RandomForest {
    pub fn new(config: ForestConfig, seeds: SeedHierarchy) -> Self {
        Self {
            config,
            seeds,
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for RandomForest {
    fn name(&self) -> &str {
        "RandomForest"
    }

    fn fit(&mut self, x: &[f64], y: &[f64]) -> Result<(), PredictError> {
        let ratios = growth_ratios(self.name(), x, y)?;
        if self.config.n_trees == 0 {
            return Err(PredictError::ModelFitFailure(
                "RandomForest: n_trees must be > 0".into(),
            ));
        }

        let n = x.len();
        let seeds = self.seeds;
        let config = &self.config;
        let trees: Vec<Node> = (0..config.n_trees)
            .into_par_iter()
            .map(|i| {
                if config.bootstrap {
                    let mut rng = seeds.rng_for(TREE_SEED_SCOPE, i as u64);
                    let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                    grow(&config.tree, sample.into_iter().map(|j| (x[j], ratios[j])))
                } else {
                    grow(&config.tree, x.iter().copied().zip(ratios.iter().copied()))
                }
            })
            .collect();

        tracing::debug!(trees = trees.len(), samples = n, "random forest grown");
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: &[f64]) -> Result<Vec<f64>, PredictError> {
        if self.trees.is_empty() {
            return Err(not_fitted(self.name()));
        }
        let count = self.trees.len() as f64;
        Ok(x.iter()
            .map(|&v| {
                let ratio = self.trees.iter().map(|t| t.eval(v)).sum::<f64>() / count;
                v * ratio
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_trend(n: usize) -> (Vec<f64>, Vec<f64>) {
        let closes: Vec<f64> = (0..=n)
            .map(|i| 100.0 + i as f64 * 0.5 + (i as f64 * 1.3).sin() * 2.0)
            .collect();
        (closes[..n].to_vec(), closes[1..].to_vec())
    }

    #[test]
    fn same_seed_same_forest() {
        let (x, y) = noisy_trend(80);
        let mut a = RandomForest::new(ForestConfig::default(), SeedHierarchy::new(42));
        let mut b = RandomForest::new(ForestConfig::default(), SeedHierarchy::new(42));
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.n_trees(), 100);
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn different_seed_different_forest() {
        let (x, y) = noisy_trend(80);
        let mut a = RandomForest::new(ForestConfig::default(), SeedHierarchy::new(1));
        let mut b = RandomForest::new(ForestConfig::default(), SeedHierarchy::new(2));
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_ne!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn explains_training_data() {
        let (x, y) = noisy_trend(120);
        let mut forest = RandomForest::new(ForestConfig::default(), SeedHierarchy::default());
        forest.fit(&x, &y).unwrap();
        assert!(forest.score(&x, &y).unwrap() > 0.9);
    }

    #[test]
    fn without_bootstrap_every_tree_matches_single_tree() {
        let (x, y) = noisy_trend(30);
        let config = ForestConfig {
            n_trees: 3,
            bootstrap: false,
            ..ForestConfig::default()
        };
        let mut forest = RandomForest::new(config, SeedHierarchy::default());
        forest.fit(&x, &y).unwrap();
        let predicted = forest.predict(&x).unwrap();
        for (p, t) in predicted.iter().zip(&y) {
            assert!((p - t).abs() < 1e-9);
        }
    }

    #[test]
    fn predict_before_fit_fails() {
        let forest = RandomForest::new(ForestConfig::default(), SeedHierarchy::default());
        assert!(forest.predict(&[1.0]).is_err());
    }
}

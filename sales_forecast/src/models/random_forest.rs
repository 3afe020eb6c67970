//! Random forest regression built from bootstrapped CART trees

use crate::error::Result;
use crate::models::tree::{RegressionTree, TreeParams};
use crate::models::{validate_training_data, ModelKind, RegressionModel, TrainedRegressor};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random forest model
#[derive(Debug, Clone)]
pub struct RandomForest {
    /// Number of trees
    n_estimators: usize,
    /// Growth limits shared by every tree
    params: TreeParams,
    /// Base seed; tree `t` draws its bootstrap sample from `seed + t`
    seed: u64,
}

/// Trained random forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedRandomForest {
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl Default for RandomForest {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            params: TreeParams::default(),
            seed: 42,
        }
    }
}

impl RandomForest {
    /// Create a forest with a custom tree count and seed
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        Self {
            n_estimators: n_estimators.max(1),
            seed,
            ..Self::default()
        }
    }

    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }
}

impl RegressionModel for RandomForest {
    type Trained = TrainedRandomForest;

    fn train(&self, x: &[Vec<f64>], y: &[f64]) -> Result<Self::Trained> {
        let n_features = validate_training_data(self.kind(), x, y)?;
        let n = x.len();

        let trees: Vec<RegressionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(t as u64));
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(x, y, &sample, &self.params)
            })
            .collect();

        Ok(TrainedRandomForest { n_features, trees })
    }

    fn kind(&self) -> ModelKind {
        ModelKind::RandomForest
    }
}

impl TrainedRandomForest {
    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }
}

impl TrainedRegressor for TrainedRandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_unchecked(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        total / self.trees.len() as f64
    }
}

//! CART regression trees shared by the forest and boosting models

use serde::{Deserialize, Serialize};

/// Growth limits for a regression tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    /// Maximum depth, `None` grows until leaves are pure or too small
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs before it may split
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

/// Tree node; children are indices into the owning tree's node list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted regression tree stored as a flat node list, root first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    score: f64,
}

impl RegressionTree {
    /// Fit a tree on the rows of `x` named by `sample`.
    ///
    /// `sample` may repeat indices, which is how bootstrap draws are
    /// passed in. Splits minimise the summed squared error of the children.
    pub fn fit(x: &[Vec<f64>], y: &[f64], sample: &[usize], params: &TreeParams) -> Self {
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut pending = vec![(0usize, sample.to_vec(), 0usize)];

        while let Some((slot, indices, depth)) = pending.pop() {
            let value = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;

            let can_split = indices.len() >= params.min_samples_split.max(2)
                && params.max_depth.map_or(true, |max| depth < max)
                && indices.iter().any(|&i| y[i] != y[indices[0]]);

            let split = if can_split {
                best_split(x, y, &indices, params.min_samples_leaf.max(1))
            } else {
                None
            };

            match split {
                Some(split) => {
                    let (left, right): (Vec<usize>, Vec<usize>) = indices
                        .into_iter()
                        .partition(|&i| x[i][split.feature] <= split.threshold);

                    if left.is_empty() || right.is_empty() {
                        nodes[slot] = Node::Leaf { value };
                        continue;
                    }

                    let left_slot = nodes.len();
                    nodes.push(Node::Leaf { value: 0.0 });
                    let right_slot = nodes.len();
                    nodes.push(Node::Leaf { value: 0.0 });

                    nodes[slot] = Node::Split {
                        feature: split.feature,
                        threshold: split.threshold,
                        left: left_slot,
                        right: right_slot,
                    };
                    pending.push((right_slot, right, depth + 1));
                    pending.push((left_slot, left, depth + 1));
                }
                None => nodes[slot] = Node::Leaf { value },
            }
        }

        Self { nodes }
    }

    /// Predict by walking from the root to a leaf
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Length of the longest root-to-leaf path, in edges
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((index, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Node::Split { left, right, .. } = &self.nodes[index] {
                stack.push((*left, depth + 1));
                stack.push((*right, depth + 1));
            }
        }
        deepest
    }
}

/// Best variance-reducing split over all features, if any improves on the parent
fn best_split(x: &[Vec<f64>], y: &[f64], indices: &[usize], min_leaf: usize) -> Option<SplitCandidate> {
    let n = indices.len();
    let total: f64 = indices.iter().map(|&i| y[i]).sum();
    // Maximising sum^2 / count over both children minimises their squared error
    let parent_score = total * total / n as f64;
    let width = x[indices[0]].len();

    let mut best: Option<SplitCandidate> = None;
    let mut order = indices.to_vec();

    for feature in 0..width {
        order.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_sum = 0.0;
        for k in 0..n - 1 {
            left_sum += y[order[k]];
            let left_count = k + 1;
            let right_count = n - left_count;

            let here = x[order[k]][feature];
            let next = x[order[k + 1]][feature];
            if here == next || left_count < min_leaf || right_count < min_leaf {
                continue;
            }

            let right_sum = total - left_sum;
            let score = left_sum * left_sum / left_count as f64
                + right_sum * right_sum / right_count as f64;

            if score > parent_score + 1e-12 * parent_score.abs().max(1.0)
                && best.as_ref().map_or(true, |b| score > b.score)
            {
                best = Some(SplitCandidate {
                    feature,
                    threshold: here + (next - here) / 2.0,
                    score,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_function_is_learned() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| if i < 5 { 1.0 } else { 9.0 }).collect();
        let sample: Vec<usize> = (0..10).collect();

        let tree = RegressionTree::fit(&x, &y, &sample, &TreeParams::default());

        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.predict(&[2.0]), 1.0);
        assert_eq!(tree.predict(&[7.5]), 9.0);
        assert_eq!(tree.predict(&[4.5]), 1.0);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x: Vec<Vec<f64>> = (0..64).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..64).map(|i| (i * i) as f64).collect();
        let sample: Vec<usize> = (0..64).collect();
        let params = TreeParams {
            max_depth: Some(3),
            ..TreeParams::default()
        };

        let tree = RegressionTree::fit(&x, &y, &sample, &params);

        assert_eq!(tree.depth(), 3);
        assert!(tree.node_count() <= 15);
    }

    #[test]
    fn test_unbounded_tree_fits_training_data() {
        let x: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64, (i % 4) as f64]).collect();
        let y: Vec<f64> = (0..30).map(|i| (i % 7) as f64 * 3.0).collect();
        let sample: Vec<usize> = (0..30).collect();

        let tree = RegressionTree::fit(&x, &y, &sample, &TreeParams::default());

        for (row, target) in x.iter().zip(&y) {
            assert_eq!(tree.predict(row), *target);
        }
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x: Vec<Vec<f64>> = (0..5).map(|i| vec![i as f64]).collect();
        let y = vec![4.0; 5];

        let tree = RegressionTree::fit(&x, &y, &[0, 1, 2, 3, 4], &TreeParams::default());

        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(&[100.0]), 4.0);
    }

    #[test]
    fn test_repeated_sample_indices() {
        let x: Vec<Vec<f64>> = vec![vec![0.0], vec![1.0]];
        let y = vec![0.0, 10.0];

        let tree = RegressionTree::fit(&x, &y, &[1, 1, 1], &TreeParams::default());

        assert_eq!(tree.predict(&[0.0]), 10.0);
    }
}

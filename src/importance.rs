//! Permutation-based feature importance.
//!
//! For each tree and feature: permute that feature's values across the
//! tree's OOB rows, re-evaluate the frozen tree, and record the increase
//! in error over the unpermuted baseline. Per-feature importances are the
//! mean of those increases across all trees with a non-empty OOB set.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::dataset::{ClassificationDataset, RegressionDataset};
use crate::model::argmax;
use crate::oob::{
    squared_distance, tree_oob_error_classification, tree_oob_error_regression,
};
use crate::tree::Tree;

/// Per-feature error increases for one classification tree.
pub(crate) fn tree_importances_classification(
    tree: &Tree,
    dataset: &ClassificationDataset,
    oob_rows: &[usize],
    rng: &mut ChaCha8Rng,
) -> Vec<f64> {
    let baseline = tree_oob_error_classification(tree, dataset, oob_rows);
    (0..dataset.n_features())
        .map(|feature| {
            let permuted = permuted_column(dataset.features(), oob_rows, feature, rng);
            let wrong = oob_rows
                .iter()
                .zip(permuted.iter())
                .filter(|&(&row, &value)| {
                    let mut sample = dataset.row(row).to_vec();
                    sample[feature] = value;
                    argmax(tree.predict(&sample)) != dataset.label(row)
                })
                .count();
            wrong as f64 / oob_rows.len() as f64 - baseline
        })
        .collect()
}

/// Per-feature error increases for one regression tree.
pub(crate) fn tree_importances_regression(
    tree: &Tree,
    dataset: &RegressionDataset,
    oob_rows: &[usize],
    rng: &mut ChaCha8Rng,
) -> Vec<f64> {
    let baseline = tree_oob_error_regression(tree, dataset, oob_rows);
    (0..dataset.n_features())
        .map(|feature| {
            let permuted = permuted_column(dataset.features(), oob_rows, feature, rng);
            let total: f64 = oob_rows
                .iter()
                .zip(permuted.iter())
                .map(|(&row, &value)| {
                    let mut sample = dataset.row(row).to_vec();
                    sample[feature] = value;
                    squared_distance(tree.predict(&sample), dataset.label(row))
                })
                .sum();
            total / oob_rows.len() as f64 - baseline
        })
        .collect()
}

/// Collect one feature column over the OOB rows and shuffle it.
fn permuted_column(
    features: &[Vec<f64>],
    oob_rows: &[usize],
    feature: usize,
    rng: &mut ChaCha8Rng,
) -> Vec<f64> {
    let mut values: Vec<f64> = oob_rows.iter().map(|&row| features[row][feature]).collect();
    values.shuffle(rng);
    values
}

/// Average per-tree importance vectors into the ensemble importances.
///
/// Trees without OOB rows contribute nothing; returns `None` when no tree
/// produced importances.
pub(crate) fn aggregate_importances(per_tree: &[Vec<f64>], n_features: usize) -> Option<Vec<f64>> {
    if per_tree.is_empty() {
        return None;
    }
    let mut totals = vec![0.0f64; n_features];
    for importances in per_tree {
        for (t, &v) in totals.iter_mut().zip(importances.iter()) {
            *t += v;
        }
    }
    let n = per_tree.len() as f64;
    totals.iter_mut().for_each(|t| *t /= n);
    Some(totals)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn aggregate_is_mean_across_trees() {
        let per_tree = vec![vec![0.2, 0.0], vec![0.4, 0.1]];
        let agg = aggregate_importances(&per_tree, 2).unwrap();
        assert!((agg[0] - 0.3).abs() < 1e-12);
        assert!((agg[1] - 0.05).abs() < 1e-12);
    }

    #[test]
    fn aggregate_of_nothing_is_none() {
        assert!(aggregate_importances(&[], 3).is_none());
    }

    #[test]
    fn ignored_feature_has_zero_importance() {
        // A single-leaf tree ignores every feature: permuting cannot change
        // its predictions, so all importances are exactly zero.
        let dataset = ClassificationDataset::new(
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            vec![0, 1],
        )
        .unwrap();
        let tree = Tree::from_nodes(vec![crate::node::NodeInfo::leaf(0, vec![1.0, 0.0])]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let imp = tree_importances_classification(&tree, &dataset, &[0, 1], &mut rng);
        assert_eq!(imp, vec![0.0, 0.0]);
    }
}

//! Random Forest training with parallel tree construction.

use std::sync::Mutex;

use rand::Rng;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::{ForestConfig, ResolvedConfig};
use crate::dataset::{ClassificationDataset, RegressionDataset};
use crate::error::ForestError;
use crate::importance::{
    aggregate_importances, tree_importances_classification, tree_importances_regression,
};
use crate::model::{RandomForest, Task};
use crate::oob::{
    ensemble_oob_error_classification, ensemble_oob_error_regression,
    tree_oob_error_classification, tree_oob_error_regression,
};
use crate::result::{TrainingMetadata, TrainingResult};
use crate::table::build_attribute_tables;
use crate::tree::{Tree, grow_classification_tree, grow_regression_tree};

/// One finished tree with its held-out rows and optional importances,
/// tagged with its tree index so the ensemble can be ordered
/// deterministically after the parallel phase.
struct GrownTree {
    index: usize,
    tree: Tree,
    oob_rows: Vec<usize>,
    oob_error: Option<f64>,
    importances: Option<Vec<f64>>,
}

/// Shuffle the row indices and split them into a training subset of
/// `subset_size` rows and the complementary out-of-bag subset.
fn draw_row_partition(
    n_rows: usize,
    subset_size: usize,
    rng: &mut impl Rng,
) -> (Vec<usize>, Vec<usize>) {
    let mut rows: Vec<usize> = (0..n_rows).collect();
    rows.shuffle(rng);
    let oob_rows = rows.split_off(subset_size);
    (rows, oob_rows)
}

/// Training subset size: `⌊N·ratio⌋`, but never less than one row.
fn subset_size(n_rows: usize, oob_ratio: f64) -> usize {
    ((n_rows as f64 * oob_ratio) as usize).max(1)
}

/// Per-tree seeds drawn from a master generator, giving each tree an
/// independent random stream regardless of thread scheduling.
fn tree_seeds(master_seed: u64, n_trees: usize) -> Vec<u64> {
    let mut master_rng = ChaCha8Rng::seed_from_u64(master_seed);
    (0..n_trees).map(|_| master_rng.r#gen()).collect()
}

fn metadata(resolved: &ResolvedConfig, n_rows: usize, n_features: usize) -> TrainingMetadata {
    TrainingMetadata {
        n_trees: resolved.trees,
        n_rows,
        n_features,
        mtry: resolved.mtry,
        node_size: resolved.node_size,
        oob_ratio: resolved.oob_ratio,
        subset_size: subset_size(n_rows, resolved.oob_ratio),
    }
}

/// Unwrap the shared accumulator after the parallel phase and restore the
/// deterministic tree order.
fn into_sorted(grown: Mutex<Vec<GrownTree>>) -> Vec<GrownTree> {
    let mut grown = grown.into_inner().expect("ensemble lock poisoned");
    grown.sort_by_key(|g| g.index);
    grown
}

/// Train a classification forest.
#[instrument(skip_all, fields(n_rows = dataset.n_rows(), n_features = dataset.n_features()))]
pub(crate) fn train_classification(
    config: &ForestConfig,
    dataset: &ClassificationDataset,
) -> Result<TrainingResult, ForestError> {
    let n_rows = dataset.n_rows();
    let n_features = dataset.n_features();
    let n_classes = dataset.n_classes();
    let resolved = config.resolve(n_features, false)?;
    let subset = subset_size(n_rows, resolved.oob_ratio);

    info!(
        n_trees = resolved.trees,
        mtry = resolved.mtry,
        node_size = resolved.node_size,
        subset_size = subset,
        n_classes,
        "training classification forest"
    );

    let compute_oob_error = config.compute_oob_error;
    let compute_importances = config.compute_importances;
    let grown: Mutex<Vec<GrownTree>> = Mutex::new(Vec::with_capacity(resolved.trees));

    tree_seeds(config.seed, resolved.trees)
        .into_par_iter()
        .enumerate()
        .for_each(|(index, seed)| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (train_rows, oob_rows) = draw_row_partition(n_rows, subset, &mut rng);

            let boot_features: Vec<Vec<f64>> =
                train_rows.iter().map(|&r| dataset.row(r).to_vec()).collect();
            let boot_labels: Vec<usize> =
                train_rows.iter().map(|&r| dataset.label(r)).collect();
            let mut counts = vec![0usize; n_classes];
            for &label in &boot_labels {
                counts[label] += 1;
            }

            let tables = build_attribute_tables(&boot_features, n_features);
            let nodes = grow_classification_tree(
                tables,
                &boot_labels,
                counts,
                0,
                resolved.node_size,
                resolved.mtry,
                &mut rng,
            );
            let tree = Tree::from_nodes(nodes);

            let oob_error = if compute_oob_error && !oob_rows.is_empty() {
                Some(tree_oob_error_classification(&tree, dataset, &oob_rows))
            } else {
                None
            };
            let importances = if compute_importances && !oob_rows.is_empty() {
                Some(tree_importances_classification(&tree, dataset, &oob_rows, &mut rng))
            } else {
                None
            };

            // Critical region: the shared ensemble accumulator is the only
            // mutable state touched by more than one tree.
            let mut ensemble = grown.lock().expect("ensemble lock poisoned");
            ensemble.push(GrownTree {
                index,
                tree,
                oob_rows,
                oob_error,
                importances,
            });
        });

    let grown = into_sorted(grown);
    debug!(n_trees_grown = grown.len(), "tree growth complete");

    let mut forest = RandomForest::new(Task::Classification { n_classes }, n_features);
    let mut oob_rows_per_tree = Vec::with_capacity(grown.len());
    let mut per_tree_oob_errors = Vec::with_capacity(grown.len());
    let mut per_tree_importances = Vec::new();
    for g in grown {
        forest.add_tree(g.tree);
        oob_rows_per_tree.push(g.oob_rows);
        per_tree_oob_errors.push(g.oob_error);
        if let Some(imp) = g.importances {
            per_tree_importances.push(imp);
        }
    }

    // Aggregate statistics are committed only after every tree has finished.
    let oob_error = if config.compute_oob_error {
        Some(ensemble_oob_error_classification(
            forest.trees(),
            dataset,
            &oob_rows_per_tree,
        )?)
    } else {
        None
    };
    let importances = if config.compute_importances {
        aggregate_importances(&per_tree_importances, n_features)
    } else {
        None
    };

    info!(oob_error, "classification forest training complete");

    Ok(TrainingResult::new(
        forest,
        oob_error,
        per_tree_oob_errors,
        importances,
        oob_rows_per_tree,
        metadata(&resolved, n_rows, n_features),
    ))
}

/// Train a regression forest.
#[instrument(skip_all, fields(n_rows = dataset.n_rows(), n_features = dataset.n_features()))]
pub(crate) fn train_regression(
    config: &ForestConfig,
    dataset: &RegressionDataset,
) -> Result<TrainingResult, ForestError> {
    let n_rows = dataset.n_rows();
    let n_features = dataset.n_features();
    let label_dimension = dataset.label_dimension();
    let resolved = config.resolve(n_features, true)?;
    let subset = subset_size(n_rows, resolved.oob_ratio);

    info!(
        n_trees = resolved.trees,
        mtry = resolved.mtry,
        node_size = resolved.node_size,
        subset_size = subset,
        label_dimension,
        "training regression forest"
    );

    let compute_oob_error = config.compute_oob_error;
    let compute_importances = config.compute_importances;
    let grown: Mutex<Vec<GrownTree>> = Mutex::new(Vec::with_capacity(resolved.trees));

    tree_seeds(config.seed, resolved.trees)
        .into_par_iter()
        .enumerate()
        .for_each(|(index, seed)| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (train_rows, oob_rows) = draw_row_partition(n_rows, subset, &mut rng);

            let boot_features: Vec<Vec<f64>> =
                train_rows.iter().map(|&r| dataset.row(r).to_vec()).collect();
            let boot_labels: Vec<Vec<f64>> =
                train_rows.iter().map(|&r| dataset.label(r).to_vec()).collect();

            let tables = build_attribute_tables(&boot_features, n_features);
            let nodes = grow_regression_tree(
                tables,
                &boot_labels,
                0,
                resolved.node_size,
                resolved.mtry,
                &mut rng,
            );
            let tree = Tree::from_nodes(nodes);

            let oob_error = if compute_oob_error && !oob_rows.is_empty() {
                Some(tree_oob_error_regression(&tree, dataset, &oob_rows))
            } else {
                None
            };
            let importances = if compute_importances && !oob_rows.is_empty() {
                Some(tree_importances_regression(&tree, dataset, &oob_rows, &mut rng))
            } else {
                None
            };

            let mut ensemble = grown.lock().expect("ensemble lock poisoned");
            ensemble.push(GrownTree {
                index,
                tree,
                oob_rows,
                oob_error,
                importances,
            });
        });

    let grown = into_sorted(grown);
    debug!(n_trees_grown = grown.len(), "tree growth complete");

    let mut forest = RandomForest::new(Task::Regression { label_dimension }, n_features);
    let mut oob_rows_per_tree = Vec::with_capacity(grown.len());
    let mut per_tree_oob_errors = Vec::with_capacity(grown.len());
    let mut per_tree_importances = Vec::new();
    for g in grown {
        forest.add_tree(g.tree);
        oob_rows_per_tree.push(g.oob_rows);
        per_tree_oob_errors.push(g.oob_error);
        if let Some(imp) = g.importances {
            per_tree_importances.push(imp);
        }
    }

    let oob_error = if config.compute_oob_error {
        Some(ensemble_oob_error_regression(
            forest.trees(),
            dataset,
            &oob_rows_per_tree,
        )?)
    } else {
        None
    };
    let importances = if config.compute_importances {
        aggregate_importances(&per_tree_importances, n_features)
    } else {
        None
    };

    info!(oob_error, "regression forest training complete");

    Ok(TrainingResult::new(
        forest,
        oob_error,
        per_tree_oob_errors,
        importances,
        oob_rows_per_tree,
        metadata(&resolved, n_rows, n_features),
    ))
}

//! End-to-end properties of Random Forest training.
//!
//! These tests exercise the full pipeline on deterministic synthetic
//! datasets: ensemble size, reproducibility, OOB estimation, permutation
//! importances, and regression behavior.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use taiga::{ClassificationDataset, ForestConfig, RegressionDataset, Task};

// ---------------------------------------------------------------------------
// Helpers: deterministic synthetic datasets
// ---------------------------------------------------------------------------

/// Generate a 180-sample, 5-feature, 3-class dataset.
///
/// Features 0-1 are informative (class * 4.0 + noise in [0, 0.5]);
/// features 2-4 are pure noise in [0, 0.5].
fn make_classification() -> ClassificationDataset {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let n_samples = 180;
    let n_classes = 3;

    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let class = i % n_classes;
        labels.push(class);
        let row: Vec<f64> = (0..5)
            .map(|f| {
                let base = if f < 2 { class as f64 * 4.0 } else { 0.0 };
                base + rng.r#gen::<f64>() * 0.5
            })
            .collect();
        features.push(row);
    }
    ClassificationDataset::new(features, labels).unwrap()
}

/// Generate a 120-sample, 3-feature regression dataset where the scalar
/// target is 2·x0 plus noise; features 1-2 are noise.
fn make_regression() -> RegressionDataset {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let n_samples = 120;

    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let x0: f64 = rng.r#gen::<f64>() * 10.0;
        let row = vec![x0, rng.r#gen::<f64>(), rng.r#gen::<f64>()];
        labels.push(vec![2.0 * x0 + rng.r#gen::<f64>() * 0.1]);
        features.push(row);
    }
    RegressionDataset::new(features, labels).unwrap()
}

// ---------------------------------------------------------------------------
// Ensemble assembly
// ---------------------------------------------------------------------------

/// Training B trees must yield exactly B trees, regardless of how the
/// parallel growth interleaves.
#[test]
fn ensemble_has_exactly_the_configured_tree_count() {
    let dataset = make_classification();
    let result = ForestConfig::new()
        .with_trees(37)
        .with_seed(42)
        .fit_classification(&dataset)
        .unwrap();
    assert_eq!(result.forest().n_trees(), 37);
    assert_eq!(result.oob_rows_per_tree().len(), 37);
}

/// Unset parameters resolve to the documented defaults.
#[test]
fn defaults_resolved_in_metadata() {
    let dataset = make_classification();
    let result = ForestConfig::new()
        .with_trees(5)
        .fit_classification(&dataset)
        .unwrap();
    let meta = result.metadata();
    assert_eq!(meta.mtry, 3); // ceil(sqrt(5))
    assert_eq!(meta.node_size, 1);
    assert!((meta.oob_ratio - 0.66).abs() < f64::EPSILON);
    assert_eq!(meta.subset_size, 118); // floor(180 * 0.66)
    assert_eq!(result.forest().task(), Task::Classification { n_classes: 3 });
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

/// Same config and seed must produce identical trees across runs; per-tree
/// random streams cannot depend on thread scheduling.
#[test]
fn same_seed_reproduces_identical_trees() {
    let dataset = make_classification();
    let config = ForestConfig::new().with_trees(20).with_seed(99);

    let result1 = config.fit_classification(&dataset).unwrap();
    let result2 = config.fit_classification(&dataset).unwrap();

    assert_eq!(result1.oob_rows_per_tree(), result2.oob_rows_per_tree());
    for (t1, t2) in result1.forest().trees().iter().zip(result2.forest().trees()) {
        assert_eq!(t1.n_nodes(), t2.n_nodes());
        for (n1, n2) in t1.nodes().iter().zip(t2.nodes()) {
            assert_eq!(n1.node_id, n2.node_id);
            assert_eq!(n1.attribute_index, n2.attribute_index);
            assert_eq!(n1.attribute_value.to_bits(), n2.attribute_value.to_bits());
            assert_eq!(n1.is_leaf, n2.is_leaf);
        }
    }
}

/// Different seeds should produce different forests on a noisy dataset.
#[test]
fn different_seeds_differ() {
    let dataset = make_classification();
    let result1 = ForestConfig::new()
        .with_trees(10)
        .with_seed(1)
        .fit_classification(&dataset)
        .unwrap();
    let result2 = ForestConfig::new()
        .with_trees(10)
        .with_seed(2)
        .fit_classification(&dataset)
        .unwrap();
    assert_ne!(result1.oob_rows_per_tree(), result2.oob_rows_per_tree());
}

// ---------------------------------------------------------------------------
// Accuracy and OOB estimation
// ---------------------------------------------------------------------------

/// A 50-tree forest must memorize an easily separable training set.
#[test]
fn training_accuracy_on_separable_classes() {
    let dataset = make_classification();
    let result = ForestConfig::new()
        .with_trees(50)
        .with_seed(42)
        .fit_classification(&dataset)
        .unwrap();

    let predictions = result
        .forest()
        .predict_class_batch(dataset.features())
        .unwrap();
    let correct = predictions
        .iter()
        .zip(dataset.labels())
        .filter(|&(&p, &l)| p == l)
        .count();
    let accuracy = correct as f64 / dataset.n_rows() as f64;
    assert!(accuracy > 0.95, "training accuracy {accuracy} <= 0.95");
}

/// OOB error must be available when requested and small on separable data.
#[test]
fn oob_error_computed_and_small() {
    let dataset = make_classification();
    let result = ForestConfig::new()
        .with_trees(50)
        .with_seed(42)
        .with_oob_error(true)
        .fit_classification(&dataset)
        .unwrap();

    let oob = result.oob_error().expect("OOB error must be computed");
    assert!(oob < 0.2, "oob error {oob} >= 0.2");
}

/// When OOB estimation is enabled, every tree with held-out rows reports
/// its own error alongside the ensemble aggregate.
#[test]
fn per_tree_oob_errors_reported_per_tree() {
    let dataset = make_classification();
    let result = ForestConfig::new()
        .with_trees(10)
        .with_seed(42)
        .with_oob_error(true)
        .fit_classification(&dataset)
        .unwrap();

    let errors = result.per_tree_oob_errors();
    assert_eq!(errors.len(), 10);
    for (error, oob_rows) in errors.iter().zip(result.oob_rows_per_tree()) {
        assert!(!oob_rows.is_empty());
        let error = error.expect("tree with held-out rows must have an OOB error");
        assert!((0.0..=1.0).contains(&error));
    }
}

/// OOB error is absent when not requested.
#[test]
fn oob_error_absent_by_default() {
    let dataset = make_classification();
    let result = ForestConfig::new()
        .with_trees(5)
        .fit_classification(&dataset)
        .unwrap();
    assert!(result.oob_error().is_none());
    assert!(result.per_tree_oob_errors().iter().all(Option::is_none));
    assert!(result.importances().is_none());
}

// ---------------------------------------------------------------------------
// Permutation feature importance
// ---------------------------------------------------------------------------

/// Informative features must outrank noise features.
#[test]
fn informative_features_rank_above_noise() {
    let dataset = make_classification();
    let result = ForestConfig::new()
        .with_trees(50)
        .with_seed(42)
        .with_importances(true)
        .fit_classification(&dataset)
        .unwrap();

    let importances = result.importances().expect("importances must be computed");
    assert_eq!(importances.len(), 5);
    let max_noise = importances[2..]
        .iter()
        .fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    assert!(
        importances[0] > max_noise && importances[1] > max_noise,
        "informative {:?} vs noise max {max_noise}",
        &importances[..2]
    );
}

// ---------------------------------------------------------------------------
// Regression
// ---------------------------------------------------------------------------

/// The 4-row step-function dataset: the split must fall between feature
/// values 2 and 3, giving a depth-1 tree with leaf means 1 and 9.
#[test]
fn step_function_regression_end_to_end() {
    let dataset = RegressionDataset::new(
        vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]],
        vec![vec![1.0], vec![1.0], vec![9.0], vec![9.0]],
    )
    .unwrap();
    let result = ForestConfig::new()
        .with_trees(1)
        .with_mtry(1)
        .with_node_size(1)
        .with_oob_ratio(1.0)
        .with_seed(42)
        .fit_regression(&dataset)
        .unwrap();

    let tree = &result.forest().trees()[0];
    assert_eq!(tree.depth(), 1);
    assert_eq!(tree.n_nodes(), 3);
    let nodes = tree.nodes();
    assert!(
        nodes[0].attribute_value >= 2.0 && nodes[0].attribute_value < 3.0,
        "split threshold {} not between 2 and 3",
        nodes[0].attribute_value
    );
    assert_eq!(nodes[1].label, vec![1.0]);
    assert_eq!(nodes[2].label, vec![9.0]);

    assert_eq!(result.forest().predict_mean(&[1.5]).unwrap(), vec![1.0]);
    assert_eq!(result.forest().predict_mean(&[3.5]).unwrap(), vec![9.0]);

    let forest = result.into_forest();
    assert_eq!(forest.n_trees(), 1);
    assert_eq!(forest.predict_mean(&[1.5]).unwrap(), vec![1.0]);
}

/// A regression forest must track a linear signal closely on training data.
#[test]
fn regression_tracks_linear_signal() {
    let dataset = make_regression();
    let result = ForestConfig::new()
        .with_trees(50)
        .with_mtry(2)
        .with_seed(42)
        .with_oob_error(true)
        .fit_regression(&dataset)
        .unwrap();

    let predictions = result
        .forest()
        .predict_mean_batch(dataset.features())
        .unwrap();
    let mse: f64 = predictions
        .iter()
        .zip(dataset.labels())
        .map(|(p, l)| (p[0] - l[0]) * (p[0] - l[0]))
        .sum::<f64>()
        / dataset.n_rows() as f64;
    assert!(mse < 1.0, "training mse {mse} >= 1.0");

    // OOB error is larger than training error but still bounded for a
    // strong signal with range [0, 20].
    let oob = result.oob_error().expect("OOB error must be computed");
    assert!(oob < 5.0, "oob mse {oob} >= 5.0");
    assert!(result.per_tree_oob_errors().iter().all(Option::is_some));
}

/// With the OOB ratio at 1.0 every row trains every tree, so requesting
/// OOB error must fail.
#[test]
fn full_bootstrap_makes_oob_unavailable() {
    let dataset = make_classification();
    let err = ForestConfig::new()
        .with_trees(3)
        .with_oob_ratio(1.0)
        .with_oob_error(true)
        .fit_classification(&dataset)
        .unwrap_err();
    assert!(matches!(err, taiga::ForestError::OobUnavailable { .. }));
}

/// An out-of-range OOB ratio is rejected up front.
#[test]
fn invalid_oob_ratio_rejected() {
    let dataset = make_classification();
    let err = ForestConfig::new()
        .with_oob_ratio(1.5)
        .fit_classification(&dataset)
        .unwrap_err();
    assert!(matches!(err, taiga::ForestError::InvalidOobRatio { .. }));
}

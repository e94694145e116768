//! Out-of-bag error estimation, per tree and for the whole ensemble.

use crate::dataset::{ClassificationDataset, RegressionDataset};
use crate::error::ForestError;
use crate::model::argmax;
use crate::tree::Tree;

/// Zero-one error of one tree on its held-out rows.
///
/// Returns 0.0 for an empty OOB set; callers skip such trees when
/// aggregating.
pub(crate) fn tree_oob_error_classification(
    tree: &Tree,
    dataset: &ClassificationDataset,
    oob_rows: &[usize],
) -> f64 {
    if oob_rows.is_empty() {
        return 0.0;
    }
    let wrong = oob_rows
        .iter()
        .filter(|&&row| argmax(tree.predict(dataset.row(row))) != dataset.label(row))
        .count();
    wrong as f64 / oob_rows.len() as f64
}

/// Mean squared error of one tree on its held-out rows.
pub(crate) fn tree_oob_error_regression(
    tree: &Tree,
    dataset: &RegressionDataset,
    oob_rows: &[usize],
) -> f64 {
    if oob_rows.is_empty() {
        return 0.0;
    }
    let total: f64 = oob_rows
        .iter()
        .map(|&row| squared_distance(tree.predict(dataset.row(row)), dataset.label(row)))
        .sum();
    total / oob_rows.len() as f64
}

pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(&x, &y)| (x - y) * (x - y)).sum()
}

/// Ensemble OOB error for classification: per row, majority vote over the
/// trees that held that row out; the error is the misclassified fraction
/// of rows with at least one vote.
pub(crate) fn ensemble_oob_error_classification(
    trees: &[Tree],
    dataset: &ClassificationDataset,
    oob_rows_per_tree: &[Vec<usize>],
) -> Result<f64, ForestError> {
    let n_rows = dataset.n_rows();
    let mut votes = vec![vec![0usize; dataset.n_classes()]; n_rows];
    let mut covered = vec![false; n_rows];

    for (tree, oob_rows) in trees.iter().zip(oob_rows_per_tree.iter()) {
        for &row in oob_rows {
            let predicted = argmax(tree.predict(dataset.row(row)));
            votes[row][predicted] += 1;
            covered[row] = true;
        }
    }

    let n_covered = covered.iter().filter(|&&c| c).count();
    if n_covered == 0 {
        return Err(ForestError::OobUnavailable {
            reason: "no row was held out by any tree".to_string(),
        });
    }

    let wrong = votes
        .iter()
        .enumerate()
        .filter(|&(row, row_votes)| {
            covered[row] && argmax_counts(row_votes) != dataset.label(row)
        })
        .count();
    Ok(wrong as f64 / n_covered as f64)
}

/// Ensemble OOB error for regression: per row, average the predictions of
/// the trees that held that row out; the error is the mean squared distance
/// to the true label over covered rows.
pub(crate) fn ensemble_oob_error_regression(
    trees: &[Tree],
    dataset: &RegressionDataset,
    oob_rows_per_tree: &[Vec<usize>],
) -> Result<f64, ForestError> {
    let n_rows = dataset.n_rows();
    let label_dimension = dataset.label_dimension();
    let mut sums = vec![vec![0.0f64; label_dimension]; n_rows];
    let mut counts = vec![0usize; n_rows];

    for (tree, oob_rows) in trees.iter().zip(oob_rows_per_tree.iter()) {
        for &row in oob_rows {
            for (s, &p) in sums[row].iter_mut().zip(tree.predict(dataset.row(row)).iter()) {
                *s += p;
            }
            counts[row] += 1;
        }
    }

    let n_covered = counts.iter().filter(|&&c| c > 0).count();
    if n_covered == 0 {
        return Err(ForestError::OobUnavailable {
            reason: "no row was held out by any tree".to_string(),
        });
    }

    let mut total = 0.0;
    for (row, count) in counts.iter().enumerate() {
        if *count == 0 {
            continue;
        }
        let mean: Vec<f64> = sums[row].iter().map(|&s| s / *count as f64).collect();
        total += squared_distance(&mean, dataset.label(row));
    }
    Ok(total / n_covered as f64)
}

fn argmax_counts(counts: &[usize]) -> usize {
    counts
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1))
        .map(|(index, _)| index)
        .unwrap_or(0)
}

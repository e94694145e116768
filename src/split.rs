//! Best-split search over presorted attribute tables.
//!
//! Both variants sweep each candidate table once, left to right, updating
//! running class counts (classification) or label sums (regression), and
//! evaluate a boundary only between adjacent entries with distinct values.

use std::collections::BTreeSet;

use rand::Rng;

use crate::table::AttributeTables;

/// Gini impurity of a class-count vector: `1 - Σ (count_j / n)²`.
///
/// Returns 0.0 for an empty range; callers never evaluate empty sides.
#[must_use]
pub fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    let sum_sq: f64 = counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum();
    1.0 - sum_sq
}

/// Normalize a class-count vector into a probability histogram.
///
/// Every class slot is represented, so classes absent from the counts get
/// an explicit 0.0 of the same fixed length.
pub(crate) fn class_histogram(counts: &[usize]) -> Vec<f64> {
    let total: usize = counts.iter().sum();
    counts.iter().map(|&c| c as f64 / total as f64).collect()
}

/// Draw `mtry` distinct attribute indices uniformly from `[0, n_features)`.
///
/// Rejection-samples into an ordered set, so callers iterate candidates in
/// ascending index order; ties between equally good splits then resolve to
/// the lowest attribute index.
pub(crate) fn draw_split_attributes(
    n_features: usize,
    mtry: usize,
    rng: &mut impl Rng,
) -> BTreeSet<usize> {
    let mut candidates = BTreeSet::new();
    while candidates.len() < mtry {
        candidates.insert(rng.gen_range(0..n_features));
    }
    candidates
}

/// The winning split position shared by both search variants.
#[derive(Debug, Clone)]
pub(crate) struct SplitPoint {
    /// Feature column the split tests.
    pub(crate) attribute_index: usize,
    /// Index of the last left-side entry in the winning attribute table.
    pub(crate) boundary: usize,
    /// Split threshold: rows with `value <= threshold` go left.
    pub(crate) threshold: f64,
}

/// Best classification split, with the class counts of both sides so the
/// tree builder can recurse without recounting.
#[derive(Debug, Clone)]
pub(crate) struct ClassificationSplit {
    pub(crate) point: SplitPoint,
    pub(crate) counts_left: Vec<usize>,
    pub(crate) counts_right: Vec<usize>,
}

/// Find the lowest-impurity classification split among the candidate attributes.
///
/// `counts` holds the class counts over every row in scope. The sweep keeps
/// a below/above count pair per attribute and scores each valid boundary as
/// `n1·gini(below) + n2·gini(above)`, tracking the strict minimum against a
/// sentinel of `n + 1`. Returns `None` when no boundary beats the sentinel,
/// which forces the node into a leaf.
pub(crate) fn best_classification_split(
    tables: &AttributeTables,
    labels: &[usize],
    counts: &[usize],
    candidates: &BTreeSet<usize>,
) -> Option<ClassificationSplit> {
    let n = tables[0].len();
    let mut best_impurity = n as f64 + 1.0;
    let mut best: Option<ClassificationSplit> = None;

    for &attribute_index in candidates {
        let table = &tables[attribute_index];
        let mut below = vec![0usize; counts.len()];
        let mut above = counts.to_vec();

        for i in 1..n {
            let prev = i - 1;
            let class = labels[table[prev].row];
            below[class] += 1;
            above[class] -= 1;

            // A run of equal values cannot be split.
            if table[prev].value == table[i].value {
                continue;
            }

            let n1 = i;
            let n2 = n - n1;
            let impurity = n1 as f64 * gini(&below, n1) + n2 as f64 * gini(&above, n2);
            if impurity < best_impurity {
                best_impurity = impurity;
                best = Some(ClassificationSplit {
                    point: SplitPoint {
                        attribute_index,
                        boundary: prev,
                        threshold: table[prev].value,
                    },
                    counts_left: below.clone(),
                    counts_right: above.clone(),
                });
            }
        }
    }

    best
}

/// Sum of squared distances from the mean over `labels[start..start + len]`,
/// given the precomputed label sum of that range.
///
/// Panics when the range is empty or out of bounds; both indicate a logic
/// bug in the caller.
pub(crate) fn total_sum_of_squares(
    labels: &[&[f64]],
    start: usize,
    len: usize,
    sum: &[f64],
) -> f64 {
    assert!(len >= 1, "sum of squares over an empty range");
    assert!(start + len <= labels.len(), "sum of squares range out of bounds");

    let mean: Vec<f64> = sum.iter().map(|&s| s / len as f64).collect();
    let mut sum_of_squares = 0.0;
    for label in &labels[start..start + len] {
        sum_of_squares += label
            .iter()
            .zip(mean.iter())
            .map(|(&l, &m)| (l - m) * (l - m))
            .sum::<f64>();
    }
    sum_of_squares
}

/// Find the lowest-variance regression split among the candidate attributes.
///
/// Per attribute, the labels are visited in the table's sort order while a
/// prefix/suffix label-sum pair is maintained; each valid boundary is scored
/// as `(n1·SSE_left + n2·SSE_right) / n`. A boundary is accepted only when
/// it strictly improves on the best found so far, starting from "no split".
pub(crate) fn best_regression_split(
    tables: &AttributeTables,
    labels: &[Vec<f64>],
    candidates: &BTreeSet<usize>,
) -> Option<RegressionSplit> {
    let n = tables[0].len();
    let label_dimension = labels[0].len();
    let mut best_impurity: Option<f64> = None;
    let mut best: Option<RegressionSplit> = None;

    for &attribute_index in candidates {
        let table = &tables[attribute_index];

        // Labels in this attribute's sort order.
        let ordered: Vec<&[f64]> = table.iter().map(|e| labels[e.row].as_slice()).collect();

        let mut suffix_sum = vec![0.0f64; label_dimension];
        for label in &ordered {
            for (s, &l) in suffix_sum.iter_mut().zip(label.iter()) {
                *s += l;
            }
        }
        let mut prefix_sum = vec![0.0f64; label_dimension];
        for ((p, s), &l) in prefix_sum.iter_mut().zip(suffix_sum.iter_mut()).zip(ordered[0]) {
            *p += l;
            *s -= l;
        }

        for i in 1..n {
            let prev = i - 1;
            if table[prev].value != table[i].value {
                let n1 = i;
                let n2 = n - n1;
                let impurity = (n1 as f64 * total_sum_of_squares(&ordered, 0, n1, &prefix_sum)
                    + n2 as f64 * total_sum_of_squares(&ordered, n1, n2, &suffix_sum))
                    / n as f64;

                if best_impurity.is_none_or(|b| impurity < b) {
                    best_impurity = Some(impurity);
                    best = Some(RegressionSplit {
                        point: SplitPoint {
                            attribute_index,
                            boundary: prev,
                            threshold: table[prev].value,
                        },
                    });
                }
            }

            for ((p, s), &l) in prefix_sum.iter_mut().zip(suffix_sum.iter_mut()).zip(ordered[i]) {
                *p += l;
                *s -= l;
            }
        }
    }

    best
}

/// Best regression split; the sides are recovered from the tables, so only
/// the split point is carried.
#[derive(Debug, Clone)]
pub(crate) struct RegressionSplit {
    pub(crate) point: SplitPoint,
}

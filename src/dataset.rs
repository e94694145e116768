//! Validated row-major dataset containers.

use crate::error::ForestError;

/// Validate the feature matrix shared by both dataset kinds.
///
/// Checks that the matrix is non-empty, rectangular, and contains only
/// finite values. Returns the number of feature columns.
fn validate_features(features: &[Vec<f64>]) -> Result<usize, ForestError> {
    if features.is_empty() {
        return Err(ForestError::EmptyDataset);
    }
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(ForestError::ZeroFeatures);
    }
    for (row, values) in features.iter().enumerate() {
        if values.len() != n_features {
            return Err(ForestError::FeatureCountMismatch {
                expected: n_features,
                got: values.len(),
                row,
            });
        }
        for (column, &value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(ForestError::NonFiniteValue { row, column });
            }
        }
    }
    Ok(n_features)
}

/// A classification dataset: row-major features plus zero-based class labels.
///
/// The class cardinality is derived from the largest label seen, so every
/// class in `0..n_classes` gets a slot in leaf histograms even when absent
/// from a bootstrap subset.
#[derive(Debug, Clone)]
pub struct ClassificationDataset {
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
    n_features: usize,
    n_classes: usize,
}

impl ClassificationDataset {
    /// Create a dataset from row-major features and class labels.
    ///
    /// # Errors
    ///
    /// | Variant | When |
    /// |---|---|
    /// | [`ForestError::EmptyDataset`] | `features` is empty |
    /// | [`ForestError::ZeroFeatures`] | rows have zero feature columns |
    /// | [`ForestError::FeatureCountMismatch`] | rows have inconsistent lengths |
    /// | [`ForestError::NonFiniteValue`] | any value is NaN or infinite |
    /// | [`ForestError::LabelCountMismatch`] | label count differs from row count |
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<usize>) -> Result<Self, ForestError> {
        let n_features = validate_features(&features)?;
        if labels.len() != features.len() {
            return Err(ForestError::LabelCountMismatch {
                rows: features.len(),
                labels: labels.len(),
            });
        }
        let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
        Ok(Self {
            features,
            labels,
            n_features,
            n_classes,
        })
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.features.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of distinct classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return the feature vector of one row.
    #[must_use]
    pub fn row(&self, index: usize) -> &[f64] {
        &self.features[index]
    }

    /// Return the class label of one row.
    #[must_use]
    pub fn label(&self, index: usize) -> usize {
        self.labels[index]
    }

    /// Return the full row-major feature matrix.
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return all class labels.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }
}

/// A regression dataset: row-major features plus real-valued label vectors.
///
/// All labels must share one dimension; scalar targets are 1-vectors.
#[derive(Debug, Clone)]
pub struct RegressionDataset {
    features: Vec<Vec<f64>>,
    labels: Vec<Vec<f64>>,
    n_features: usize,
    label_dimension: usize,
}

impl RegressionDataset {
    /// Create a dataset from row-major features and label vectors.
    ///
    /// # Errors
    ///
    /// Same feature-matrix validation as [`ClassificationDataset::new`],
    /// plus [`ForestError::LabelDimensionMismatch`] when label vectors have
    /// inconsistent dimensions and [`ForestError::NonFiniteValue`] for
    /// non-finite label entries.
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<Vec<f64>>) -> Result<Self, ForestError> {
        let n_features = validate_features(&features)?;
        if labels.len() != features.len() {
            return Err(ForestError::LabelCountMismatch {
                rows: features.len(),
                labels: labels.len(),
            });
        }
        let label_dimension = labels[0].len();
        for (row, label) in labels.iter().enumerate() {
            if label.len() != label_dimension {
                return Err(ForestError::LabelDimensionMismatch {
                    expected: label_dimension,
                    got: label.len(),
                    row,
                });
            }
            for (column, &value) in label.iter().enumerate() {
                if !value.is_finite() {
                    return Err(ForestError::NonFiniteValue { row, column });
                }
            }
        }
        Ok(Self {
            features,
            labels,
            n_features,
            label_dimension,
        })
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.features.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the dimension of the label vectors.
    #[must_use]
    pub fn label_dimension(&self) -> usize {
        self.label_dimension
    }

    /// Return the feature vector of one row.
    #[must_use]
    pub fn row(&self, index: usize) -> &[f64] {
        &self.features[index]
    }

    /// Return the label vector of one row.
    #[must_use]
    pub fn label(&self, index: usize) -> &[f64] {
        &self.labels[index]
    }

    /// Return the full row-major feature matrix.
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return all label vectors.
    #[must_use]
    pub fn labels(&self) -> &[Vec<f64>] {
        &self.labels
    }
}

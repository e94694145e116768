//! Training result types.

use crate::model::RandomForest;

/// Resolved parameters and dataset shape for one training run.
#[derive(Debug, Clone)]
pub struct TrainingMetadata {
    /// Number of trees grown.
    pub n_trees: usize,
    /// Number of rows in the dataset.
    pub n_rows: usize,
    /// Number of feature columns.
    pub n_features: usize,
    /// Resolved number of attributes examined per split.
    pub mtry: usize,
    /// Resolved minimum node size.
    pub node_size: usize,
    /// Resolved OOB sampling ratio.
    pub oob_ratio: f64,
    /// Rows in each tree's bootstrap training subset.
    pub subset_size: usize,
}

/// Result of Random Forest training: the fitted ensemble plus the optional
/// aggregate statistics computed after all trees finished.
#[derive(Debug)]
pub struct TrainingResult {
    forest: RandomForest,
    oob_error: Option<f64>,
    per_tree_oob_errors: Vec<Option<f64>>,
    importances: Option<Vec<f64>>,
    oob_rows_per_tree: Vec<Vec<usize>>,
    metadata: TrainingMetadata,
}

impl TrainingResult {
    pub(crate) fn new(
        forest: RandomForest,
        oob_error: Option<f64>,
        per_tree_oob_errors: Vec<Option<f64>>,
        importances: Option<Vec<f64>>,
        oob_rows_per_tree: Vec<Vec<usize>>,
        metadata: TrainingMetadata,
    ) -> Self {
        Self {
            forest,
            oob_error,
            per_tree_oob_errors,
            importances,
            oob_rows_per_tree,
            metadata,
        }
    }

    /// Borrow the fitted forest.
    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Consume the result and return the fitted forest.
    #[must_use]
    pub fn into_forest(self) -> RandomForest {
        self.forest
    }

    /// Return the ensemble OOB error, if it was computed.
    #[must_use]
    pub fn oob_error(&self) -> Option<f64> {
        self.oob_error
    }

    /// Return each tree's own OOB error, in tree order.
    ///
    /// `None` for a tree whose OOB set was empty, or for every tree when
    /// OOB estimation was not requested.
    #[must_use]
    pub fn per_tree_oob_errors(&self) -> &[Option<f64>] {
        &self.per_tree_oob_errors
    }

    /// Return the per-feature permutation importances, if computed.
    #[must_use]
    pub fn importances(&self) -> Option<&[f64]> {
        self.importances.as_deref()
    }

    /// Return the rows held out from each tree's bootstrap subset.
    #[must_use]
    pub fn oob_rows_per_tree(&self) -> &[Vec<usize>] {
        &self.oob_rows_per_tree
    }

    /// Return the resolved training metadata.
    #[must_use]
    pub fn metadata(&self) -> &TrainingMetadata {
        &self.metadata
    }
}

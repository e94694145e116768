//! Configuration builder for Random Forest training.

use crate::dataset::{ClassificationDataset, RegressionDataset};
use crate::error::ForestError;
use crate::result::TrainingResult;

/// Configuration for Random Forest training.
///
/// Construct via [`ForestConfig::new`], then chain `with_*` methods.
/// Unset parameters resolve to task-dependent defaults at training time:
///
/// | Parameter    | Classification default | Regression default |
/// |--------------|------------------------|--------------------|
/// | `trees`      | 100                    | 100                |
/// | `mtry`       | ⌈√D⌉                   | ⌈D/3⌉              |
/// | `node_size`  | 1                      | 5                  |
/// | `oob_ratio`  | 0.66                   | 0.66               |
///
/// OOB error and permutation feature importances are off by default;
/// enabling importances implies the per-tree OOB baseline is computed.
#[derive(Debug, Clone)]
pub struct ForestConfig {
    pub(crate) trees: Option<usize>,
    pub(crate) mtry: Option<usize>,
    pub(crate) node_size: Option<usize>,
    pub(crate) oob_ratio: Option<f64>,
    pub(crate) compute_oob_error: bool,
    pub(crate) compute_importances: bool,
    pub(crate) seed: u64,
}

/// Concrete parameter values after defaults have been applied.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedConfig {
    pub(crate) trees: usize,
    pub(crate) mtry: usize,
    pub(crate) node_size: usize,
    pub(crate) oob_ratio: f64,
}

impl ForestConfig {
    /// Create a new config with every parameter unset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            trees: None,
            mtry: None,
            node_size: None,
            oob_ratio: None,
            compute_oob_error: false,
            compute_importances: false,
            seed: 42,
        }
    }

    // --- Setters ---

    /// Set the number of trees to grow.
    #[must_use]
    pub fn with_trees(mut self, trees: usize) -> Self {
        self.trees = Some(trees);
        self
    }

    /// Set the number of randomly chosen attributes examined at each split.
    #[must_use]
    pub fn with_mtry(mut self, mtry: usize) -> Self {
        self.mtry = Some(mtry);
        self
    }

    /// Set the minimum node size: a node with this many rows or fewer
    /// becomes a leaf without searching for a split.
    #[must_use]
    pub fn with_node_size(mut self, node_size: usize) -> Self {
        self.node_size = Some(node_size);
        self
    }

    /// Set the fraction of rows drawn as the training subset per tree.
    /// The remaining rows form that tree's out-of-bag subset.
    #[must_use]
    pub fn with_oob_ratio(mut self, oob_ratio: f64) -> Self {
        self.oob_ratio = Some(oob_ratio);
        self
    }

    /// Enable or disable ensemble out-of-bag error estimation.
    #[must_use]
    pub fn with_oob_error(mut self, compute: bool) -> Self {
        self.compute_oob_error = compute;
        self
    }

    /// Enable or disable permutation feature importances.
    #[must_use]
    pub fn with_importances(mut self, compute: bool) -> Self {
        self.compute_importances = compute;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the configured number of trees, if set.
    #[must_use]
    pub fn trees(&self) -> Option<usize> {
        self.trees
    }

    /// Return the configured mtry, if set.
    #[must_use]
    pub fn mtry(&self) -> Option<usize> {
        self.mtry
    }

    /// Return the configured minimum node size, if set.
    #[must_use]
    pub fn node_size(&self) -> Option<usize> {
        self.node_size
    }

    /// Return the configured OOB sampling ratio, if set.
    #[must_use]
    pub fn oob_ratio(&self) -> Option<f64> {
        self.oob_ratio
    }

    /// Return whether ensemble OOB error estimation is enabled.
    #[must_use]
    pub fn computes_oob_error(&self) -> bool {
        self.compute_oob_error
    }

    /// Return whether permutation importances are enabled.
    #[must_use]
    pub fn computes_importances(&self) -> bool {
        self.compute_importances
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a classification forest on the provided dataset.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidMtry`] or [`ForestError::InvalidOobRatio`]
    /// for out-of-range parameters, and [`ForestError::OobUnavailable`] when
    /// OOB estimation is enabled but no row was ever held out.
    pub fn fit_classification(
        &self,
        dataset: &ClassificationDataset,
    ) -> Result<TrainingResult, ForestError> {
        crate::forest::train_classification(self, dataset)
    }

    /// Train a regression forest on the provided dataset.
    ///
    /// # Errors
    ///
    /// Same error conditions as [`ForestConfig::fit_classification`].
    pub fn fit_regression(
        &self,
        dataset: &RegressionDataset,
    ) -> Result<TrainingResult, ForestError> {
        crate::forest::train_regression(self, dataset)
    }

    /// Apply defaults to unset parameters and validate the rest.
    ///
    /// A configured value of 0 trees, 0 mtry, or 0 node size counts as
    /// unset, mirroring how unset parameters are signalled upstream.
    pub(crate) fn resolve(
        &self,
        n_features: usize,
        regression: bool,
    ) -> Result<ResolvedConfig, ForestError> {
        let trees = match self.trees {
            Some(b) if b > 0 => b,
            _ => 100,
        };

        let mtry = match self.mtry {
            Some(m) if m > 0 => m,
            _ if regression => (n_features as f64 / 3.0).ceil() as usize,
            _ => (n_features as f64).sqrt().ceil() as usize,
        };
        if mtry > n_features {
            return Err(ForestError::InvalidMtry { mtry, n_features });
        }

        let node_size = match self.node_size {
            Some(s) if s > 0 => s,
            _ if regression => 5,
            _ => 1,
        };

        let oob_ratio = match self.oob_ratio {
            Some(r) => {
                if r <= 0.0 || r > 1.0 || !r.is_finite() {
                    return Err(ForestError::InvalidOobRatio { ratio: r });
                }
                r
            }
            None => 0.66,
        };

        Ok(ResolvedConfig {
            trees,
            mtry,
            node_size,
            oob_ratio,
        })
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self::new()
    }
}

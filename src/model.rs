//! The trained ensemble: tree container and prediction methods.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::ForestError;
use crate::tree::Tree;

/// The learning task a forest was trained for.
///
/// The two payloads are deliberately separate fields rather than one shared
/// slot: class cardinality sizes leaf histograms, label dimension sizes
/// mean vectors, and nothing ever reinterprets one as the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Task {
    /// Classification over `n_classes` zero-based class labels.
    Classification {
        /// Number of distinct classes.
        n_classes: usize,
    },
    /// Regression onto real label vectors of `label_dimension` entries.
    Regression {
        /// Dimension of the label vectors.
        label_dimension: usize,
    },
}

impl Task {
    fn name(self) -> &'static str {
        match self {
            Task::Classification { .. } => "classification",
            Task::Regression { .. } => "regression",
        }
    }
}

/// A fitted Random Forest ensemble.
///
/// Trees are an unordered collection; predictions average over all of them
/// and are invariant to the order trees were appended in, up to
/// floating-point summation order.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RandomForest {
    trees: Vec<Tree>,
    task: Task,
    n_features: usize,
}

/// Index of the largest value; the first wins on exact ties.
pub(crate) fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(index, _)| index)
        .unwrap_or(0)
}

impl RandomForest {
    /// Create an empty ensemble for the given task.
    #[must_use]
    pub fn new(task: Task, n_features: usize) -> Self {
        Self {
            trees: Vec::new(),
            task,
            n_features,
        }
    }

    /// Append a grown tree to the ensemble.
    pub fn add_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    /// Return the trees in the ensemble.
    #[must_use]
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the number of features the forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the task the forest was trained for.
    #[must_use]
    pub fn task(&self) -> Task {
        self.task
    }

    fn check_sample(&self, sample: &[f64]) -> Result<(), ForestError> {
        if sample.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(())
    }

    fn check_task(&self, requested: Task) -> Result<(), ForestError> {
        let matches = matches!(
            (self.task, requested),
            (Task::Classification { .. }, Task::Classification { .. })
                | (Task::Regression { .. }, Task::Regression { .. })
        );
        if !matches {
            return Err(ForestError::TaskMismatch {
                trained: self.task.name(),
                requested: requested.name(),
            });
        }
        Ok(())
    }

    /// Average the per-tree leaf labels for one sample.
    ///
    /// The payload length is fixed by the task, so leaves from different
    /// trees always agree on vector length.
    fn averaged_label(&self, sample: &[f64], len: usize) -> Vec<f64> {
        let mut avg = vec![0.0f64; len];
        for tree in &self.trees {
            for (a, &p) in avg.iter_mut().zip(tree.predict(sample).iter()) {
                *a += p;
            }
        }
        let n = self.trees.len() as f64;
        avg.iter_mut().for_each(|a| *a /= n);
        avg
    }

    /// Return the averaged class probability distribution for one sample.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::TaskMismatch`] for regression forests and
    /// [`ForestError::PredictionFeatureMismatch`] for wrongly sized input.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, ForestError> {
        self.check_task(Task::Classification { n_classes: 0 })?;
        self.check_sample(sample)?;
        let Task::Classification { n_classes } = self.task else {
            unreachable!("task checked above");
        };
        Ok(self.averaged_label(sample, n_classes))
    }

    /// Return the majority class for one sample (argmax of [`Self::predict_proba`]).
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::predict_proba`].
    pub fn predict_class(&self, sample: &[f64]) -> Result<usize, ForestError> {
        Ok(argmax(&self.predict_proba(sample)?))
    }

    /// Return the averaged mean label vector for one sample.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::TaskMismatch`] for classification forests and
    /// [`ForestError::PredictionFeatureMismatch`] for wrongly sized input.
    pub fn predict_mean(&self, sample: &[f64]) -> Result<Vec<f64>, ForestError> {
        self.check_task(Task::Regression { label_dimension: 0 })?;
        self.check_sample(sample)?;
        let Task::Regression { label_dimension } = self.task else {
            unreachable!("task checked above");
        };
        Ok(self.averaged_label(sample, label_dimension))
    }

    /// Predict class labels for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::predict_class`], for any sample.
    pub fn predict_class_batch(&self, samples: &[Vec<f64>]) -> Result<Vec<usize>, ForestError> {
        samples
            .into_par_iter()
            .map(|sample| self.predict_class(sample))
            .collect()
    }

    /// Predict mean label vectors for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::predict_mean`], for any sample.
    pub fn predict_mean_batch(&self, samples: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ForestError> {
        samples
            .into_par_iter()
            .map(|sample| self.predict_mean(sample))
            .collect()
    }
}

/// Errors from Random Forest training and prediction.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Returned when the training dataset has zero rows.
    #[error("dataset has zero rows")]
    EmptyDataset,

    /// Returned when the training dataset has zero feature columns.
    #[error("dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when a row has a different number of features than expected.
    #[error("row {row} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the row.
        got: usize,
        /// The zero-based index of the offending row.
        row: usize,
    },

    /// Returned when a feature value is NaN or infinite.
    #[error("non-finite value at row {row}, column {column}")]
    NonFiniteValue {
        /// The zero-based index of the offending row.
        row: usize,
        /// The zero-based index of the offending feature column.
        column: usize,
    },

    /// Returned when the number of labels does not match the number of rows.
    #[error("dataset has {rows} rows but {labels} labels")]
    LabelCountMismatch {
        /// The number of feature rows.
        rows: usize,
        /// The number of labels provided.
        labels: usize,
    },

    /// Returned when a regression label has an inconsistent dimension.
    #[error("label at row {row} has dimension {got}, expected {expected}")]
    LabelDimensionMismatch {
        /// The expected label dimension.
        expected: usize,
        /// The actual label dimension at the offending row.
        got: usize,
        /// The zero-based index of the offending row.
        row: usize,
    },

    /// Returned when mtry exceeds the number of features.
    #[error("mtry is {mtry}, but must be in [1, {n_features}]")]
    InvalidMtry {
        /// The requested number of attributes per split.
        mtry: usize,
        /// The number of features in the dataset.
        n_features: usize,
    },

    /// Returned when the out-of-bag sampling ratio is not in (0.0, 1.0].
    #[error("oob_ratio must be in (0.0, 1.0], got {ratio}")]
    InvalidOobRatio {
        /// The invalid ratio provided.
        ratio: f64,
    },

    /// Returned when a prediction input has the wrong number of features.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },

    /// Returned when a prediction method does not match the trained task.
    #[error("forest was trained for {trained}, but a {requested} prediction was requested")]
    TaskMismatch {
        /// The task the forest was trained for.
        trained: &'static str,
        /// The task implied by the requested prediction.
        requested: &'static str,
    },

    /// Returned when OOB evaluation was requested but no row was ever held out.
    #[error("OOB evaluation failed: {reason}")]
    OobUnavailable {
        /// Human-readable description of why no OOB estimate exists.
        reason: String,
    },
}

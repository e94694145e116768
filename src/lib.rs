//! Random Forest training over presorted attribute tables.
//!
//! Grows an ensemble of binary CART decision trees for classification
//! (Gini impurity) and regression (total sum of squared errors) from
//! tabular numeric data. Each tree is grown from a bootstrap row subset
//! over per-column presorted attribute tables, so split search is a single
//! linear sweep per node and splitting never rescans the raw data. Trees
//! are grown in parallel via rayon with independent per-tree random
//! streams, with optional out-of-bag error estimation and
//! permutation-based feature importances.

mod config;
mod dataset;
mod error;
mod forest;
mod importance;
mod model;
mod node;
mod oob;
mod result;
mod split;
mod table;
mod tree;

pub use config::ForestConfig;
pub use dataset::{ClassificationDataset, RegressionDataset};
pub use error::ForestError;
pub use model::{RandomForest, Task};
pub use node::{NodeInfo, left_child_id, right_child_id};
pub use result::{TrainingMetadata, TrainingResult};
pub use split::gini;
pub use table::{AttributeEntry, AttributeTable, AttributeTables};
pub use tree::Tree;

//! Recursive tree growth and flat-tree traversal.

use rand_chacha::ChaCha8Rng;

use crate::node::{NodeInfo, left_child_id, right_child_id};
use crate::split::{
    best_classification_split, best_regression_split, class_histogram, draw_split_attributes, gini,
};
use crate::table::{AttributeTables, split_attribute_tables};

/// A grown decision tree: the pre-order list of [`NodeInfo`] records.
///
/// The list starts at the root (id 0); each internal node is immediately
/// followed by its entire left subtree, then its entire right subtree.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Tree {
    nodes: Vec<NodeInfo>,
}

impl Tree {
    pub(crate) fn from_nodes(nodes: Vec<NodeInfo>) -> Self {
        Self { nodes }
    }

    /// Return the pre-order node list.
    #[must_use]
    pub fn nodes(&self) -> &[NodeInfo] {
        &self.nodes
    }

    /// Return the total number of nodes.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf).count()
    }

    /// Return the maximum depth; a single-leaf tree has depth 0.
    ///
    /// Heap numbering encodes the depth directly: node `i` sits at depth
    /// `⌊log2(i + 1)⌋`.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.nodes
            .iter()
            .map(|n| (n.node_id + 1).ilog2())
            .max()
            .unwrap_or(0)
    }

    /// Route a sample to its leaf and return the leaf label.
    ///
    /// Traversal uses only node ids and the pre-order guarantee: the left
    /// child sits right after its parent, and the right child is the first
    /// later entry carrying the right-child id.
    #[must_use]
    pub fn predict(&self, sample: &[f64]) -> &[f64] {
        let mut position = 0;
        loop {
            let node = &self.nodes[position];
            if node.is_leaf {
                return &node.label;
            }
            if sample[node.attribute_index] <= node.attribute_value {
                position += 1;
            } else {
                position = self.position_of(position + 1, node.right_node_id);
            }
        }
    }

    /// Find the position of `node_id` scanning forward from `start`.
    ///
    /// Heap ids are unique, so the first match is the node. A missing id
    /// means the tree list is malformed, which is a builder bug.
    fn position_of(&self, start: usize, node_id: u64) -> usize {
        self.nodes[start..]
            .iter()
            .position(|n| n.node_id == node_id)
            .map(|offset| start + offset)
            .expect("malformed tree: child id missing from pre-order list")
    }
}

/// Grow one classification tree from presorted attribute tables.
///
/// `counts` holds the class counts over the rows in scope; `labels` is the
/// full bootstrap label slice indexed by row id. A node becomes a leaf when
/// it is pure, when it has at most `node_size` rows, or when no candidate
/// attribute yields a valid boundary. The parent's tables are dropped as
/// soon as the children's tables exist.
pub(crate) fn grow_classification_tree(
    tables: AttributeTables,
    labels: &[usize],
    counts: Vec<usize>,
    node_id: u64,
    node_size: usize,
    mtry: usize,
    rng: &mut ChaCha8Rng,
) -> Vec<NodeInfo> {
    let n = tables[0].len();

    if gini(&counts, n) == 0.0 || n <= node_size {
        return vec![NodeInfo::leaf(node_id, class_histogram(&counts))];
    }

    let candidates = draw_split_attributes(tables.len(), mtry, rng);
    let Some(split) = best_classification_split(&tables, labels, &counts, &candidates) else {
        return vec![NodeInfo::leaf(node_id, class_histogram(&counts))];
    };

    let (left_tables, right_tables) =
        split_attribute_tables(&tables, split.point.attribute_index, split.point.boundary);
    drop(tables);

    let mut nodes = vec![NodeInfo::internal(
        node_id,
        split.point.attribute_index,
        split.point.threshold,
        Vec::new(),
    )];
    nodes.extend(grow_classification_tree(
        left_tables,
        labels,
        split.counts_left,
        left_child_id(node_id),
        node_size,
        mtry,
        rng,
    ));
    nodes.extend(grow_classification_tree(
        right_tables,
        labels,
        split.counts_right,
        right_child_id(node_id),
        node_size,
        mtry,
        rng,
    ));
    nodes
}

/// Grow one regression tree from presorted attribute tables.
///
/// Every node carries the mean label vector of its rows, so a node that
/// turns out to have no valid split already has its leaf payload. A node
/// becomes a leaf when it has at most `node_size` rows, when its labels
/// have zero variance (the regression analog of a pure node), or when no
/// candidate attribute yields a strictly improving boundary.
pub(crate) fn grow_regression_tree(
    tables: AttributeTables,
    labels: &[Vec<f64>],
    node_id: u64,
    node_size: usize,
    mtry: usize,
    rng: &mut ChaCha8Rng,
) -> Vec<NodeInfo> {
    let n = tables[0].len();
    let mean = mean_label(&tables, labels);

    if n <= node_size || node_sum_of_squares(&tables, labels, &mean) == 0.0 {
        return vec![NodeInfo::leaf(node_id, mean)];
    }

    let candidates = draw_split_attributes(tables.len(), mtry, rng);
    let Some(split) = best_regression_split(&tables, labels, &candidates) else {
        return vec![NodeInfo::leaf(node_id, mean)];
    };

    let (left_tables, right_tables) =
        split_attribute_tables(&tables, split.point.attribute_index, split.point.boundary);
    drop(tables);

    let mut nodes = vec![NodeInfo::internal(
        node_id,
        split.point.attribute_index,
        split.point.threshold,
        mean,
    )];
    nodes.extend(grow_regression_tree(
        left_tables,
        labels,
        left_child_id(node_id),
        node_size,
        mtry,
        rng,
    ));
    nodes.extend(grow_regression_tree(
        right_tables,
        labels,
        right_child_id(node_id),
        node_size,
        mtry,
        rng,
    ));
    nodes
}

/// Arithmetic mean of the label vectors over the rows in scope.
fn mean_label(tables: &AttributeTables, labels: &[Vec<f64>]) -> Vec<f64> {
    let rows = &tables[0];
    assert!(!rows.is_empty(), "mean label over an empty node");
    let mut mean = vec![0.0f64; labels[rows[0].row].len()];
    for entry in rows {
        for (m, &l) in mean.iter_mut().zip(labels[entry.row].iter()) {
            *m += l;
        }
    }
    let n = rows.len() as f64;
    mean.iter_mut().for_each(|m| *m /= n);
    mean
}

/// Total sum of squared distances from the node mean, over the rows in scope.
fn node_sum_of_squares(tables: &AttributeTables, labels: &[Vec<f64>], mean: &[f64]) -> f64 {
    tables[0]
        .iter()
        .map(|entry| {
            labels[entry.row]
                .iter()
                .zip(mean.iter())
                .map(|(&l, &m)| (l - m) * (l - m))
                .sum::<f64>()
        })
        .sum()
}

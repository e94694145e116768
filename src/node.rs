/// A single tree node in the flat, pre-order node list.
///
/// Node ids follow binary-heap numbering: the children of node `i` are
/// `2i + 1` (left) and `2i + 2` (right), with the root at 0. Consumers
/// reconstruct the tree shape from the ids alone, so the pre-order
/// placement of nodes in the list is load-bearing: a node's left child is
/// always the next entry, and its right child follows the whole left
/// subtree.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NodeInfo {
    /// Heap-numbered node id.
    pub node_id: u64,
    /// Feature column tested by this node (0 for leaves).
    pub attribute_index: usize,
    /// Split threshold: rows with `value <= threshold` go left (0.0 for leaves).
    pub attribute_value: f64,
    /// Id of the left child (0 for leaves).
    pub left_node_id: u64,
    /// Id of the right child (0 for leaves).
    pub right_node_id: u64,
    /// Leaf payload: class probability histogram (classification) or mean
    /// label vector (regression). Regression nodes carry their mean even
    /// when internal; internal classification nodes carry an empty vector.
    pub label: Vec<f64>,
    /// Whether this node is a terminal leaf.
    pub is_leaf: bool,
}

impl NodeInfo {
    /// Create a leaf node.
    pub(crate) fn leaf(node_id: u64, label: Vec<f64>) -> Self {
        Self {
            node_id,
            attribute_index: 0,
            attribute_value: 0.0,
            left_node_id: 0,
            right_node_id: 0,
            label,
            is_leaf: true,
        }
    }

    /// Create an internal split node.
    pub(crate) fn internal(
        node_id: u64,
        attribute_index: usize,
        attribute_value: f64,
        label: Vec<f64>,
    ) -> Self {
        Self {
            node_id,
            attribute_index,
            attribute_value,
            left_node_id: left_child_id(node_id),
            right_node_id: right_child_id(node_id),
            label,
            is_leaf: false,
        }
    }
}

/// Heap id of the left child of `node_id`.
#[must_use]
pub fn left_child_id(node_id: u64) -> u64 {
    2 * node_id + 1
}

/// Heap id of the right child of `node_id`.
#[must_use]
pub fn right_child_id(node_id: u64) -> u64 {
    2 * node_id + 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_child_ids() {
        assert_eq!(left_child_id(0), 1);
        assert_eq!(right_child_id(0), 2);
        assert_eq!(left_child_id(2), 5);
        assert_eq!(right_child_id(2), 6);
    }

    #[test]
    fn leaf_shape() {
        let leaf = NodeInfo::leaf(3, vec![0.25, 0.75]);
        assert!(leaf.is_leaf);
        assert_eq!(leaf.node_id, 3);
        assert_eq!(leaf.left_node_id, 0);
        assert_eq!(leaf.label, vec![0.25, 0.75]);
    }

    #[test]
    fn internal_shape() {
        let node = NodeInfo::internal(1, 4, 2.5, Vec::new());
        assert!(!node.is_leaf);
        assert_eq!(node.left_node_id, 3);
        assert_eq!(node.right_node_id, 4);
        assert_eq!(node.attribute_index, 4);
        assert!((node.attribute_value - 2.5).abs() < f64::EPSILON);
    }
}

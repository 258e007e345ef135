//! Surrogate decision tree model.
//!
//! Array-based arena of [`Node`]s mirroring sklearn's `tree_` layout. A
//! [`Tree`] can only be built through validation, so every value of this
//! type is a finite, acyclic binary tree whose leaves carry a class and whose
//! splits reference existing features.
//!
//! Split semantics follow sklearn: `x[feature] <= threshold` routes left,
//! `x[feature] > threshold` routes right.

mod export;


pub use export::TreeExport;

use thiserror::Error;
use treecov_common::TreecovError;

/// Index of a node in the tree arena.
pub type NodeId = usize;

/// An internal split node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    /// Feature index compared at this node
    pub feature: usize,
    /// Split threshold (values `<=` go left)
    pub threshold: f64,
    /// Left child (`x <= threshold`)
    pub left: NodeId,
    /// Right child (`x > threshold`)
    pub right: NodeId,
}

/// A terminal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaf {
    /// Predicted class label
    pub class: usize,
    /// Number of training samples that reached this leaf
    pub n_samples: usize,
}

/// A node in the decision tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    /// Split on one feature
    Internal(Split),
    /// Terminal prediction
    Leaf(Leaf),
}

impl Node {
    /// Returns `true` if this node is a leaf.
    pub const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }
}

/// Structural defects that make a tree untrustworthy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralError {
    #[error("tree has no nodes")]
    Empty,

    #[error("array '{field}' has {actual} entries, expected {expected}")]
    InconsistentLengths { field: &'static str, expected: usize, actual: usize },

    #[error("node {node} references missing child {child}")]
    DanglingChild { node: NodeId, child: i64 },

    #[error("node {node} has exactly one child")]
    HalfLeaf { node: NodeId },

    #[error("leaf {node} has no class")]
    MissingClass { node: NodeId },

    #[error("node {node} splits on feature {feature} but the tree has {n_features} features")]
    FeatureOutOfRange { node: NodeId, feature: i64, n_features: usize },

    #[error("node {node} has a non-finite threshold")]
    NonFiniteThreshold { node: NodeId },

    #[error("node {node} is reachable more than once (cycle or shared subtree)")]
    Revisited { node: NodeId },

    #[error("node {node} is not reachable from the root")]
    Unreachable { node: NodeId },
}

impl StructuralError {
    /// Node the defect was found at (`0` for whole-tree defects).
    pub fn node(&self) -> NodeId {
        match self {
            Self::Empty | Self::InconsistentLengths { .. } => 0,
            Self::DanglingChild { node, .. }
            | Self::HalfLeaf { node }
            | Self::MissingClass { node }
            | Self::FeatureOutOfRange { node, .. }
            | Self::NonFiniteThreshold { node }
            | Self::Revisited { node }
            | Self::Unreachable { node } => *node,
        }
    }
}

impl From<StructuralError> for TreecovError {
    fn from(err: StructuralError) -> Self {
        TreecovError::TreeStructure { node: err.node(), message: err.to_string() }
    }
}

/// A validated decision tree classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
    n_features: usize,
}

impl Tree {
    /// Build a tree from an arena whose root is node `0`.
    ///
    /// # Errors
    ///
    /// Returns a [`StructuralError`] for dangling children, out-of-range
    /// features, non-finite thresholds, cycles, shared or unreachable nodes.
    pub fn new(nodes: Vec<Node>, n_features: usize) -> Result<Self, StructuralError> {
        if nodes.is_empty() {
            return Err(StructuralError::Empty);
        }
        for (id, node) in nodes.iter().enumerate() {
            if let Node::Internal(split) = node {
                for child in [split.left, split.right] {
                    if child >= nodes.len() {
                        return Err(StructuralError::DanglingChild { node: id, child: child as i64 });
                    }
                }
                if split.feature >= n_features {
                    return Err(StructuralError::FeatureOutOfRange {
                        node: id,
                        feature: split.feature as i64,
                        n_features,
                    });
                }
                if !split.threshold.is_finite() {
                    return Err(StructuralError::NonFiniteThreshold { node: id });
                }
            }
        }

        let tree = Self { nodes, n_features };
        let order = tree.preorder()?;
        if order.len() != tree.nodes.len() {
            let mut seen = vec![false; tree.nodes.len()];
            for id in order {
                seen[id] = true;
            }
            let node = seen.iter().position(|s| !s).unwrap_or(0);
            return Err(StructuralError::Unreachable { node });
        }
        Ok(tree)
    }

    /// Build a tree from sklearn-style parallel arrays.
    ///
    /// A node whose two children are both negative is a leaf and must have a
    /// class in `classes`.
    pub fn from_arrays(
        children_left: &[i64],
        children_right: &[i64],
        features: &[i64],
        thresholds: &[f64],
        classes: &[Option<usize>],
        n_samples: &[usize],
        n_features: usize,
    ) -> Result<Self, StructuralError> {
        let n = children_left.len();
        check_len("children_right", n, children_right.len())?;
        check_len("feature", n, features.len())?;
        check_len("threshold", n, thresholds.len())?;
        check_len("value", n, classes.len())?;
        check_len("n_node_samples", n, n_samples.len())?;

        let mut nodes = Vec::with_capacity(n);
        for id in 0..n {
            let (left, right) = (children_left[id], children_right[id]);
            let node = match (left < 0, right < 0) {
                (true, true) => {
                    let class = classes[id].ok_or(StructuralError::MissingClass { node: id })?;
                    Node::Leaf(Leaf { class, n_samples: n_samples[id] })
                }
                (false, false) => {
                    let feature = usize::try_from(features[id]).map_err(|_| {
                        StructuralError::FeatureOutOfRange {
                            node: id,
                            feature: features[id],
                            n_features,
                        }
                    })?;
                    Node::Internal(Split {
                        feature,
                        threshold: thresholds[id],
                        left: child_index(id, left, n)?,
                        right: child_index(id, right, n)?,
                    })
                }
                _ => return Err(StructuralError::HalfLeaf { node: id }),
            };
            nodes.push(node);
        }
        Self::new(nodes, n_features)
    }

    /// Root node id.
    pub const fn root(&self) -> NodeId {
        0
    }

    /// Access a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// All nodes in arena order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes in the tree.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaf nodes.
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Expected number of input features.
    pub const fn n_features(&self) -> usize {
        self.n_features
    }

    /// Tree depth (longest root-to-leaf path, in edges).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self.root(), 0usize)];
        while let Some((id, depth)) = stack.pop() {
            match self.nodes[id] {
                Node::Leaf(_) => max_depth = max_depth.max(depth),
                Node::Internal(split) => {
                    stack.push((split.right, depth + 1));
                    stack.push((split.left, depth + 1));
                }
            }
        }
        max_depth
    }

    /// Classify a single sample.
    ///
    /// Missing trailing features are read as `0.0`.
    pub fn predict(&self, sample: &[f64]) -> usize {
        let mut id = self.root();
        loop {
            match self.nodes[id] {
                Node::Leaf(leaf) => return leaf.class,
                Node::Internal(split) => {
                    let value = sample.get(split.feature).copied().unwrap_or(0.0);
                    id = if value <= split.threshold { split.left } else { split.right };
                }
            }
        }
    }

    /// Classify multiple samples.
    pub fn predict_batch(&self, samples: &[Vec<f64>]) -> Vec<usize> {
        samples.iter().map(|s| self.predict(s)).collect()
    }

    /// Leaf id a sample is routed to.
    pub fn leaf_of(&self, sample: &[f64]) -> NodeId {
        let mut id = self.root();
        while let Node::Internal(split) = self.nodes[id] {
            let value = sample.get(split.feature).copied().unwrap_or(0.0);
            id = if value <= split.threshold { split.left } else { split.right };
        }
        id
    }

    /// Sorted, distinct split thresholds per feature.
    pub fn thresholds_by_feature(&self) -> Vec<Vec<f64>> {
        let mut by_feature = vec![Vec::new(); self.n_features];
        for node in &self.nodes {
            if let Node::Internal(split) = node {
                by_feature[split.feature].push(split.threshold);
            }
        }
        for thresholds in &mut by_feature {
            thresholds.sort_by(f64::total_cmp);
            thresholds.dedup();
        }
        by_feature
    }

    /// Leaves reachable when each split may route to either side.
    ///
    /// `admits(feature, threshold)` returns whether some admissible value of
    /// `feature` is `<= threshold` (left) and whether some is `> threshold`
    /// (right). Leaves are returned in left-to-right order.
    pub fn reachable_leaves<F>(&self, mut admits: F) -> Vec<NodeId>
    where
        F: FnMut(usize, f64) -> (bool, bool),
    {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            match self.nodes[id] {
                Node::Leaf(_) => leaves.push(id),
                Node::Internal(split) => {
                    let (left, right) = admits(split.feature, split.threshold);
                    if right {
                        stack.push(split.right);
                    }
                    if left {
                        stack.push(split.left);
                    }
                }
            }
        }
        leaves
    }

    /// Sorted distinct classes of [`Tree::reachable_leaves`].
    pub fn reachable_classes<F>(&self, admits: F) -> Vec<usize>
    where
        F: FnMut(usize, f64) -> (bool, bool),
    {
        let mut classes: Vec<usize> = self
            .reachable_leaves(admits)
            .into_iter()
            .filter_map(|id| match self.nodes[id] {
                Node::Leaf(leaf) => Some(leaf.class),
                Node::Internal(_) => None,
            })
            .collect();
        classes.sort_unstable();
        classes.dedup();
        classes
    }

    /// Node ids in depth-first, left-first order.
    fn preorder(&self) -> Result<Vec<NodeId>, StructuralError> {
        let mut visited = vec![false; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut visited[id], true) {
                return Err(StructuralError::Revisited { node: id });
            }
            order.push(id);
            if let Node::Internal(split) = self.nodes[id] {
                stack.push(split.right);
                stack.push(split.left);
            }
        }
        Ok(order)
    }
}

fn check_len(field: &'static str, expected: usize, actual: usize) -> Result<(), StructuralError> {
    if expected == actual {
        Ok(())
    } else {
        Err(StructuralError::InconsistentLengths { field, expected, actual })
    }
}

fn child_index(node: NodeId, child: i64, n: usize) -> Result<NodeId, StructuralError> {
    usize::try_from(child)
        .ok()
        .filter(|&c| c < n)
        .ok_or(StructuralError::DanglingChild { node, child })
}

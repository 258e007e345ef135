//! Root-to-leaf path extraction.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tree::{Node, NodeId, Tree};

/// Side of a split a path follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// `x <= threshold` (left child)
    Le,
    /// `x > threshold` (right child)
    Gt,
}

impl Direction {
    /// Comparison operator as written in split conditions.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Le => "<=",
            Self::Gt => ">",
        }
    }

    /// Whether `value` satisfies this side of a split at `threshold`.
    pub fn admits(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Le => value <= threshold,
            Self::Gt => value > threshold,
        }
    }
}

/// One split condition on a path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    /// Feature index
    pub feature: usize,
    /// Side taken at the split
    pub direction: Direction,
    /// Split threshold
    pub threshold: f64,
}

impl Predicate {
    /// Whether a sample satisfies the condition.
    pub fn holds(&self, sample: &[f64]) -> bool {
        sample.get(self.feature).is_some_and(|&v| self.direction.admits(v, self.threshold))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{} {} {}", self.feature, self.direction.symbol(), self.threshold)
    }
}

/// Conditions leading from the root to one leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Arena id of the leaf
    pub leaf_id: NodeId,
    /// Split conditions in root-to-leaf order
    pub predicates: Vec<Predicate>,
    /// Class predicted at the leaf
    pub class: usize,
    /// Training samples that reached the leaf
    pub n_samples: usize,
}

impl Path {
    /// Whether a sample satisfies every condition on the path.
    pub fn admits(&self, sample: &[f64]) -> bool {
        self.predicates.iter().all(|p| p.holds(sample))
    }

    /// Number of splits on the path.
    pub fn depth(&self) -> usize {
        self.predicates.len()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "leaf {} (class {}):", self.leaf_id, self.class)?;
        if self.predicates.is_empty() {
            return f.write_str(" <root>");
        }
        for (i, predicate) in self.predicates.iter().enumerate() {
            let sep = if i == 0 { " " } else { " ∧ " };
            write!(f, "{sep}{predicate}")?;
        }
        Ok(())
    }
}

/// Depth-first, left-first enumerator of every root-to-leaf [`Path`].
///
/// In-progress predicate lists share one prefix buffer; the explicit stack
/// records how deep the prefix is when each node is entered.
pub struct TreeWalker<'a> {
    tree: &'a Tree,
}

impl<'a> TreeWalker<'a> {
    /// Create a walker over a validated tree.
    pub fn new(tree: &'a Tree) -> Self {
        Self { tree }
    }

    /// All paths, in left-to-right leaf order.
    pub fn paths(&self) -> Vec<Path> {
        let mut paths = Vec::with_capacity(self.tree.n_leaves());
        let mut prefix: Vec<Predicate> = Vec::new();
        let mut stack: Vec<(NodeId, usize, Option<Predicate>)> = vec![(self.tree.root(), 0, None)];

        while let Some((id, depth, edge)) = stack.pop() {
            prefix.truncate(depth);
            prefix.extend(edge);

            match self.tree.nodes()[id] {
                Node::Leaf(leaf) => paths.push(Path {
                    leaf_id: id,
                    predicates: prefix.clone(),
                    class: leaf.class,
                    n_samples: leaf.n_samples,
                }),
                Node::Internal(split) => {
                    let depth = prefix.len();
                    let edge = |direction| Predicate {
                        feature: split.feature,
                        direction,
                        threshold: split.threshold,
                    };
                    stack.push((split.right, depth, Some(edge(Direction::Gt))));
                    stack.push((split.left, depth, Some(edge(Direction::Le))));
                }
            }
        }
        paths
    }
}

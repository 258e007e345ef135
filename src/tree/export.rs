//! JSON interchange format for trees exported from sklearn.
//!
//! ```json
//! {
//!   "n_features": 4,
//!   "children_left":  [1, -1, -1],
//!   "children_right": [2, -1, -1],
//!   "feature":        [2, -2, -2],
//!   "threshold":      [1.265, -2.0, -2.0],
//!   "value":          [[50, 50], [50, 0], [0, 50]],
//!   "n_node_samples": [100, 50, 50]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use treecov_common::{Result, TreecovError};

use super::{Node, StructuralError, Tree};

/// Serialized form of a fitted `DecisionTreeClassifier.tree_`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeExport {
    /// Number of input features
    pub n_features: usize,
    /// Left child per node (`-1` for leaves)
    pub children_left: Vec<i64>,
    /// Right child per node (`-1` for leaves)
    pub children_right: Vec<i64>,
    /// Split feature per node (`-2` for leaves)
    pub feature: Vec<i64>,
    /// Split threshold per node
    pub threshold: Vec<f64>,
    /// Per-node class distribution; a leaf predicts its argmax
    pub value: Vec<Vec<f64>>,
    /// Training samples per node
    #[serde(default)]
    pub n_node_samples: Option<Vec<usize>>,
    /// Class labels indexed by `value` column; identity when absent
    #[serde(default)]
    pub classes: Option<Vec<usize>>,
}

impl TreeExport {
    /// Load an export from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| TreecovError::io(format!("reading tree file: {}", path.display()), e))?;
        Self::from_json(&content)
    }

    /// Parse an export from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| TreecovError::Serialization { message: format!("tree JSON: {e}") })
    }

    /// Validate and convert into a [`Tree`].
    pub fn into_tree(self) -> std::result::Result<Tree, StructuralError> {
        let n = self.children_left.len();
        let classes: Vec<Option<usize>> = self
            .value
            .iter()
            .map(|dist| {
                argmax(dist).map(|col| match &self.classes {
                    Some(labels) => labels.get(col).copied(),
                    None => Some(col),
                })
            })
            .map(Option::flatten)
            .collect();
        let n_samples = self.n_node_samples.unwrap_or_else(|| vec![0; n]);

        Tree::from_arrays(
            &self.children_left,
            &self.children_right,
            &self.feature,
            &self.threshold,
            &classes,
            &n_samples,
            self.n_features,
        )
    }

    /// Export a tree back into parallel arrays.
    pub fn from_tree(tree: &Tree) -> Self {
        let n_classes = tree
            .nodes()
            .iter()
            .filter_map(|n| match n {
                Node::Leaf(leaf) => Some(leaf.class + 1),
                Node::Internal(_) => None,
            })
            .max()
            .unwrap_or(1);

        let mut export = Self {
            n_features: tree.n_features(),
            children_left: Vec::with_capacity(tree.n_nodes()),
            children_right: Vec::with_capacity(tree.n_nodes()),
            feature: Vec::with_capacity(tree.n_nodes()),
            threshold: Vec::with_capacity(tree.n_nodes()),
            value: Vec::with_capacity(tree.n_nodes()),
            n_node_samples: Some(Vec::with_capacity(tree.n_nodes())),
            classes: None,
        };
        let samples = export.n_node_samples.get_or_insert_with(Vec::new);
        for node in tree.nodes() {
            let mut dist = vec![0.0; n_classes];
            match node {
                Node::Internal(split) => {
                    export.children_left.push(split.left as i64);
                    export.children_right.push(split.right as i64);
                    export.feature.push(split.feature as i64);
                    export.threshold.push(split.threshold);
                    samples.push(0);
                }
                Node::Leaf(leaf) => {
                    export.children_left.push(-1);
                    export.children_right.push(-1);
                    export.feature.push(-2);
                    export.threshold.push(-2.0);
                    dist[leaf.class] = leaf.n_samples.max(1) as f64;
                    samples.push(leaf.n_samples);
                }
            }
            export.value.push(dist);
        }
        export
    }
}

/// Index of the first maximum, `None` for an empty distribution.
fn argmax(dist: &[f64]) -> Option<usize> {
    dist.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_SPLIT: &str = r#"{
        "n_features": 3,
        "children_left": [1, -1, -1],
        "children_right": [2, -1, -1],
        "feature": [2, -2, -2],
        "threshold": [1.265, -2.0, -2.0],
        "value": [[50, 50], [50, 0], [0, 50]],
        "n_node_samples": [100, 50, 50]
    }"#;

    #[test]
    fn test_parse_one_split() {
        let tree = TreeExport::from_json(ONE_SPLIT).unwrap().into_tree().unwrap();
        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.predict(&[0.0, 0.0, 1.0]), 0);
        assert_eq!(tree.predict(&[0.0, 0.0, 1.3]), 1);
    }

    #[test]
    fn test_class_labels_are_mapped() {
        let mut export = TreeExport::from_json(ONE_SPLIT).unwrap();
        export.classes = Some(vec![3, 7]);
        let tree = export.into_tree().unwrap();
        assert_eq!(tree.predict(&[0.0, 0.0, 2.0]), 7);
    }

    #[test]
    fn test_leaf_without_distribution_is_rejected() {
        let mut export = TreeExport::from_json(ONE_SPLIT).unwrap();
        export.value[1].clear();
        assert_eq!(export.into_tree(), Err(StructuralError::MissingClass { node: 1 }));
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let err = TreeExport::from_json("{not json").unwrap_err();
        assert!(matches!(err, TreecovError::Serialization { .. }));
    }

    #[test]
    fn test_export_reimports_identically() {
        let tree = TreeExport::from_json(ONE_SPLIT).unwrap().into_tree().unwrap();
        let again = TreeExport::from_tree(&tree).into_tree().unwrap();
        assert_eq!(tree, again);
    }

    #[test]
    fn test_argmax_prefers_first_maximum() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0]), Some(1));
        assert_eq!(argmax(&[]), None);
    }
}

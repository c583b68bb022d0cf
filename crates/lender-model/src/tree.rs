//! Single decision tree exported as a flat node array.

use lender_core::{FeatureVector, ModelError, FEATURE_COUNT};
use serde::Deserialize;

/// A tree node. Splits send `x[feature] <= threshold` to `left`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Children must point forward, which rules out cycles and keeps traversal bounded.
    pub(crate) fn validate(&self, n_classes: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Invalid("decision tree has no nodes".into()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(ModelError::Invalid(format!(
                            "node {} splits on unknown feature {}",
                            i, feature
                        )));
                    }
                    for child in [left, right] {
                        if *child <= i || *child >= self.nodes.len() {
                            return Err(ModelError::Invalid(format!(
                                "node {} has invalid child {}",
                                i, child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    let total: f64 = value.iter().sum();
                    if value.len() != n_classes
                        || value.iter().any(|v| *v < 0.0 || !v.is_finite())
                        || total <= 0.0
                    {
                        return Err(ModelError::Invalid(format!(
                            "node {} has an invalid class distribution {:?}",
                            i, value
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf(&self, features: &FeatureVector) -> Result<&[f64], ModelError> {
        let x = features.values();
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    index = if x[*feature] <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => return Ok(value.as_slice()),
                None => {
                    return Err(ModelError::Invalid(format!("dangling node reference {}", index)))
                }
            }
        }
    }

    /// Leaf class counts normalised to probabilities.
    pub fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        let value = self.leaf(features)?;
        let total: f64 = value.iter().sum();
        Ok(value.iter().map(|v| v / total).collect())
    }
}

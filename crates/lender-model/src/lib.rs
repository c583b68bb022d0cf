//! Pre-trained credit risk classifier for lender.
//!
//! Models are exported from the training environment as JSON artifacts:
//!
//! ```json
//! {
//!   "kind": "logistic_regression",
//!   "features": ["external_risk_estimate_c", "net_fraction_revolving_burden",
//!                "num_inq_last_6m", "percent_trades_never_delq", "m_since_recent_delq"],
//!   "classes": [0, 1],
//!   "coefficients": [-0.95, 0.42, 0.18, -0.31, -0.12],
//!   "intercept": 0.04
//! }
//! ```
//!
//! Artifacts are validated when loaded, so a model trained on other features,
//! in another order, or without the bad class label never reaches a request.

mod logistic;
mod tree;

pub use logistic::{LogisticRegression, Scaler};
pub use tree::{DecisionTree, TreeNode};

use std::fs;
use std::path::Path;

use lender_core::{FeatureVector, ModelError, ScoringModel, BAD_CLASS_LABEL, FEATURE_NAMES};
use serde::Deserialize;
use tracing::info;

/// Raw artifact as found on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    pub features: Vec<String>,
    pub classes: Vec<i64>,
    #[serde(flatten)]
    pub estimator: Estimator,
}

/// Supported estimator kinds.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression(LogisticRegression),
    DecisionTree(DecisionTree),
}

impl Estimator {
    fn name(&self) -> &'static str {
        match self {
            Estimator::LogisticRegression(_) => "logistic_regression",
            Estimator::DecisionTree(_) => "decision_tree",
        }
    }
}

/// A validated binary classifier over the five scoring features.
#[derive(Debug, Clone)]
pub struct ClassifierModel {
    classes: Vec<i64>,
    estimator: Estimator,
}

impl ClassifierModel {
    /// Validates an artifact against the expected feature layout.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        if artifact.features != FEATURE_NAMES {
            return Err(ModelError::FeatureMismatch {
                expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                found: artifact.features,
            });
        }

        let classes = artifact.classes;
        if classes.len() != 2 || classes[0] == classes[1] {
            return Err(ModelError::Invalid(format!(
                "expected two distinct classes, found {:?}",
                classes
            )));
        }
        if !classes.contains(&BAD_CLASS_LABEL) {
            return Err(ModelError::MissingBadClass(classes));
        }

        match &artifact.estimator {
            Estimator::LogisticRegression(lr) => lr.validate()?,
            Estimator::DecisionTree(dt) => dt.validate(classes.len())?,
        }

        Ok(Self {
            classes,
            estimator: artifact.estimator,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_str(json)?;
        Self::from_artifact(artifact)
    }

    pub fn kind(&self) -> &'static str {
        self.estimator.name()
    }
}

impl ScoringModel for ClassifierModel {
    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict(&self, features: &FeatureVector) -> Result<i64, ModelError> {
        let index = match &self.estimator {
            Estimator::LogisticRegression(lr) => usize::from(lr.decision(features)? > 0.0),
            Estimator::DecisionTree(dt) => argmax(&dt.predict_proba(features)?),
        };
        Ok(self.classes[index])
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        match &self.estimator {
            Estimator::LogisticRegression(lr) => lr.predict_proba(features),
            Estimator::DecisionTree(dt) => dt.predict_proba(features),
        }
    }
}

/// Index of the largest value, first one on ties.
fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, max), (i, &v)| {
            if v > max {
                (i, v)
            } else {
                (best, max)
            }
        })
        .0
}

/// Reads and validates a model artifact from disk.
pub fn load_model(path: impl AsRef<Path>) -> Result<ClassifierModel, ModelError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let model = ClassifierModel::from_json(&content)?;
    info!(
        path = %path.display(),
        kind = model.kind(),
        classes = ?model.classes,
        "Model loaded"
    );
    Ok(model)
}

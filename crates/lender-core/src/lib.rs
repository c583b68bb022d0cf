//! Core domain types and error definitions for lender.
//!
//! This crate provides the pieces shared across the service:
//!
//! - [`RiskInput`] and [`FeatureVector`] — typed view of client-supplied scoring data
//! - [`RiskScorer`] — key normalization, feature extraction, model call and factor rule
//! - [`ScoringModel`] and [`RecordStore`] — seams for the classifier and the applicant store
//! - [`ScoringError`], [`ModelError`], [`LookupError`] — per-stage failure kinds
//!
//! # Example
//!
//! ```rust
//! use lender_core::{FeatureVector, ModelError, RiskScorer, ScoringModel};
//! use std::sync::Arc;
//!
//! struct Constant;
//!
//! impl ScoringModel for Constant {
//!     fn classes(&self) -> &[i64] { &[0, 1] }
//!     fn predict(&self, _: &FeatureVector) -> Result<i64, ModelError> { Ok(0) }
//!     fn predict_proba(&self, _: &FeatureVector) -> Result<Vec<f64>, ModelError> {
//!         Ok(vec![0.75, 0.25])
//!     }
//! }
//!
//! let scorer = RiskScorer::new(Arc::new(Constant)).unwrap();
//! let data = serde_json::json!({ "Net_Fraction_Revolving_Burden": 80 });
//! let result = scorer.score(data.as_object().unwrap()).unwrap();
//! assert_eq!(result.probability, 25.0);
//! assert_eq!(result.primary_factor.as_str(), "excessive revolving burden");
//! ```

mod features;
mod scoring;

pub use features::{
    feature_index, Coerced, FeatureVector, RiskInput, EXTERNAL_RISK_ESTIMATE, FEATURE_COUNT,
    FEATURE_NAMES, M_SINCE_RECENT_DELQ, NET_FRACTION_REVOLVING_BURDEN, NUM_INQ_LAST_6M,
    PERCENT_TRADES_NEVER_DELQ,
};
pub use scoring::{
    round_percentage, PrimaryFactor, RiskAssessment, RiskScorer, BAD_CLASS_LABEL,
    BUREAU_SCORE_THRESHOLD, REVOLVING_BURDEN_THRESHOLD,
};

use thiserror::Error;

/// A stored applicant row: column name to value, in column order.
pub type ApplicantRecord = serde_json::Map<String, serde_json::Value>;

/// Errors raised while loading or evaluating a scoring model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Model artifact could not be read.
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    /// Model artifact is not valid JSON for any known model kind.
    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    /// Artifact was trained on different features or a different order.
    #[error("model features {found:?} do not match expected {expected:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Artifact does not carry the label used for the "bad" outcome.
    #[error("model classes {0:?} do not include the bad class label 1")]
    MissingBadClass(Vec<i64>),

    /// Artifact is structurally inconsistent.
    #[error("invalid model artifact: {0}")]
    Invalid(String),

    /// Input contains NaN or infinity.
    #[error("input contains infinity or a value too large")]
    NonFiniteInput,

    /// Evaluation overflowed or produced NaN.
    #[error("model produced a non-finite score")]
    NonFiniteOutput,

    /// Probability output does not cover the bad class.
    #[error("probability output has {found} entries, bad class is at index {index}")]
    ProbabilityShape { index: usize, found: usize },
}

/// Failure of a single `/predict` scoring request.
#[derive(Error, Debug)]
pub enum ScoringError {
    /// No model was loaded at startup.
    #[error("model not loaded")]
    ModelNotLoaded,

    /// A factor input is present but cannot be read as a number.
    #[error("could not convert {field} value {value} to float")]
    Coercion {
        field: &'static str,
        value: serde_json::Value,
    },

    /// Model evaluation failed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Failure of an applicant lookup.
#[derive(Error, Debug)]
pub enum LookupError {
    /// No row carries the requested applicant id.
    #[error("applicant {0} not found")]
    NotFound(i64),

    /// The store itself failed (missing table, I/O, poisoned lock).
    #[error("{0}")]
    Store(String),
}

/// A trained binary classifier over the five-feature vector.
pub trait ScoringModel: Send + Sync {
    /// Class labels in the order used by [`ScoringModel::predict_proba`].
    fn classes(&self) -> &[i64];

    /// Predicted class label.
    fn predict(&self, features: &FeatureVector) -> Result<i64, ModelError>;

    /// Probability per class, aligned with [`ScoringModel::classes`].
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError>;
}

/// Read-only access to stored applicant records.
pub trait RecordStore: Send + Sync {
    /// Fetches the single row whose id column equals `app_id`.
    fn get_application(&self, app_id: i64) -> Result<ApplicantRecord, LookupError>;
}

//! Logistic regression with optional standardisation.

use lender_core::{FeatureVector, ModelError, FEATURE_COUNT};
use serde::Deserialize;

/// Per-feature standardisation applied before the linear term.
#[derive(Debug, Clone, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler: Option<Scaler>,
}

impl LogisticRegression {
    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if self.coefficients.len() != FEATURE_COUNT {
            return Err(ModelError::Invalid(format!(
                "expected {} coefficients, found {}",
                FEATURE_COUNT,
                self.coefficients.len()
            )));
        }
        let Some(scaler) = &self.scaler else {
            return Ok(());
        };
        if scaler.mean.len() != FEATURE_COUNT || scaler.scale.len() != FEATURE_COUNT {
            return Err(ModelError::Invalid("scaler dimensions do not match features".into()));
        }
        if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(ModelError::Invalid("scaler contains a zero or non-finite scale".into()));
        }
        Ok(())
    }

    /// Signed distance from the decision boundary; positive favours `classes[1]`.
    ///
    /// Large finite inputs can overflow the linear term; that is an error, not a score.
    pub fn decision(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let x = features.values();
        let linear: f64 = (0..FEATURE_COUNT)
            .map(|i| {
                let value = match &self.scaler {
                    Some(s) => (x[i] - s.mean[i]) / s.scale[i],
                    None => x[i],
                };
                self.coefficients[i] * value
            })
            .sum();
        let z = self.intercept + linear;
        if z.is_finite() {
            Ok(z)
        } else {
            Err(ModelError::NonFiniteOutput)
        }
    }

    pub fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        let positive = sigmoid(self.decision(features)?);
        Ok(vec![1.0 - positive, positive])
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

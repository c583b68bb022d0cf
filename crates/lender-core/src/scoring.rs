//! Risk scoring: model call, bad-class probability and primary factor rule.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::features::{Coerced, RiskInput, EXTERNAL_RISK_ESTIMATE, NET_FRACTION_REVOLVING_BURDEN};
use crate::{ModelError, ScoringError, ScoringModel};

/// Class label meaning "bad / rejected".
pub const BAD_CLASS_LABEL: i64 = 1;

/// Revolving burden above this is reported as the primary factor.
pub const REVOLVING_BURDEN_THRESHOLD: f64 = 50.0;

/// Bureau risk estimates below this are reported as the primary factor.
pub const BUREAU_SCORE_THRESHOLD: f64 = 70.0;

/// Human-readable reason attached to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrimaryFactor {
    #[serde(rename = "excessive revolving burden")]
    ExcessiveRevolvingBurden,
    #[serde(rename = "low credit bureau risk score")]
    LowBureauScore,
    #[serde(rename = "standard risk profile")]
    StandardProfile,
}

impl PrimaryFactor {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimaryFactor::ExcessiveRevolvingBurden => "excessive revolving burden",
            PrimaryFactor::LowBureauScore => "low credit bureau risk score",
            PrimaryFactor::StandardProfile => "standard risk profile",
        }
    }

    /// Burden is checked first and wins even when the bureau score is also low.
    pub fn derive(revolving_burden: f64, bureau_score: f64) -> Self {
        if revolving_burden > REVOLVING_BURDEN_THRESHOLD {
            PrimaryFactor::ExcessiveRevolvingBurden
        } else if bureau_score < BUREAU_SCORE_THRESHOLD {
            PrimaryFactor::LowBureauScore
        } else {
            PrimaryFactor::StandardProfile
        }
    }
}

/// Response of a successful scoring request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub prediction: i64,
    /// Bad-class probability as a percentage, two decimals.
    pub probability: f64,
    pub primary_factor: PrimaryFactor,
}

/// Converts a probability to a percentage rounded to two decimal places.
///
/// Rounds on the exact decimal expansion, so 0.12345 reports 12.35.
pub fn round_percentage(probability: f64) -> f64 {
    let percent = probability * 100.0;
    format!("{percent:.2}").parse().unwrap_or(percent)
}

/// Scores client data against a loaded model.
#[derive(Clone)]
pub struct RiskScorer {
    model: Arc<dyn ScoringModel>,
    bad_class_index: usize,
}

impl RiskScorer {
    /// Resolves where the bad class sits in the model's probability output.
    pub fn new(model: Arc<dyn ScoringModel>) -> Result<Self, ModelError> {
        let classes = model.classes();
        let bad_class_index = classes
            .iter()
            .position(|&c| c == BAD_CLASS_LABEL)
            .ok_or_else(|| ModelError::MissingBadClass(classes.to_vec()))?;
        Ok(Self {
            model,
            bad_class_index,
        })
    }

    /// Scores a raw request body.
    pub fn score(&self, data: &Map<String, Value>) -> Result<RiskAssessment, ScoringError> {
        self.score_input(&RiskInput::from_map(data))
    }

    pub fn score_input(&self, input: &RiskInput) -> Result<RiskAssessment, ScoringError> {
        let features = input.feature_vector();
        if !features.is_finite() {
            return Err(ModelError::NonFiniteInput.into());
        }

        let prediction = self.model.predict(&features)?;
        let distribution = self.model.predict_proba(&features)?;
        let probability = distribution
            .get(self.bad_class_index)
            .copied()
            .ok_or(ModelError::ProbabilityShape {
                index: self.bad_class_index,
                found: distribution.len(),
            })?;
        if !probability.is_finite() {
            return Err(ModelError::NonFiniteOutput.into());
        }

        let burden = strict_field(input, NET_FRACTION_REVOLVING_BURDEN)?;
        let bureau_score = strict_field(input, EXTERNAL_RISK_ESTIMATE)?;
        let primary_factor = PrimaryFactor::derive(burden, bureau_score);

        debug!(
            ?features,
            prediction,
            probability,
            factor = primary_factor.as_str(),
            "Scored application"
        );

        Ok(RiskAssessment {
            prediction,
            probability: round_percentage(probability),
            primary_factor,
        })
    }
}

fn strict_field(input: &RiskInput, field: &'static str) -> Result<f64, ScoringError> {
    let coerced = input.field(field);
    coerced.strict_value().ok_or_else(|| ScoringError::Coercion {
        field,
        value: match coerced {
            Coerced::Defaulted(v) => v.clone(),
            _ => Value::Null,
        },
    })
}

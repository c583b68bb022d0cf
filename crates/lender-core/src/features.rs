//! Typed view of client-supplied scoring data.

use std::collections::HashMap;

use serde_json::{Map, Value};

pub const EXTERNAL_RISK_ESTIMATE: &str = "external_risk_estimate_c";
pub const NET_FRACTION_REVOLVING_BURDEN: &str = "net_fraction_revolving_burden";
pub const NUM_INQ_LAST_6M: &str = "num_inq_last_6m";
pub const PERCENT_TRADES_NEVER_DELQ: &str = "percent_trades_never_delq";
pub const M_SINCE_RECENT_DELQ: &str = "m_since_recent_delq";

pub const FEATURE_COUNT: usize = 5;

/// Model input columns, in training order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    EXTERNAL_RISK_ESTIMATE,
    NET_FRACTION_REVOLVING_BURDEN,
    NUM_INQ_LAST_6M,
    PERCENT_TRADES_NEVER_DELQ,
    M_SINCE_RECENT_DELQ,
];

/// Position of a feature within [`FEATURE_NAMES`].
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|f| *f == name)
}

/// Outcome of reading one raw JSON value as a number.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// Key was not supplied.
    Absent,
    /// Value parsed as a number (may be NaN or infinite when given as text).
    Value(f64),
    /// Value was supplied but is not numeric; kept for error reporting.
    Defaulted(Value),
}

impl Coerced {
    /// Numbers, booleans and numeric strings parse; everything else is defaulted.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(Coerced::Value)
                .unwrap_or_else(|| Coerced::Defaulted(value.clone())),
            Value::Bool(b) => Coerced::Value(if *b { 1.0 } else { 0.0 }),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(v) => Coerced::Value(v),
                Err(_) => Coerced::Defaulted(value.clone()),
            },
            Value::Null | Value::Array(_) | Value::Object(_) => Coerced::Defaulted(value.clone()),
        }
    }

    /// Lenient reading used for the model vector: missing, non-numeric and NaN become 0.
    pub fn model_value(&self) -> f64 {
        match self {
            Coerced::Value(v) if !v.is_nan() => *v,
            _ => 0.0,
        }
    }

    /// Strict reading used for the factor rule: missing is 0, non-numeric is `None`.
    pub fn strict_value(&self) -> Option<f64> {
        match self {
            Coerced::Absent => Some(0.0),
            Coerced::Value(v) => Some(*v),
            Coerced::Defaulted(_) => None,
        }
    }
}

/// The single-row, fixed-order numeric input handed to the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        feature_index(name).map(|i| self.0[i])
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

static ABSENT: Coerced = Coerced::Absent;

/// Scoring request parsed into the five known features.
///
/// Keys are lower-cased before lookup. When two keys collapse to the same
/// lower-case name, the one appearing later in the request body wins.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskInput {
    fields: [Coerced; FEATURE_COUNT],
}

impl RiskInput {
    pub fn from_map(data: &Map<String, Value>) -> Self {
        let normalized: HashMap<String, &Value> =
            data.iter().map(|(k, v)| (k.to_lowercase(), v)).collect();

        let fields = FEATURE_NAMES.map(|name| {
            normalized
                .get(name)
                .map(|v| Coerced::from_json(v))
                .unwrap_or(Coerced::Absent)
        });

        Self { fields }
    }

    /// Coercion outcome for a named feature; unknown names read as absent.
    pub fn field(&self, name: &str) -> &Coerced {
        feature_index(name)
            .map(|i| &self.fields[i])
            .unwrap_or(&ABSENT)
    }

    pub fn feature_vector(&self) -> FeatureVector {
        FeatureVector(self.fields.each_ref().map(Coerced::model_value))
    }
}

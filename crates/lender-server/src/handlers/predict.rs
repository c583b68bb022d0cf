//! Credit risk scoring.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use lender_core::RiskAssessment;
use serde_json::{Map, Value};
use tracing::error;

use crate::error::AppError;
use crate::state::AppState;

/// POST /predict - Scores an arbitrary field/value mapping.
pub async fn predict_risk(
    State(state): State<Arc<AppState>>,
    Json(data): Json<Map<String, Value>>,
) -> Result<Json<RiskAssessment>, AppError> {
    let assessment = state
        .scorer()
        .and_then(|scorer| scorer.score(&data))
        .map_err(|e| {
            error!("Scoring failed: {}", e);
            AppError::from(e)
        })?;

    Ok(Json(assessment))
}

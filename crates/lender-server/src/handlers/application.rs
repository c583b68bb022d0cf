//! Applicant record lookup.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use lender_core::{ApplicantRecord, LookupError};
use tracing::{error, info};

use crate::error::AppError;
use crate::state::AppState;

/// GET /application/{app_id} - Returns the stored row for an applicant.
///
/// The store is synchronous, so the query runs on the blocking pool.
pub async fn get_application(
    State(state): State<Arc<AppState>>,
    Path(app_id): Path<i64>,
) -> Result<Json<ApplicantRecord>, AppError> {
    let store = Arc::clone(&state.store);
    let lookup = tokio::task::spawn_blocking(move || store.get_application(app_id))
        .await
        .map_err(|e| {
            error!("Applicant lookup task failed: {}", e);
            AppError::Internal(e.to_string())
        })?;

    let record = lookup.map_err(|e| {
        match &e {
            LookupError::NotFound(_) => info!("Applicant {} not found", app_id),
            LookupError::Store(message) => error!("Applicant lookup failed: {}", message),
        }
        AppError::from(e)
    })?;

    Ok(Json(record))
}

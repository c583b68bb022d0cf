//! Dependencies shared by every request handler.

use std::sync::Arc;

use lender_core::{RecordStore, RiskScorer, ScoringError};

/// Built once at startup and handed to the router; never mutated afterwards.
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    /// `None` when the model artifact failed to load.
    pub scorer: Option<RiskScorer>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, scorer: Option<RiskScorer>) -> Self {
        Self { store, scorer }
    }

    pub fn scorer(&self) -> Result<&RiskScorer, ScoringError> {
        self.scorer.as_ref().ok_or(ScoringError::ModelNotLoaded)
    }
}

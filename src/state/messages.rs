use ncaa_bracket::Predictions;
use ncaa_bracket::wire::PredictionLogs;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionRequest {
    /// Generate a fresh run, persist it and publish it.
    Run,
    /// Re-read whatever the last run left on disk.
    Load,
    /// Archive the current results under a timestamped name.
    Save,
}

/// One complete prediction. Shared by every subscriber, never mutated.
#[derive(Debug, Default, PartialEq)]
pub struct PredictionPayload {
    pub predictions: Predictions,
    pub logs: Option<PredictionLogs>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingState {
    pub is_loading: bool,
    pub request: Option<PredictionRequest>,
}

#[derive(Debug, Clone)]
pub enum PredictionEvent {
    LoadingStateChanged { loading_state: LoadingState },
    PredictionComplete { payload: Arc<PredictionPayload> },
    PredictionLoaded { payload: Arc<PredictionPayload> },
    /// Load found no results document yet.
    NoPrediction,
    Saved { filename: String },
    Error { message: String },
}

impl PredictionEvent {
    /// Whether this event answers a request, as opposed to reporting progress.
    pub fn is_response(&self) -> bool {
        !matches!(self, PredictionEvent::LoadingStateChanged { .. })
    }
}

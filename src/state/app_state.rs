use crate::state::messages::{LoadingState, PredictionPayload};
use ncaa_bracket::stats::StatsSummary;
use ncaa_bracket::wire::PredictionLogs;
use ncaa_bracket::{Bracket, Team, assemble};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Bracket view state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct BracketState {
    pub bracket: Option<Bracket>,
}

impl BracketState {
    /// Rebuild the bracket from a freshly published prediction.
    pub fn load(&mut self, payload: &PredictionPayload) {
        self.bracket = Some(assemble(&payload.predictions));
    }

    pub fn champion(&self) -> Option<&Team> {
        self.bracket.as_ref()?.champion()
    }
}

// ---------------------------------------------------------------------------
// Stats view state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct StatsState {
    pub summary: Option<StatsSummary>,
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    /// The prediction every view was last rebuilt from.
    pub payload: Option<Arc<PredictionPayload>>,
    pub bracket: BracketState,
    pub stats: StatsState,
    pub logs: Option<PredictionLogs>,
    pub loading: LoadingState,
    /// Set when a load found nothing on disk.
    pub no_prediction: bool,
    pub last_saved: Option<String>,
    pub last_error: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_prediction(&self) -> bool {
        self.payload.is_some()
    }
}

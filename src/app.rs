use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::messages::{LoadingState, PredictionEvent, PredictionPayload};
use log::{error, info};
use ncaa_bracket::{MetricSource, RandomMetrics, aggregate};
use std::sync::Arc;

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    metrics: Box<dyn MetricSource + Send>,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let metrics: Box<dyn MetricSource + Send> = match settings.seed {
            Some(seed) => Box::new(RandomMetrics::seeded(seed)),
            None => Box::new(RandomMetrics::from_entropy()),
        };
        Self::with_metrics(settings, metrics)
    }

    pub fn with_metrics(settings: AppSettings, metrics: Box<dyn MetricSource + Send>) -> Self {
        Self {
            settings,
            state: AppState::new(),
            metrics,
        }
    }

    /// Apply one worker event. Returns true once the event answers the
    /// pending request.
    pub fn handle_event(&mut self, event: PredictionEvent) -> bool {
        let answered = event.is_response();
        match event {
            PredictionEvent::LoadingStateChanged { loading_state } => self.on_loading_changed(loading_state),
            PredictionEvent::PredictionComplete { payload } => {
                info!("prediction complete: {} games", payload.predictions.game_count());
                self.on_prediction(payload);
            }
            PredictionEvent::PredictionLoaded { payload } => self.on_prediction(payload),
            PredictionEvent::NoPrediction => self.on_no_prediction(),
            PredictionEvent::Saved { filename } => self.on_saved(filename),
            PredictionEvent::Error { message } => {
                error!("Prediction error: {message}");
                self.on_error(message);
            }
        }
        answered
    }

    // -----------------------------------------------------------------------
    // Worker event handlers
    // -----------------------------------------------------------------------

    /// Every view rebuilds from the same payload.
    pub fn on_prediction(&mut self, payload: Arc<PredictionPayload>) {
        self.state.last_error = None;
        self.state.no_prediction = false;
        self.state.bracket.load(&payload);
        self.state.stats.summary = Some(aggregate(&payload.predictions, self.metrics.as_mut()));
        self.state.logs = payload.logs.clone();
        self.state.payload = Some(payload);
    }

    pub fn on_no_prediction(&mut self) {
        info!("No prediction file exists yet");
        self.state.no_prediction = true;
    }

    pub fn on_saved(&mut self, filename: String) {
        self.state.last_error = None;
        self.state.last_saved = Some(filename);
    }

    pub fn on_loading_changed(&mut self, loading_state: LoadingState) {
        if let Some(request) = loading_state.request {
            info!("{request:?} in progress");
        }
        self.state.loading = loading_state;
    }

    pub fn on_error(&mut self, message: String) {
        self.state.last_error = Some(message);
    }
}

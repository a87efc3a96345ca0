use crate::state::app_settings::AppSettings;
use crate::state::messages::{LoadingState, PredictionEvent, PredictionPayload, PredictionRequest};
use anyhow::Context;
use chrono::Utc;
use log::{debug, error};
use ncaa_bracket::generate::Generator;
use ncaa_bracket::store::PredictionStore;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task;

/// Serialises prediction requests and fans results out to every subscriber.
pub struct PredictionWorker {
    generator: Generator,
    store: PredictionStore,
    requests: mpsc::Receiver<PredictionRequest>,
    events: broadcast::Sender<PredictionEvent>,
}

impl PredictionWorker {
    pub fn new(
        settings: &AppSettings,
        requests: mpsc::Receiver<PredictionRequest>,
        events: broadcast::Sender<PredictionEvent>,
    ) -> Self {
        let generator = match settings.seed {
            Some(seed) => Generator::seeded(seed),
            None => Generator::from_entropy(),
        };
        Self {
            generator,
            store: PredictionStore::new(settings.data_dir.clone()),
            requests,
            events,
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.publish(PredictionEvent::LoadingStateChanged {
                loading_state: LoadingState {
                    is_loading: true,
                    request: Some(request),
                },
            });

            let result = match request {
                PredictionRequest::Run => self.handle_run().await,
                PredictionRequest::Load => self.handle_load().await,
                PredictionRequest::Save => self.handle_save().await,
            };

            debug!("prediction request {request:?} complete");
            self.publish(PredictionEvent::LoadingStateChanged {
                loading_state: LoadingState::default(),
            });

            let event = result.unwrap_or_else(|err| {
                error!("{request:?} failed: {err:#}");
                PredictionEvent::Error {
                    message: format!("{err:#}"),
                }
            });
            self.publish(event);
        }
        debug!("request channel closed, prediction worker stopping");
    }

    /// Subscribers may come and go; an event nobody hears is not an error.
    fn publish(&self, event: PredictionEvent) {
        if self.events.send(event).is_err() {
            debug!("no subscribers for prediction event");
        }
    }

    // Store calls hit the filesystem, so they run on the blocking pool.

    async fn handle_run(&mut self) -> anyhow::Result<PredictionEvent> {
        debug!("generating prediction data");
        let run = self
            .generator
            .generate(Utc::now())
            .context("Failed to run prediction")?;

        // The run still reaches subscribers when the files can't be written.
        let store = self.store.clone();
        let run = task::spawn_blocking(move || {
            if let Err(e) = store.write(&run.predictions, &run.logs) {
                error!("Error writing prediction files: {e}");
            }
            run
        })
        .await
        .context("prediction writer stopped")?;

        Ok(PredictionEvent::PredictionComplete {
            payload: Arc::new(PredictionPayload {
                predictions: run.predictions,
                logs: Some(run.logs),
            }),
        })
    }

    async fn handle_load(&self) -> anyhow::Result<PredictionEvent> {
        debug!("loading prediction from {}", self.store.dir().display());
        let store = self.store.clone();
        let loaded = task::spawn_blocking(move || store.load())
            .await
            .context("prediction loader stopped")?
            .context("Failed to load prediction")?;
        Ok(match loaded {
            Some(loaded) => PredictionEvent::PredictionLoaded {
                payload: Arc::new(PredictionPayload {
                    predictions: loaded.predictions,
                    logs: loaded.logs,
                }),
            },
            None => PredictionEvent::NoPrediction,
        })
    }

    async fn handle_save(&self) -> anyhow::Result<PredictionEvent> {
        let store = self.store.clone();
        let filename = task::spawn_blocking(move || store.archive(Utc::now()))
            .await
            .context("prediction archiver stopped")?
            .context("Failed to save prediction")?;
        Ok(PredictionEvent::Saved { filename })
    }
}

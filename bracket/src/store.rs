use crate::mapping::{map_predictions, to_wire};
use crate::wire::{PredictionLogs, RawPredictions};
use crate::Predictions;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const RESULTS_FILE: &str = "prediction_results.json";
pub const LOGS_FILE: &str = "prediction_logs.json";
pub const DEFAULT_DATA_DIR: &str = "public";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No prediction results found. Run a prediction first.")]
    NoPrediction,
    #[error("could not access {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json { path: PathBuf, source: serde_json::Error },
}

/// What a previous run left on disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedPrediction {
    pub predictions: Predictions,
    /// None when the logs document is missing or unreadable.
    pub logs: Option<PredictionLogs>,
}

/// JSON documents in one data directory.
#[derive(Debug, Clone)]
pub struct PredictionStore {
    dir: PathBuf,
}

impl Default for PredictionStore {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl PredictionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn results_path(&self) -> PathBuf {
        self.dir.join(RESULTS_FILE)
    }

    pub fn logs_path(&self) -> PathBuf {
        self.dir.join(LOGS_FILE)
    }

    /// Replace both documents. Each file is written to a sibling temp file and
    /// renamed into place, so readers see the old or the new document whole.
    pub fn write(&self, predictions: &Predictions, logs: &PredictionLogs) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        write_json(&self.results_path(), &to_wire(predictions))?;
        write_json(&self.logs_path(), logs)?;
        debug!("wrote {} games to {}", predictions.game_count(), self.dir.display());
        Ok(())
    }

    /// `Ok(None)` when no run has been written yet. A broken logs document is
    /// only a warning: the predictions still load.
    pub fn load(&self) -> StoreResult<Option<LoadedPrediction>> {
        let path = self.results_path();
        let raw: RawPredictions = match read_json(&path) {
            Ok(raw) => raw,
            Err(StoreError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                debug!("no prediction file at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let logs = match read_json::<PredictionLogs>(&self.logs_path()) {
            Ok(logs) => Some(logs),
            Err(e) => {
                warn!("error reading logs: {e}");
                None
            }
        };

        Ok(Some(LoadedPrediction {
            predictions: map_predictions(raw),
            logs,
        }))
    }

    /// Copy the current results document to `bracket_<timestamp>.json` and
    /// return that filename. The timestamp is ISO-8601 with ':' replaced by '-'.
    pub fn archive(&self, now: DateTime<Utc>) -> StoreResult<String> {
        let results = self.results_path();
        if !results.exists() {
            return Err(StoreError::NoPrediction);
        }
        let document: serde_json::Value = read_json(&results)?;

        let filename = archive_filename(now);
        write_json(&self.dir.join(&filename), &document)?;
        debug!("archived prediction as {filename}");
        Ok(filename)
    }
}

pub fn archive_filename(now: DateTime<Utc>) -> String {
    let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true).replace(':', "-");
    format!("bracket_{timestamp}.json")
}

fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| StoreError::Json {
        path: path.to_owned(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StoreResult<()> {
    let body = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_owned(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body)
        .and_then(|()| fs::rename(&tmp, path))
        .map_err(|source| StoreError::Io {
            path: path.to_owned(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::Generator;
    use chrono::TimeZone;
    use tempfile::TempDir;

    /// The store lives in a `data` subdirectory so `write` has to create it.
    fn scratch() -> (TempDir, PredictionStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = PredictionStore::new(tmp.path().join("data"));
        (tmp, store)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 16, 18, 4, 5).unwrap()
    }

    #[test]
    fn missing_results_is_not_an_error() {
        let (_tmp, store) = scratch();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn write_then_load_keeps_games_and_logs() {
        let (_tmp, store) = scratch();
        let run = Generator::seeded(9).generate(now()).unwrap();
        store.write(&run.predictions, &run.logs).unwrap();

        let loaded = store.load().unwrap().expect("results written");
        assert_eq!(loaded.predictions, run.predictions);
        assert_eq!(loaded.logs.as_ref(), Some(&run.logs));
        assert!(!store.results_path().with_extension("json.tmp").exists());
    }

    #[test]
    fn broken_logs_only_drop_the_logs() {
        let (_tmp, store) = scratch();
        let run = Generator::seeded(2).generate(now()).unwrap();
        store.write(&run.predictions, &run.logs).unwrap();
        fs::write(store.logs_path(), "{ not json").unwrap();

        let loaded = store.load().unwrap().expect("results written");
        assert!(loaded.logs.is_none());
        assert_eq!(loaded.predictions.game_count(), 63);
    }

    #[test]
    fn corrupt_results_is_an_error() {
        let (_tmp, store) = scratch();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.results_path(), "[1, 2").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Json { .. })));
    }

    #[test]
    fn archive_needs_a_prediction() {
        let (_tmp, store) = scratch();
        let err = store.archive(now()).unwrap_err();
        assert!(matches!(err, StoreError::NoPrediction));
        assert_eq!(err.to_string(), "No prediction results found. Run a prediction first.");
    }

    #[test]
    fn archive_copies_results_under_timestamped_name() {
        let (_tmp, store) = scratch();
        let run = Generator::seeded(4).generate(now()).unwrap();
        store.write(&run.predictions, &run.logs).unwrap();

        let filename = store.archive(now()).unwrap();
        assert_eq!(filename, "bracket_2025-03-16T18-04-05.000Z.json");

        let archived: RawPredictions =
            serde_json::from_str(&fs::read_to_string(store.dir().join(&filename)).unwrap()).unwrap();
        assert_eq!(map_predictions(archived), run.predictions);
    }
}

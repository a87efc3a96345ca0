/// Raw JSON shapes of the two documents a prediction run leaves on disk.
/// These map to the clean domain types via the functions in mapping.rs.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// prediction_results.json
// ---------------------------------------------------------------------------

/// Top-level results document: `{"1": [...], "2": [...], ...}`.
/// Keys stay strings here so a stray non-numeric key can't sink the whole file.
pub type RawPredictions = BTreeMap<String, Vec<WireGame>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireGame {
    pub matchup: WireMatchup,
    pub prediction: WirePrediction,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireMatchup {
    pub team1: String,
    pub team2: String,
    /// Absent on Final Four and Championship games.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default)]
    pub team1_name: Option<String>,
    #[serde(default)]
    pub team2_name: Option<String>,
    #[serde(default)]
    pub team1_seed: Option<u8>,
    #[serde(default)]
    pub team2_seed: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WirePrediction {
    pub winner: String,
    #[serde(default)]
    pub win_probability: f64,
    #[serde(default)]
    pub point_difference: f64,
    /// Kept untyped on the wire; mapping.rs decides whether it fits `Reasoning`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// prediction_logs.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionLogs {
    pub prediction_start_time: Option<DateTime<Utc>>,
    pub prediction_end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub model_parameters: ModelParameters,
    #[serde(default)]
    pub training_metrics: TrainingMetrics,
    #[serde(default)]
    pub prediction_summary: PredictionSummary,
    #[serde(default)]
    pub execution_log: Vec<String>,
    #[serde(default)]
    pub team_performance: BTreeMap<String, TeamPerformance>,
    #[serde(default)]
    pub upset_analysis: UpsetAnalysis,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub lstm_lookback: u32,
    pub mean_regression_lookback: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub lstm_loss: f64,
    pub regression_mse: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub total_games: usize,
    pub upsets: usize,
    pub close_games: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamPerformance {
    pub effective_fg_pct: f64,
    pub turnover_pct: f64,
    pub offensive_rebound_pct: f64,
    pub defensive_efficiency: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpsetAnalysis {
    /// e.g. "15 seed over 2 seed"; None when the run had no upsets.
    pub biggest_upset: Option<String>,
    pub upset_regions: Vec<String>,
    pub upset_rounds: Vec<u32>,
}

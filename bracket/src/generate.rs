use crate::pairing::{PairingError, championship_pair, final_four_pairs, pair_region_round};
use crate::reasoning::explain;
use crate::stats::{MetricSource, RandomMetrics};
use crate::wire::{
    ModelParameters, PredictionLogs, PredictionSummary, TeamPerformance, TrainingMetrics, UpsetAnalysis,
};
use crate::{Game, Predictions, RoundKind, Team};
use chrono::{DateTime, Duration, Utc};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::ops::Range;

/// First-round seed pairings, top of the region bracket to bottom.
pub const SEED_MATCHUPS: [(u8, u8); 8] = [(1, 16), (8, 9), (5, 12), (4, 13), (6, 11), (3, 14), (7, 10), (2, 15)];

/// A game decided by fewer points than this counts as close.
pub const CLOSE_GAME_MARGIN: f64 = 5.0;

const RUN_DURATION_SECS: i64 = 30;

const EXECUTION_LOG: [&str; 6] = [
    "Initializing tournament teams...",
    "Creating bracket structure...",
    "Fetching team statistics...",
    "Training prediction models...",
    "Building bracket predictions...",
    "Prediction complete!",
];

// ---------------------------------------------------------------------------
// Seed field
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RegionSeeds {
    pub name: String,
    pub teams: BTreeMap<u8, String>,
}

impl RegionSeeds {
    pub fn new(name: &str, teams: &[(u8, &str)]) -> Self {
        Self {
            name: name.to_owned(),
            teams: teams.iter().map(|(seed, team)| (*seed, (*team).to_owned())).collect(),
        }
    }

    fn team(&self, seed: u8) -> Option<Team> {
        self.teams.get(&seed).map(|name| Team::new(&self.name, seed, name.as_str()))
    }
}

/// West, East, South, Midwest with sixteen named seeds each.
pub fn default_field() -> Vec<RegionSeeds> {
    vec![
        RegionSeeds::new(
            "West",
            &[
                (1, "Auburn"),
                (2, "Michigan State"),
                (3, "Iowa State"),
                (4, "Texas A&M"),
                (5, "Michigan"),
                (6, "Ole Miss"),
                (7, "Marquette"),
                (8, "Louisville"),
                (9, "Creighton"),
                (10, "New Mexico"),
                (11, "San Diego State"),
                (12, "UC San Diego"),
                (13, "Yale"),
                (14, "Lipscomb"),
                (15, "Bryant"),
                (16, "Alabama St."),
            ],
        ),
        RegionSeeds::new(
            "East",
            &[
                (1, "Duke"),
                (2, "Alabama"),
                (3, "Kentucky"),
                (4, "Maryland"),
                (5, "Memphis"),
                (6, "Illinois"),
                (7, "Saint Mary's"),
                (8, "Mississippi State"),
                (9, "Baylor"),
                (10, "Vanderbilt"),
                (11, "Texas"),
                (12, "Colorado State"),
                (13, "Grand Canyon"),
                (14, "Troy"),
                (15, "Robert Morris"),
                (16, "Saint Francis"),
            ],
        ),
        RegionSeeds::new(
            "South",
            &[
                (1, "Florida"),
                (2, "Saint John's"),
                (3, "Texas Tech"),
                (4, "Missouri"),
                (5, "Memphis"),
                (6, "BYU"),
                (7, "Kansas"),
                (8, "UConn"),
                (9, "Oklahoma"),
                (10, "Arkansas"),
                (11, "Drake"),
                (12, "Colorado State"),
                (13, "Akron"),
                (14, "UNC Wilmington"),
                (15, "Omaha"),
                (16, "American"),
            ],
        ),
        RegionSeeds::new(
            "Midwest",
            &[
                (1, "Houston"),
                (2, "Tennessee"),
                (3, "Wisconsin"),
                (4, "Arizona"),
                (5, "Oregon"),
                (6, "BYU"),
                (7, "UCLA"),
                (8, "Mississippi State"),
                (9, "Baylor"),
                (10, "Utah State"),
                (11, "VCU"),
                (12, "Liberty"),
                (13, "Akron"),
                (14, "Montana"),
                (15, "Wofford"),
                (16, "Mount St. Mary's"),
            ],
        ),
    ]
}

// ---------------------------------------------------------------------------
// Per-round randomness
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RoundProfile {
    /// Chance the favoured team loses.
    pub upset_chance: f64,
    pub favourite_win: Range<f64>,
    pub upset_win: Range<f64>,
    pub point_difference: Range<f64>,
}

impl RoundProfile {
    pub fn for_round(kind: RoundKind) -> Self {
        match kind {
            RoundKind::First => Self {
                upset_chance: 0.2,
                favourite_win: 0.6..0.9,
                upset_win: 0.5..0.7,
                point_difference: 2.0..17.0,
            },
            RoundKind::Second | RoundKind::Sweet16 | RoundKind::Elite8 => Self {
                upset_chance: 0.3,
                favourite_win: 0.5..0.8,
                upset_win: 0.5..0.8,
                point_difference: 1.0..13.0,
            },
            RoundKind::FinalFour => Self {
                upset_chance: 0.4,
                favourite_win: 0.5..0.75,
                upset_win: 0.5..0.75,
                point_difference: 1.0..11.0,
            },
            RoundKind::Championship => Self {
                upset_chance: 0.3,
                favourite_win: 0.5..0.9,
                upset_win: 0.5..0.9,
                point_difference: 2.0..10.0,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedRun {
    pub predictions: Predictions,
    pub logs: PredictionLogs,
}

/// Plays a mock tournament over a seed field.
#[derive(Debug, Clone)]
pub struct Generator<R: Rng = ChaCha8Rng> {
    rng: R,
    field: Vec<RegionSeeds>,
}

impl<R: Rng> Generator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            field: default_field(),
        }
    }

    pub fn with_field(mut self, field: Vec<RegionSeeds>) -> Self {
        self.field = field;
        self
    }

    /// Play all six rounds and write the matching logs document.
    ///
    /// The field must have exactly four regions for the Final Four to pair.
    pub fn generate(&mut self, started_at: DateTime<Utc>) -> Result<GeneratedRun, PairingError> {
        let mut predictions = Predictions::new();

        let first = self.first_round();
        predictions.insert_round(RoundKind::First.number(), first);

        for kind in [RoundKind::Second, RoundKind::Sweet16, RoundKind::Elite8] {
            let games = {
                let prev = predictions.round(kind.number() - 1);
                self.regional_round(kind, prev)
            };
            predictions.insert_round(kind.number(), games);
        }

        let final_four = {
            let regions: Vec<String> = self.field.iter().map(|r| r.name.clone()).collect();
            let pairs = final_four_pairs(predictions.round(RoundKind::Elite8.number()), &regions)?;
            pairs
                .into_iter()
                .map(|(team1, team2)| play(&mut self.rng, RoundKind::FinalFour, team1, team2, None))
                .collect()
        };
        predictions.insert_round(RoundKind::FinalFour.number(), final_four);

        let championship = match championship_pair(predictions.round(RoundKind::FinalFour.number())) {
            Some((team1, team2)) => vec![play(&mut self.rng, RoundKind::Championship, team1, team2, None)],
            None => {
                debug!("fewer than two Final Four winners, no championship game");
                Vec::new()
            }
        };
        predictions.insert_round(RoundKind::Championship.number(), championship);

        let logs = self.build_logs(started_at, &predictions);
        debug!(
            "generated {} games across {} regions",
            predictions.game_count(),
            self.field.len()
        );
        Ok(GeneratedRun { predictions, logs })
    }

    fn first_round(&mut self) -> Vec<Game> {
        let mut games = Vec::new();
        for region in &self.field {
            for (seed1, seed2) in SEED_MATCHUPS {
                let (Some(team1), Some(team2)) = (region.team(seed1), region.team(seed2)) else {
                    debug!("{}: no team for {seed1} vs {seed2}, skipping", region.name);
                    continue;
                };
                games.push(play(&mut self.rng, RoundKind::First, team1, team2, Some(region.name.as_str())));
            }
        }
        games
    }

    fn regional_round(&mut self, kind: RoundKind, prev: &[Game]) -> Vec<Game> {
        let mut games = Vec::new();
        for region in &self.field {
            for (team1, team2) in pair_region_round(prev, &region.name) {
                games.push(play(&mut self.rng, kind, team1, team2, Some(region.name.as_str())));
            }
        }
        games
    }

    fn build_logs(&mut self, started_at: DateTime<Utc>, predictions: &Predictions) -> PredictionLogs {
        let games = move || {
            RoundKind::ALL
                .into_iter()
                .flat_map(move |kind| predictions.round(kind.number()).iter().map(move |g| (kind, g)))
        };

        let prediction_summary = PredictionSummary {
            total_games: games().count(),
            upsets: games().filter(|(_, g)| g.is_upset()).count(),
            close_games: games().filter(|(_, g)| g.point_difference < CLOSE_GAME_MARGIN).count(),
        };

        let mut upset_analysis = UpsetAnalysis::default();
        let mut biggest_gap = 0;
        for (kind, game) in games().filter(|(_, g)| g.is_upset()) {
            if let (Some(winner), Some(loser)) = (game.winning_team(), game.losing_team()) {
                let gap = winner.seed - loser.seed;
                if gap > biggest_gap {
                    biggest_gap = gap;
                    upset_analysis.biggest_upset = Some(format!("{} seed over {} seed", winner.seed, loser.seed));
                }
            }
            if let Some(region) = &game.region
                && !upset_analysis.upset_regions.contains(region)
            {
                upset_analysis.upset_regions.push(region.clone());
            }
            if !upset_analysis.upset_rounds.contains(&kind.number()) {
                upset_analysis.upset_rounds.push(kind.number());
            }
        }

        let mut metrics = RandomMetrics::new(&mut self.rng);
        let team_performance = self
            .field
            .iter()
            .filter_map(|region| region.team(1))
            .map(|team| {
                let m = metrics.metrics_for(&team);
                let performance = TeamPerformance {
                    effective_fg_pct: two_decimals(m.effective_fg_pct),
                    turnover_pct: two_decimals(m.turnover_pct),
                    offensive_rebound_pct: two_decimals(m.offensive_rebound_pct),
                    defensive_efficiency: (m.defensive_efficiency * 10.0).round() / 10.0,
                };
                (team.name, performance)
            })
            .collect();

        PredictionLogs {
            prediction_start_time: Some(started_at),
            prediction_end_time: Some(started_at + Duration::seconds(RUN_DURATION_SECS)),
            model_parameters: ModelParameters {
                lstm_lookback: 10,
                mean_regression_lookback: 5,
            },
            training_metrics: TrainingMetrics {
                lstm_loss: 0.0023,
                regression_mse: 0.0045,
            },
            prediction_summary,
            execution_log: EXECUTION_LOG.iter().map(|line| (*line).to_owned()).collect(),
            team_performance,
            upset_analysis,
        }
    }
}

impl Generator<ChaCha8Rng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }
}

/// Decide one matchup. team1 is favoured iff its seed is numerically lower;
/// an upset roll flips the favoured outcome.
///
/// Both teams take the game's region, as they do when read back from disk.
fn play<R: Rng + ?Sized>(rng: &mut R, kind: RoundKind, mut team1: Team, mut team2: Team, region: Option<&str>) -> Game {
    let region = region.map(str::to_owned);
    team1.region = region.clone();
    team2.region = region.clone();

    let profile = RoundProfile::for_round(kind);
    let team1_favoured = team1.seed < team2.seed;
    let upset_roll = rng.gen_bool(profile.upset_chance);
    let winner_is_team1 = team1_favoured != upset_roll;

    let win_probability = if upset_roll {
        rng.gen_range(profile.upset_win)
    } else {
        rng.gen_range(profile.favourite_win)
    };
    let point_difference = rng.gen_range(profile.point_difference);
    let reasoning = explain(rng, &team1, &team2, winner_is_team1);

    Game {
        winner: if winner_is_team1 { team1.id.clone() } else { team2.id.clone() },
        region,
        team1,
        team2,
        win_probability,
        point_difference,
        reasoning: Some(reasoning),
    }
}

fn two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 16, 18, 0, 0).unwrap()
    }

    #[test]
    fn same_seed_same_tournament() {
        let a = Generator::seeded(42).generate(start()).expect("four regions");
        let b = Generator::seeded(42).generate(start()).expect("four regions");
        assert_eq!(a, b);
    }

    #[test]
    fn rounds_halve_down_to_a_champion() {
        let run = Generator::seeded(7).generate(start()).expect("four regions");
        let sizes: Vec<usize> = RoundKind::ALL.iter().map(|k| run.predictions.round(k.number()).len()).collect();
        assert_eq!(sizes, vec![32, 16, 8, 4, 2, 1]);
        assert_eq!(run.logs.prediction_summary.total_games, 63);
    }

    #[test]
    fn generated_tournament_is_valid() {
        for seed in 0..20 {
            let run = Generator::seeded(seed).generate(start()).expect("four regions");
            let violations = validate(&run.predictions);
            assert!(violations.is_empty(), "seed {seed}: {violations:?}");
        }
    }

    #[test]
    fn every_game_has_reasoning_and_sane_numbers() {
        let run = Generator::seeded(3).generate(start()).expect("four regions");
        for (number, games) in run.predictions.rounds() {
            let kind = RoundKind::from_number(number).expect("known round");
            let profile = RoundProfile::for_round(kind);
            for game in games {
                assert!(game.reasoning.is_some());
                assert!((0.5..0.9).contains(&game.win_probability));
                assert!(profile.point_difference.contains(&game.point_difference));
                assert_eq!(game.region.is_none(), kind.is_final_four());
            }
        }
    }

    #[test]
    fn logs_summarise_the_generated_games() {
        let run = Generator::seeded(11).generate(start()).expect("four regions");
        let logs = &run.logs;
        let games: Vec<&Game> = run.predictions.rounds().flat_map(|(_, g)| g.iter()).collect();

        assert_eq!(logs.prediction_summary.upsets, games.iter().filter(|g| g.is_upset()).count());
        assert_eq!(
            logs.prediction_summary.close_games,
            games.iter().filter(|g| g.point_difference < CLOSE_GAME_MARGIN).count()
        );
        assert_eq!(logs.prediction_end_time, Some(start() + Duration::seconds(30)));
        assert_eq!(logs.execution_log.len(), 6);
        let names: Vec<&str> = logs.team_performance.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Auburn", "Duke", "Florida", "Houston"]);
        assert_eq!(logs.upset_analysis.biggest_upset.is_some(), logs.prediction_summary.upsets > 0);
        let mut rounds = logs.upset_analysis.upset_rounds.clone();
        rounds.dedup();
        assert_eq!(rounds, logs.upset_analysis.upset_rounds);
    }

    #[test]
    fn three_region_field_cannot_pair_final_four() {
        let field = default_field().into_iter().take(3).collect();
        let err = Generator::seeded(1).with_field(field).generate(start()).unwrap_err();
        assert_eq!(err, PairingError::UnsupportedRegionCount(3));
    }

    #[test]
    fn missing_seed_skips_its_first_round_game() {
        let mut field = default_field();
        field[0].teams.remove(&16);
        let run = Generator::seeded(5).with_field(field).generate(start()).expect("four regions");
        assert_eq!(run.predictions.round(1).len(), 31);
    }
}

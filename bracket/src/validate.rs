use crate::{Predictions, RoundKind};
use std::collections::HashMap;
use std::fmt;

/// A structural problem in a per-round game map.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    UnknownRound(u32),
    MissingRegion { round: u32, game: usize },
    UnknownWinner { round: u32, game: usize, winner: String },
    ProbabilityOutOfRange { round: u32, game: usize, probability: f64 },
    NegativePointDifference { round: u32, game: usize, value: f64 },
    RegionNotHalved { region: String, round: u32, expected: usize, actual: usize },
    WinnerNotAdvanced { round: u32, team: String, appearances: usize },
    NotAPreviousWinner { round: u32, team: String },
    ChampionshipSize(usize),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UnknownRound(n) => write!(f, "round key {n} is not a tournament round"),
            Violation::MissingRegion { round, game } => {
                write!(f, "round {round} game {game} has no region")
            }
            Violation::UnknownWinner { round, game, winner } => {
                write!(f, "round {round} game {game}: winner {winner} is neither team")
            }
            Violation::ProbabilityOutOfRange { round, game, probability } => {
                write!(f, "round {round} game {game}: win probability {probability} outside [0, 1]")
            }
            Violation::NegativePointDifference { round, game, value } => {
                write!(f, "round {round} game {game}: negative point difference {value}")
            }
            Violation::RegionNotHalved { region, round, expected, actual } => {
                write!(f, "{region} round {round}: expected {expected} games, found {actual}")
            }
            Violation::WinnerNotAdvanced { round, team, appearances } => {
                write!(f, "round {round}: previous winner {team} appears {appearances} times")
            }
            Violation::NotAPreviousWinner { round, team } => {
                write!(f, "round {round}: {team} did not win in round {}", round - 1)
            }
            Violation::ChampionshipSize(n) => {
                write!(f, "championship has {n} games once the Final Four is complete")
            }
        }
    }
}

/// Check the bracket invariants. An empty result means the map is consistent.
pub fn validate(predictions: &Predictions) -> Vec<Violation> {
    let mut violations = Vec::new();

    for number in predictions.round_numbers() {
        if RoundKind::from_number(number).is_none() {
            violations.push(Violation::UnknownRound(number));
        }
    }

    for kind in RoundKind::ALL {
        let round = kind.number();
        for (game, g) in predictions.round(round).iter().enumerate() {
            if kind.depth().is_some() && g.region.is_none() {
                violations.push(Violation::MissingRegion { round, game });
            }
            if g.winning_team().is_none() {
                violations.push(Violation::UnknownWinner {
                    round,
                    game,
                    winner: g.winner.clone(),
                });
            }
            if !(0.0..=1.0).contains(&g.win_probability) {
                violations.push(Violation::ProbabilityOutOfRange {
                    round,
                    game,
                    probability: g.win_probability,
                });
            }
            if g.point_difference < 0.0 {
                violations.push(Violation::NegativePointDifference {
                    round,
                    game,
                    value: g.point_difference,
                });
            }
        }
    }

    check_halving(predictions, &mut violations);
    check_winner_closure(predictions, &mut violations);

    let final_four = predictions.round(RoundKind::FinalFour.number()).len();
    let championship = predictions.round(RoundKind::Championship.number()).len();
    if final_four >= 2 && championship != 1 {
        violations.push(Violation::ChampionshipSize(championship));
    }

    violations
}

/// Within a region each regional round has half the games of the one before,
/// checked only where the later round has been played.
fn check_halving(predictions: &Predictions, violations: &mut Vec<Violation>) {
    let per_region = move |round: u32| {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for g in predictions.round(round) {
            if let Some(region) = g.region.as_deref() {
                *counts.entry(region).or_default() += 1;
            }
        }
        counts
    };

    for pair in RoundKind::REGIONAL.windows(2) {
        let (prev, next) = (pair[0].number(), pair[1].number());
        if predictions.round(next).is_empty() {
            continue;
        }
        let prev_counts = per_region(prev);
        let next_counts = per_region(next);

        let mut regions: Vec<&str> = prev_counts.keys().chain(next_counts.keys()).copied().collect();
        regions.sort_unstable();
        regions.dedup();

        for region in regions {
            let expected = prev_counts.get(region).copied().unwrap_or(0) / 2;
            let actual = next_counts.get(region).copied().unwrap_or(0);
            if expected != actual {
                violations.push(Violation::RegionNotHalved {
                    region: region.to_owned(),
                    round: next,
                    expected,
                    actual,
                });
            }
        }
    }
}

/// Winners of round r−1 each play exactly once in round r, and nobody else does.
/// Skipped when either round is missing.
fn check_winner_closure(predictions: &Predictions, violations: &mut Vec<Violation>) {
    for pair in RoundKind::ALL.windows(2) {
        let (prev, next) = (pair[0].number(), pair[1].number());
        let (prev_games, next_games) = (predictions.round(prev), predictions.round(next));
        if prev_games.is_empty() || next_games.is_empty() {
            continue;
        }

        let winners: Vec<&str> = prev_games.iter().map(|g| g.winner.as_str()).collect();

        let mut appearances: HashMap<&str, usize> = HashMap::new();
        for g in next_games {
            for team in [&g.team1, &g.team2] {
                *appearances.entry(team.id.as_str()).or_default() += 1;
            }
        }

        for winner in &winners {
            let count = appearances.get(winner).copied().unwrap_or(0);
            if count != 1 {
                violations.push(Violation::WinnerNotAdvanced {
                    round: next,
                    team: (*winner).to_owned(),
                    appearances: count,
                });
            }
        }

        for g in next_games {
            for team in [&g.team1, &g.team2] {
                if !winners.contains(&team.id.as_str()) {
                    violations.push(Violation::NotAPreviousWinner {
                        round: next,
                        team: team.id.clone(),
                    });
                }
            }
        }
    }
}

pub mod assemble;
pub mod generate;
pub mod mapping;
pub mod pairing;
pub mod reasoning;
pub mod stats;
pub mod store;
pub mod validate;
pub mod wire;

pub use assemble::assemble;
pub use stats::{FixedMetrics, MetricSource, RandomMetrics, StatsSummary, TeamMetrics, aggregate};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Domain types, independent of the JSON document layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String, // "{region}_{seed}", e.g. "west_1"
    pub name: String,
    pub seed: u8,
    pub region: Option<String>,
}

impl Team {
    pub fn new(region: &str, seed: u8, name: impl Into<String>) -> Self {
        Self {
            id: team_id(region, seed),
            name: name.into(),
            seed,
            region: Some(region.to_owned()),
        }
    }
}

pub fn team_id(region: &str, seed: u8) -> String {
    format!("{}_{seed}", region.to_lowercase())
}

/// One predicted matchup. Region is `None` for Final Four and Championship games.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub team1: Team,
    pub team2: Team,
    pub region: Option<String>,
    pub winner: String,
    pub win_probability: f64,
    pub point_difference: f64,
    pub reasoning: Option<Reasoning>,
}

impl Game {
    pub fn winner_is_team1(&self) -> bool {
        self.winner == self.team1.id
    }

    /// The team whose id matches `winner`, if either does.
    pub fn winning_team(&self) -> Option<&Team> {
        if self.winner == self.team1.id {
            Some(&self.team1)
        } else if self.winner == self.team2.id {
            Some(&self.team2)
        } else {
            None
        }
    }

    pub fn losing_team(&self) -> Option<&Team> {
        if self.winner == self.team1.id {
            Some(&self.team2)
        } else if self.winner == self.team2.id {
            Some(&self.team1)
        } else {
            None
        }
    }

    /// Seed 1 is strongest: a win by the numerically larger seed is an upset.
    pub fn is_upset(&self) -> bool {
        let (winner_seed, loser_seed) = if self.winner_is_team1() {
            (self.team1.seed, self.team2.seed)
        } else {
            (self.team2.seed, self.team1.seed)
        };
        winner_seed > loser_seed
    }

    pub fn involves(&self, team_id: &str) -> bool {
        self.team1.id == team_id || self.team2.id == team_id
    }
}

// ---------------------------------------------------------------------------
// Matchup reasoning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reasoning {
    pub summary: String,
    pub key_factors: Vec<String>,
    pub team_comparison: TeamComparison,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamComparison {
    pub team1: TeamProfile,
    pub team2: TeamProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamProfile {
    pub name: String,
    pub seed: u8,
    pub stats: ScoutingStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoutingStats {
    pub offensive_efficiency: f64,
    pub defensive_efficiency: f64,
    pub rebounding_rate: f64,
    pub turnover_rate: f64,
    pub three_point_pct: f64,
    pub strength_of_schedule: f64,
    pub recent_form: Form,
    pub key_player_status: PlayerStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Form {
    Strong,
    #[default]
    Average,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    #[default]
    Healthy,
    Injured,
}

// ---------------------------------------------------------------------------
// Rounds
// ---------------------------------------------------------------------------

/// Ordered from earliest to latest. Numbered 1–6 in the results document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoundKind {
    #[default]
    First,
    Second,
    Sweet16,
    Elite8,
    FinalFour,
    Championship,
}

impl RoundKind {
    pub const ALL: [RoundKind; 6] = [
        RoundKind::First,
        RoundKind::Second,
        RoundKind::Sweet16,
        RoundKind::Elite8,
        RoundKind::FinalFour,
        RoundKind::Championship,
    ];

    /// The four rounds played inside a region.
    pub const REGIONAL: [RoundKind; 4] = [
        RoundKind::First,
        RoundKind::Second,
        RoundKind::Sweet16,
        RoundKind::Elite8,
    ];

    pub fn from_number(number: u32) -> Option<Self> {
        match number {
            1 => Some(RoundKind::First),
            2 => Some(RoundKind::Second),
            3 => Some(RoundKind::Sweet16),
            4 => Some(RoundKind::Elite8),
            5 => Some(RoundKind::FinalFour),
            6 => Some(RoundKind::Championship),
            _ => None,
        }
    }

    pub fn number(&self) -> u32 {
        match self {
            RoundKind::First => 1,
            RoundKind::Second => 2,
            RoundKind::Sweet16 => 3,
            RoundKind::Elite8 => 4,
            RoundKind::FinalFour => 5,
            RoundKind::Championship => 6,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoundKind::First => "FIRST ROUND",
            RoundKind::Second => "SECOND ROUND",
            RoundKind::Sweet16 => "SWEET 16",
            RoundKind::Elite8 => "ELITE EIGHT",
            RoundKind::FinalFour => "FINAL FOUR",
            RoundKind::Championship => "CHAMPIONSHIP",
        }
    }

    pub fn dates(&self) -> &'static str {
        match self {
            RoundKind::First => "3/20-3/21",
            RoundKind::Second => "3/22-3/23",
            RoundKind::Sweet16 => "3/27-3/28",
            RoundKind::Elite8 => "3/29-3/30",
            RoundKind::FinalFour => "4/5",
            RoundKind::Championship => "4/7",
        }
    }

    pub fn is_final_four(&self) -> bool {
        matches!(self, RoundKind::FinalFour | RoundKind::Championship)
    }

    /// Column index inside a region bracket (0 = First … 3 = Elite8).
    pub fn depth(&self) -> Option<usize> {
        match self {
            RoundKind::First => Some(0),
            RoundKind::Second => Some(1),
            RoundKind::Sweet16 => Some(2),
            RoundKind::Elite8 => Some(3),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Round {
    pub kind: RoundKind,
    pub name: &'static str,
    pub dates: &'static str,
    pub games: Vec<Game>,
}

impl Round {
    pub fn new(kind: RoundKind, games: Vec<Game>) -> Self {
        Self {
            kind,
            name: kind.label(),
            dates: kind.dates(),
            games,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionBracket {
    pub name: String, // "West", "East", "South", "Midwest"
    pub rounds: Vec<Round>,
}

/// Hierarchical bracket: regions split into two poster halves around the
/// national rounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Bracket {
    pub left_regions: Vec<RegionBracket>,
    pub right_regions: Vec<RegionBracket>,
    pub final_four: Round,
    pub championship: Round,
}

impl Bracket {
    pub fn regions(&self) -> impl Iterator<Item = &RegionBracket> {
        self.left_regions.iter().chain(self.right_regions.iter())
    }

    pub fn champion(&self) -> Option<&Team> {
        self.championship.games.first()?.winning_team()
    }

    pub fn is_empty(&self) -> bool {
        self.left_regions.is_empty()
            && self.right_regions.is_empty()
            && self.final_four.games.is_empty()
            && self.championship.games.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Per-round game map
// ---------------------------------------------------------------------------

/// Round number → games, as produced by one prediction run. Keys outside 1–6
/// are kept so callers can report them, but the core ignores them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Predictions {
    rounds: BTreeMap<u32, Vec<Game>>,
}

impl Predictions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_round(&mut self, number: u32, games: Vec<Game>) {
        self.rounds.insert(number, games);
    }

    pub fn round(&self, number: u32) -> &[Game] {
        self.rounds.get(&number).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn rounds(&self) -> impl Iterator<Item = (u32, &[Game])> {
        self.rounds.iter().map(|(n, games)| (*n, games.as_slice()))
    }

    pub fn round_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.rounds.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.values().all(Vec::is_empty)
    }

    pub fn game_count(&self) -> usize {
        self.rounds.values().map(Vec::len).sum()
    }

    /// Every game the team played, earliest round first.
    pub fn games_for_team<'a>(
        &'a self,
        team_id: &'a str,
    ) -> impl Iterator<Item = (RoundKind, &'a Game)> + 'a {
        self.rounds
            .iter()
            .filter_map(|(n, games)| RoundKind::from_number(*n).map(|kind| (kind, games)))
            .flat_map(move |(kind, games)| {
                games.iter().filter(move |g| g.involves(team_id)).map(move |g| (kind, g))
            })
    }
}

impl FromIterator<(u32, Vec<Game>)> for Predictions {
    fn from_iter<I: IntoIterator<Item = (u32, Vec<Game>)>>(iter: I) -> Self {
        Self {
            rounds: iter.into_iter().collect(),
        }
    }
}

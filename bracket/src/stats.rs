use crate::{Predictions, RoundKind, Team};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

// ---------------------------------------------------------------------------
// Per-team metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamMetrics {
    pub effective_fg_pct: f64,
    pub turnover_pct: f64,
    pub offensive_rebound_pct: f64,
    pub defensive_efficiency: f64,
}

impl TeamMetrics {
    /// Inside the placeholder ranges `RandomMetrics` draws from.
    pub fn is_plausible(&self) -> bool {
        (0.4..0.6).contains(&self.effective_fg_pct)
            && (0.1..0.2).contains(&self.turnover_pct)
            && (0.2..0.4).contains(&self.offensive_rebound_pct)
            && (90.0..110.0).contains(&self.defensive_efficiency)
    }
}

/// Where per-team metrics come from. The aggregator asks once per distinct team.
pub trait MetricSource {
    fn metrics_for(&mut self, team: &Team) -> TeamMetrics;
}

/// Placeholder noise: eFG% [0.4, 0.6), TO% [0.1, 0.2), ORB% [0.2, 0.4),
/// defensive efficiency [90, 110).
#[derive(Debug, Clone)]
pub struct RandomMetrics<R: Rng = ChaCha8Rng> {
    rng: R,
}

impl<R: Rng> RandomMetrics<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomMetrics<ChaCha8Rng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> MetricSource for RandomMetrics<R> {
    fn metrics_for(&mut self, _team: &Team) -> TeamMetrics {
        TeamMetrics {
            effective_fg_pct: self.rng.gen_range(0.4..0.6),
            turnover_pct: self.rng.gen_range(0.1..0.2),
            offensive_rebound_pct: self.rng.gen_range(0.2..0.4),
            defensive_efficiency: self.rng.gen_range(90.0..110.0),
        }
    }
}

/// Same metrics for every team.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedMetrics(pub TeamMetrics);

impl MetricSource for FixedMetrics {
    fn metrics_for(&mut self, _team: &Team) -> TeamMetrics {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamStats {
    pub team_id: String,
    pub team_name: String,
    pub seed: u8,
    /// Region of the game the team was first recorded in, "Unknown" when that
    /// game has none.
    pub region: String,
    pub win_probability: f64,
    pub metrics: TeamMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegionStrength {
    pub name: String,
    /// Games played in the region across rounds 1–4.
    pub strength: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedAdvancement {
    pub seed: u8,
    /// Games won by this seed.
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSummary {
    pub total_games: usize,
    pub upsets: usize,
    pub upset_probability: f64,
    pub region_strength: Vec<RegionStrength>,
    pub seed_advancement: Vec<SeedAdvancement>,
    pub teams: Vec<TeamStats>,
}

impl StatsSummary {
    pub fn top_by_win_probability(&self, n: usize) -> Vec<&TeamStats> {
        self.top_by(n, |t| t.win_probability)
    }

    pub fn top_by_effective_fg(&self, n: usize) -> Vec<&TeamStats> {
        self.top_by(n, |t| t.metrics.effective_fg_pct)
    }

    /// Descending by `key`; ties keep encounter order.
    fn top_by(&self, n: usize, key: impl Fn(&TeamStats) -> f64) -> Vec<&TeamStats> {
        let mut ranked: Vec<&TeamStats> = self.teams.iter().collect();
        ranked.sort_by(|a, b| key(b).total_cmp(&key(a)));
        ranked.truncate(n);
        ranked
    }
}

/// One pass over rounds 1–6 (other keys ignored).
///
/// Teams are recorded from round 4 on: the winner with the game's win
/// probability, the loser with its complement. A team keeps the entry from
/// its first appearance, and `metrics` is only consulted for new teams.
pub fn aggregate<M: MetricSource + ?Sized>(predictions: &Predictions, metrics: &mut M) -> StatsSummary {
    let mut total_games = 0;
    let mut upsets = 0;
    let mut seed_counts: BTreeMap<u8, usize> = BTreeMap::new();
    let mut region_strength: Vec<RegionStrength> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut teams: Vec<TeamStats> = Vec::new();

    for kind in RoundKind::ALL {
        for game in predictions.round(kind.number()) {
            total_games += 1;
            if game.is_upset() {
                upsets += 1;
            }

            let winner_is_team1 = game.winner_is_team1();
            let (winner, loser) = if winner_is_team1 {
                (&game.team1, &game.team2)
            } else {
                (&game.team2, &game.team1)
            };
            *seed_counts.entry(winner.seed).or_default() += 1;

            if let Some(region) = game.region.as_deref() {
                match region_strength.iter_mut().find(|r| r.name == region) {
                    Some(entry) => entry.strength += 1,
                    None => region_strength.push(RegionStrength {
                        name: region.to_owned(),
                        strength: 1,
                    }),
                }
            }

            if kind.number() >= RoundKind::Elite8.number() {
                for (team, probability) in [
                    (winner, game.win_probability),
                    (loser, 1.0 - game.win_probability),
                ] {
                    if seen.insert(team.id.clone()) {
                        teams.push(TeamStats {
                            team_id: team.id.clone(),
                            team_name: team.name.clone(),
                            seed: team.seed,
                            region: game.region.clone().unwrap_or_else(|| "Unknown".into()),
                            win_probability: probability,
                            metrics: metrics.metrics_for(team),
                        });
                    }
                }
            }
        }
    }

    let upset_probability = if total_games == 0 {
        0.0
    } else {
        upsets as f64 / total_games as f64
    };

    StatsSummary {
        total_games,
        upsets,
        upset_probability,
        region_strength,
        seed_advancement: seed_counts
            .into_iter()
            .map(|(seed, count)| SeedAdvancement { seed, count })
            .collect(),
        teams,
    }
}

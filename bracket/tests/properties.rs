//! Property-based tests for bracket assembly, statistics and generation.

use proptest::prelude::*;

use chrono::{TimeZone, Utc};
use ncaa_bracket::generate::{Generator, SEED_MATCHUPS};
use ncaa_bracket::pairing::pair_region_round;
use ncaa_bracket::validate::validate;
use ncaa_bracket::{FixedMetrics, Game, Predictions, RoundKind, Team, TeamMetrics, aggregate, assemble};
use std::collections::HashSet;

const REGIONS: [&str; 6] = ["West", "East", "South", "Midwest", "North", "Island"];

/// Strategy: one game with arbitrary seeds, optional region and either winner.
fn game_strategy() -> impl Strategy<Value = Game> {
    (
        prop::option::weighted(0.9, 0..REGIONS.len()),
        1..=16u8,
        1..=16u8,
        any::<bool>(),
        0.0..=1.0f64,
    )
        .prop_map(|(region, seed1, seed2, team1_wins, p)| {
            let name = region.map(|i| REGIONS[i]).unwrap_or("National");
            let team1 = Team::new(name, seed1, format!("{name} {seed1}"));
            let team2 = Team::new(name, seed2, format!("{name} {seed2}"));
            Game {
                winner: if team1_wins { team1.id.clone() } else { team2.id.clone() },
                region: region.map(|i| REGIONS[i].to_owned()),
                team1,
                team2,
                win_probability: p,
                point_difference: 3.0,
                reasoning: None,
            }
        })
}

/// Strategy: a sparse game map, round keys 0–8 so unknown keys show up too.
fn predictions_strategy() -> impl Strategy<Value = Predictions> {
    prop::collection::vec((0..=8u32, game_strategy()), 0..48).prop_map(|games| {
        let mut predictions = Predictions::new();
        for (round, game) in games {
            let mut existing = predictions.round(round).to_vec();
            existing.push(game);
            predictions.insert_round(round, existing);
        }
        predictions
    })
}

/// Play a hand-built game in `region`; `team1_wins` picks the winner.
fn decided(region: &str, team1: Team, team2: Team, team1_wins: bool) -> Game {
    Game {
        winner: if team1_wins { team1.id.clone() } else { team2.id.clone() },
        region: Some(region.to_owned()),
        team1,
        team2,
        win_probability: 0.6,
        point_difference: 4.0,
        reasoning: None,
    }
}

/// Rounds 1–4 for the first `regions` regions, every result taken from `coin`.
fn regional_rounds(regions: usize, coin: &[bool]) -> Predictions {
    let mut flips = coin.iter().copied().cycle();
    let mut predictions = Predictions::new();
    let mut prev: Vec<Game> = Vec::new();
    for kind in RoundKind::REGIONAL {
        let mut games = Vec::new();
        for region in &REGIONS[..regions] {
            if kind == RoundKind::First {
                for (s1, s2) in SEED_MATCHUPS {
                    let team = |seed: u8| Team::new(region, seed, format!("{region} {seed}"));
                    games.push(decided(region, team(s1), team(s2), flips.next().unwrap_or(true)));
                }
            } else {
                for (team1, team2) in pair_region_round(&prev, region) {
                    games.push(decided(region, team1, team2, flips.next().unwrap_or(true)));
                }
            }
        }
        predictions.insert_round(kind.number(), games.clone());
        prev = games;
    }
    predictions
}

fn fixed() -> FixedMetrics {
    FixedMetrics(TeamMetrics {
        effective_fg_pct: 0.5,
        turnover_pct: 0.15,
        offensive_rebound_pct: 0.3,
        defensive_efficiency: 100.0,
    })
}

proptest! {
    // 1. Upsets never exceed games, and the rate is a probability
    #[test]
    fn upsets_bounded(predictions in predictions_strategy()) {
        let summary = aggregate(&predictions, &mut fixed());
        prop_assert!(summary.upsets <= summary.total_games);
        prop_assert!((0.0..=1.0).contains(&summary.upset_probability));
        if summary.total_games == 0 {
            prop_assert_eq!(summary.upset_probability, 0.0);
        }
    }

    // 2. Seed advancement is strictly ascending and accounts for every game
    #[test]
    fn seed_advancement_sorted(predictions in predictions_strategy()) {
        let summary = aggregate(&predictions, &mut fixed());
        let seeds: Vec<u8> = summary.seed_advancement.iter().map(|s| s.seed).collect();
        prop_assert!(seeds.windows(2).all(|w| w[0] < w[1]), "seeds={seeds:?}");
        let counted: usize = summary.seed_advancement.iter().map(|s| s.count).sum();
        prop_assert_eq!(counted, summary.total_games);
    }

    // 3. Team list has unique ids, and repeating a late round changes nothing
    #[test]
    fn team_dedup_idempotent(predictions in predictions_strategy()) {
        let summary = aggregate(&predictions, &mut fixed());
        let ids: HashSet<&str> = summary.teams.iter().map(|t| t.team_id.as_str()).collect();
        prop_assert_eq!(ids.len(), summary.teams.len());

        let mut doubled = predictions.clone();
        let late = RoundKind::Championship.number();
        let mut games = predictions.round(late).to_vec();
        games.extend_from_slice(predictions.round(late));
        doubled.insert_round(late, games);
        prop_assert_eq!(aggregate(&doubled, &mut fixed()).teams, summary.teams);
    }

    // 4. Sides split ceil(n/2) left, rest right reversed, covering every region once
    #[test]
    fn sides_split_in_appearance_order(predictions in predictions_strategy()) {
        let bracket = assemble(&predictions);

        let mut order: Vec<String> = Vec::new();
        for kind in RoundKind::REGIONAL {
            for game in predictions.round(kind.number()) {
                if let Some(region) = &game.region
                    && !order.contains(region)
                {
                    order.push(region.clone());
                }
            }
        }

        prop_assert_eq!(bracket.left_regions.len(), order.len().div_ceil(2));
        let rebuilt: Vec<String> = bracket
            .left_regions
            .iter()
            .chain(bracket.right_regions.iter().rev())
            .map(|r| r.name.clone())
            .collect();
        prop_assert_eq!(rebuilt, order);
        prop_assert!(bracket.regions().all(|r| r.rounds.len() == 4));
    }

    // 5. Hand-built regions halve 8, 4, 2, 1 whatever the results
    #[test]
    fn hand_built_rounds_halve(
        regions in 1..=REGIONS.len(),
        coin in prop::collection::vec(any::<bool>(), 1..64),
    ) {
        let predictions = regional_rounds(regions, &coin);
        let bracket = assemble(&predictions);
        prop_assert_eq!(bracket.regions().count(), regions);
        for region in bracket.regions() {
            let sizes: Vec<usize> = region.rounds.iter().map(|r| r.games.len()).collect();
            prop_assert_eq!(sizes, vec![8, 4, 2, 1]);
        }
        prop_assert!(validate(&predictions).is_empty());
    }

    // 6. Generated tournaments halve per round and pass validation
    #[test]
    fn generated_rounds_halve(seed in any::<u64>()) {
        let start = Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        let run = Generator::seeded(seed).generate(start).unwrap();

        let bracket = assemble(&run.predictions);
        for region in bracket.regions() {
            let sizes: Vec<usize> = region.rounds.iter().map(|r| r.games.len()).collect();
            prop_assert_eq!(sizes, vec![8, 4, 2, 1]);
        }
        prop_assert_eq!(bracket.final_four.games.len(), 2);
        prop_assert_eq!(bracket.championship.games.len(), 1);
        prop_assert!(bracket.champion().is_some());

        let violations = validate(&run.predictions);
        prop_assert!(violations.is_empty(), "{violations:?}");
    }
}

use crate::{Bracket, Game, Predictions, RegionBracket, Round, RoundKind};
use log::debug;
use std::collections::HashMap;

/// Build the hierarchical bracket from a per-round game map.
///
/// Region grouping: rounds 1–4 are bucketed by each game's region tag. Regions
/// keep the order in which they are first seen scanning rounds ascending, and
/// every region gets all four rounds (empty when the map is sparse).
///
/// Sides: the first `ceil(n/2)` regions go left in order, the rest go right in
/// reverse, so the poster reads inward toward the Final Four.
pub fn assemble(predictions: &Predictions) -> Bracket {
    let mut order: Vec<String> = Vec::new();
    let mut regions: HashMap<String, [Vec<Game>; 4]> = HashMap::new();

    for (number, games) in predictions.rounds() {
        let Some(kind) = RoundKind::from_number(number) else {
            debug!("assemble: ignoring unknown round key {number}");
            continue;
        };
        let Some(depth) = kind.depth() else {
            continue;
        };
        for game in games {
            let Some(region) = game.region.as_deref() else {
                debug!("assemble: round {number} game {} vs {} has no region", game.team1.id, game.team2.id);
                continue;
            };
            if !regions.contains_key(region) {
                order.push(region.to_owned());
            }
            regions.entry(region.to_owned()).or_default()[depth].push(game.clone());
        }
    }

    let mut built: Vec<RegionBracket> = order
        .into_iter()
        .map(|name| {
            let rounds = regions.remove(&name).unwrap_or_default();
            RegionBracket {
                name,
                rounds: build_rounds(rounds),
            }
        })
        .collect();

    let right_regions: Vec<RegionBracket> = built.split_off(built.len().div_ceil(2)).into_iter().rev().collect();

    Bracket {
        left_regions: built,
        right_regions,
        final_four: national_round(predictions, RoundKind::FinalFour),
        championship: national_round(predictions, RoundKind::Championship),
    }
}

/// Zip the four regional buckets with their round labels, earliest first.
fn build_rounds(buckets: [Vec<Game>; 4]) -> Vec<Round> {
    RoundKind::REGIONAL
        .into_iter()
        .zip(buckets)
        .map(|(kind, games)| Round::new(kind, games))
        .collect()
}

fn national_round(predictions: &Predictions, kind: RoundKind) -> Round {
    Round::new(kind, predictions.round(kind.number()).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Team;

    fn game(region: Option<&str>, seed1: u8, seed2: u8, team1_wins: bool) -> Game {
        let r = region.unwrap_or("National");
        let team1 = Team::new(r, seed1, format!("{r} {seed1}"));
        let team2 = Team::new(r, seed2, format!("{r} {seed2}"));
        Game {
            winner: if team1_wins { team1.id.clone() } else { team2.id.clone() },
            region: region.map(str::to_owned),
            team1,
            team2,
            win_probability: 0.7,
            point_difference: 5.0,
            reasoning: None,
        }
    }

    fn names(regions: &[RegionBracket]) -> Vec<&str> {
        regions.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn single_region_single_game() {
        let predictions: Predictions = [(1, vec![game(Some("West"), 1, 16, true)])].into_iter().collect();
        let bracket = assemble(&predictions);

        assert_eq!(names(&bracket.left_regions), vec!["West"]);
        assert!(bracket.right_regions.is_empty());

        let west = &bracket.left_regions[0];
        assert_eq!(west.rounds.len(), 4);
        assert_eq!(west.rounds[0].name, "FIRST ROUND");
        assert_eq!(west.rounds[0].dates, "3/20-3/21");
        assert_eq!(west.rounds[0].games.len(), 1);
        assert!(west.rounds[1..].iter().all(|r| r.games.is_empty()));

        assert_eq!(bracket.final_four.name, "FINAL FOUR");
        assert!(bracket.final_four.games.is_empty());
        assert_eq!(bracket.championship.name, "CHAMPIONSHIP");
        assert_eq!(bracket.championship.dates, "4/7");
    }

    #[test]
    fn empty_input_gives_empty_bracket_with_labels() {
        let bracket = assemble(&Predictions::new());
        assert!(bracket.is_empty());
        assert_eq!(bracket.final_four.dates, "4/5");
        assert_eq!(bracket.championship.name, "CHAMPIONSHIP");
    }

    #[test]
    fn four_regions_split_left_in_order_right_reversed() {
        let round1 = ["West", "East", "South", "Midwest"]
            .into_iter()
            .map(|r| game(Some(r), 1, 16, true))
            .collect();
        let predictions: Predictions = [(1, round1)].into_iter().collect();
        let bracket = assemble(&predictions);

        assert_eq!(names(&bracket.left_regions), vec!["West", "East"]);
        assert_eq!(names(&bracket.right_regions), vec!["Midwest", "South"]);
    }

    #[test]
    fn west_favourites_sweep_the_first_two_rounds() {
        use crate::generate::SEED_MATCHUPS;
        use crate::pairing::pair_region_round;
        use crate::stats::{FixedMetrics, SeedAdvancement, aggregate};

        let favourite_wins = |team1: Team, team2: Team| {
            let winner = if team1.seed < team2.seed { team1.id.clone() } else { team2.id.clone() };
            Game {
                winner,
                region: Some("West".into()),
                team1,
                team2,
                win_probability: 0.7,
                point_difference: 10.0,
                reasoning: None,
            }
        };
        let round1: Vec<Game> = SEED_MATCHUPS
            .iter()
            .map(|&(s1, s2)| {
                let team = |seed: u8| Team::new("West", seed, format!("West {seed}"));
                favourite_wins(team(s1), team(s2))
            })
            .collect();
        let round2: Vec<Game> = pair_region_round(&round1, "West")
            .into_iter()
            .map(|(team1, team2)| favourite_wins(team1, team2))
            .collect();

        let first_only: Predictions = [(1, round1.clone())].into_iter().collect();
        let summary = aggregate(&first_only, &mut FixedMetrics::default());
        assert_eq!(summary.upset_probability, 0.0);
        let expected: Vec<SeedAdvancement> = (1..=8).map(|seed| SeedAdvancement { seed, count: 1 }).collect();
        assert_eq!(summary.seed_advancement, expected);

        let predictions: Predictions = [(1, round1), (2, round2)].into_iter().collect();
        let bracket = assemble(&predictions);
        assert_eq!(names(&bracket.left_regions), vec!["West"]);
        let west = &bracket.left_regions[0];
        let sizes: Vec<usize> = west.rounds.iter().map(|r| r.games.len()).collect();
        assert_eq!(sizes, vec![8, 4, 0, 0]);
        let round2_winners: Vec<u8> = west.rounds[1]
            .games
            .iter()
            .filter_map(|g| g.winning_team().map(|t| t.seed))
            .collect();
        assert_eq!(round2_winners, vec![1, 4, 3, 2]);
        assert_eq!(aggregate(&predictions, &mut FixedMetrics::default()).upsets, 0);
    }

    #[test]
    fn odd_region_count_puts_extra_on_the_left() {
        let round1 = ["A", "B", "C"].into_iter().map(|r| game(Some(r), 1, 16, true)).collect();
        let bracket = assemble(&[(1, round1)].into_iter().collect());
        assert_eq!(names(&bracket.left_regions), vec!["A", "B"]);
        assert_eq!(names(&bracket.right_regions), vec!["C"]);
    }

    #[test]
    fn region_first_seen_in_a_later_round_still_ordered_by_appearance() {
        let predictions: Predictions = [
            (1, vec![game(Some("East"), 1, 16, true)]),
            (3, vec![game(Some("South"), 1, 4, true), game(Some("East"), 1, 5, true)]),
        ]
        .into_iter()
        .collect();
        let bracket = assemble(&predictions);

        assert_eq!(names(&bracket.left_regions), vec!["East"]);
        assert_eq!(names(&bracket.right_regions), vec!["South"]);
        let south = &bracket.right_regions[0];
        assert!(south.rounds[0].games.is_empty());
        assert_eq!(south.rounds[2].games.len(), 1);
        assert_eq!(south.rounds[2].kind, RoundKind::Sweet16);
    }

    #[test]
    fn unknown_keys_and_regionless_games_are_omitted() {
        let predictions: Predictions = [
            (1, vec![game(None, 1, 16, true), game(Some("West"), 8, 9, false)]),
            (7, vec![game(Some("Nowhere"), 1, 2, true)]),
            (5, vec![game(None, 1, 2, true)]),
        ]
        .into_iter()
        .collect();
        let bracket = assemble(&predictions);

        assert_eq!(names(&bracket.left_regions), vec!["West"]);
        assert!(bracket.right_regions.is_empty());
        assert_eq!(bracket.left_regions[0].rounds[0].games.len(), 1);
        assert_eq!(bracket.final_four.games.len(), 1);
    }

    #[test]
    fn national_rounds_are_copied_verbatim() {
        let ff = vec![game(None, 1, 2, true), game(None, 3, 1, false)];
        let champ = vec![game(None, 1, 1, true)];
        let predictions: Predictions = [(5, ff.clone()), (6, champ.clone())].into_iter().collect();
        let bracket = assemble(&predictions);
        assert_eq!(bracket.final_four.games, ff);
        assert_eq!(bracket.championship.games, champ);
        assert_eq!(bracket.champion().map(|t| t.seed), Some(1));
    }
}

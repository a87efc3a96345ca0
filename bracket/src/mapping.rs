use crate::wire::{RawPredictions, WireGame, WireMatchup, WirePrediction};
use crate::{Game, Predictions, Reasoning, Team};
use log::debug;

// ---------------------------------------------------------------------------
// Mapping: wire document → clean domain types
// ---------------------------------------------------------------------------

/// Map a deserialized results document into the domain game map.
///
/// Non-numeric round keys are dropped,
/// missing names become "Team {id}", missing seeds become 0, and a reasoning
/// payload that doesn't match the `Reasoning` schema is discarded.
pub fn map_predictions(raw: RawPredictions) -> Predictions {
    raw.into_iter()
        .filter_map(|(key, games)| match key.trim().parse::<u32>() {
            Ok(number) => Some((number, games.into_iter().map(map_game).collect())),
            Err(_) => {
                debug!("dropping round with non-numeric key {key:?}");
                None
            }
        })
        .collect()
}

pub fn map_game(raw: WireGame) -> Game {
    let WireGame { matchup, prediction } = raw;

    let reasoning = prediction.reasoning.and_then(|value| {
        serde_json::from_value::<Reasoning>(value)
            .map_err(|e| debug!("discarding reasoning for {}: {e}", prediction.winner))
            .ok()
    });

    let team1 = map_team(&matchup.team1, matchup.team1_name, matchup.team1_seed, &matchup.region);
    let team2 = map_team(&matchup.team2, matchup.team2_name, matchup.team2_seed, &matchup.region);

    Game {
        team1,
        team2,
        region: matchup.region,
        winner: prediction.winner,
        win_probability: prediction.win_probability,
        point_difference: prediction.point_difference,
        reasoning,
    }
}

fn map_team(id: &str, name: Option<String>, seed: Option<u8>, region: &Option<String>) -> Team {
    Team {
        id: id.to_owned(),
        name: name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Team {id}")),
        seed: seed.unwrap_or(0),
        region: region.clone(),
    }
}

// ---------------------------------------------------------------------------
// Mapping: domain → wire document (for persistence)
// ---------------------------------------------------------------------------

pub fn to_wire(predictions: &Predictions) -> RawPredictions {
    predictions
        .rounds()
        .map(|(number, games)| (number.to_string(), games.iter().map(game_to_wire).collect()))
        .collect()
}

fn game_to_wire(game: &Game) -> WireGame {
    WireGame {
        matchup: WireMatchup {
            team1: game.team1.id.clone(),
            team2: game.team2.id.clone(),
            region: game.region.clone(),
            team1_name: Some(game.team1.name.clone()),
            team2_name: Some(game.team2.name.clone()),
            team1_seed: Some(game.team1.seed),
            team2_seed: Some(game.team2.seed),
        },
        prediction: WirePrediction {
            winner: game.winner.clone(),
            win_probability: game.win_probability,
            point_difference: game.point_difference,
            reasoning: game
                .reasoning
                .as_ref()
                .and_then(|r| serde_json::to_value(r).ok()),
        },
    }
}

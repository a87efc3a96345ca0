use crate::{Game, Team};
use log::debug;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
    #[error("Final Four pairing needs exactly 4 regions, got {0}")]
    UnsupportedRegionCount(usize),
}

/// Pair the winners of the previous round inside one region: (0,1), (2,3), …
/// in game order. An odd trailing winner is dropped.
pub fn pair_region_round(prev: &[Game], region: &str) -> Vec<(Team, Team)> {
    let winners: Vec<&Team> = prev
        .iter()
        .filter(|g| g.region.as_deref() == Some(region))
        .filter_map(Game::winning_team)
        .collect();

    if winners.len() % 2 == 1
        && let Some(last) = winners.last()
    {
        debug!("{region}: dropping unpaired winner {}", last.id);
    }

    winners
        .chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect()
}

/// Region champions meet first-vs-second and third-vs-fourth region.
///
/// A region's champion is the winner of its first Elite Eight game. A pair
/// where either region has no champion is skipped.
pub fn final_four_pairs(elite_eight: &[Game], regions: &[String]) -> Result<Vec<(Team, Team)>, PairingError> {
    if regions.len() != 4 {
        return Err(PairingError::UnsupportedRegionCount(regions.len()));
    }

    let champion = |region: &str| {
        elite_eight
            .iter()
            .find(|g| g.region.as_deref() == Some(region))
            .and_then(Game::winning_team)
            .cloned()
    };

    Ok(regions
        .chunks_exact(2)
        .filter_map(|pair| match (champion(pair[0].as_str()), champion(pair[1].as_str())) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => {
                debug!("no Final Four game for {} vs {}: missing champion", pair[0], pair[1]);
                None
            }
        })
        .collect())
}

/// The first two Final Four winners in game order.
pub fn championship_pair(final_four: &[Game]) -> Option<(Team, Team)> {
    let mut winners = final_four.iter().filter_map(Game::winning_team);
    let first = winners.next()?.clone();
    let second = winners.next()?.clone();
    Some((first, second))
}

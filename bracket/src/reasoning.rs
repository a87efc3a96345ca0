use crate::{Form, PlayerStatus, Reasoning, ScoutingStats, Team, TeamComparison, TeamProfile};
use rand::Rng;

const GENERIC_FACTORS: usize = 6;

/// Mock scouting report for a decided matchup.
///
/// Stats are drawn at one-decimal precision. When the winner is the
/// numerically larger seed the report leans on the underdog: its offence and
/// three-point shooting get a five-point bump, its form is Strong, and the
/// favourite is marked injured.
pub fn explain<R: Rng + ?Sized>(rng: &mut R, team1: &Team, team2: &Team, winner_is_team1: bool) -> Reasoning {
    let mut stats1 = scouting_stats(rng);
    let mut stats2 = scouting_stats(rng);

    let (winner, loser) = if winner_is_team1 { (team1, team2) } else { (team2, team1) };
    let upset = winner.seed > loser.seed;
    let seed_gap = winner.seed.abs_diff(loser.seed);

    let mut key_factors = Vec::new();
    {
        let (win, lose) = if winner_is_team1 {
            (&mut stats1, &mut stats2)
        } else {
            (&mut stats2, &mut stats1)
        };

        if upset {
            win.offensive_efficiency = one_decimal(win.offensive_efficiency + 5.0);
            win.three_point_pct = one_decimal(win.three_point_pct + 5.0);
            win.recent_form = Form::Strong;
            lose.key_player_status = PlayerStatus::Injured;

            key_factors.push(format!(
                "{}'s offensive efficiency ({}) exceeds expectations for a {} seed",
                winner.name, win.offensive_efficiency, winner.seed
            ));
            key_factors.push(format!(
                "{} has been shooting exceptionally well from 3-point range ({}%)",
                winner.name, win.three_point_pct
            ));
            key_factors.push(format!(
                "{} enters the tournament with strong momentum from recent games",
                winner.name
            ));
            key_factors.push(format!(
                "{} is dealing with key player injuries affecting their performance",
                loser.name
            ));
            key_factors.push(format!(
                "Historical data shows {seed_gap}-seed upsets occur in approximately {}% of tournament games",
                20 - i32::from(seed_gap)
            ));
        } else {
            key_factors.push(format!(
                "{}'s superior offensive efficiency ({} vs {})",
                winner.name, win.offensive_efficiency, lose.offensive_efficiency
            ));
            key_factors.push(format!(
                "{}'s stronger defensive rating ({} vs {})",
                winner.name, win.defensive_efficiency, lose.defensive_efficiency
            ));
            if win.strength_of_schedule > lose.strength_of_schedule {
                key_factors.push(format!(
                    "{} faced a tougher schedule (SOS: {} vs {})",
                    winner.name, win.strength_of_schedule, lose.strength_of_schedule
                ));
            }
            if seed_gap > 3 {
                key_factors.push(format!(
                    "Significant seed difference ({} vs {}) historically favors the higher seed",
                    winner.seed, loser.seed
                ));
            }
        }
    }

    key_factors.push(match rng.gen_range(0..GENERIC_FACTORS) {
        0 => format!(
            "Rebounding advantage ({}% vs {}%)",
            stats1.rebounding_rate, stats2.rebounding_rate
        ),
        1 => format!(
            "Turnover differential ({}% vs {}%)",
            stats1.turnover_rate, stats2.turnover_rate
        ),
        2 => format!(
            "Three-point shooting efficiency ({}% vs {}%)",
            stats1.three_point_pct, stats2.three_point_pct
        ),
        3 => "Recent performance trends favor the winner".to_owned(),
        4 => "Historical matchup results between these teams".to_owned(),
        _ => "Tournament experience factor".to_owned(),
    });

    let summary = if upset {
        format!(
            "This prediction represents an upset with the {} seed defeating the {} seed. \
             The model identified several key factors that suggest the underdog has a strong chance to advance.",
            winner.seed, loser.seed
        )
    } else {
        "This prediction follows the expected outcome with the favored team advancing. \
         The model's analysis of team statistics and historical tournament data strongly supports this result."
            .to_owned()
    };

    Reasoning {
        summary,
        key_factors,
        team_comparison: TeamComparison {
            team1: profile(team1, stats1),
            team2: profile(team2, stats2),
        },
    }
}

fn profile(team: &Team, stats: ScoutingStats) -> TeamProfile {
    TeamProfile {
        name: team.name.clone(),
        seed: team.seed,
        stats,
    }
}

fn scouting_stats<R: Rng + ?Sized>(rng: &mut R) -> ScoutingStats {
    ScoutingStats {
        offensive_efficiency: one_decimal(rng.gen_range(100.0..120.0)),
        defensive_efficiency: one_decimal(rng.gen_range(85.0..105.0)),
        rebounding_rate: one_decimal(rng.gen_range(45.0..60.0)),
        turnover_rate: one_decimal(rng.gen_range(10.0..20.0)),
        three_point_pct: one_decimal(rng.gen_range(30.0..45.0)),
        strength_of_schedule: one_decimal(rng.gen_range(1.0..11.0)),
        recent_form: if rng.gen_bool(0.5) { Form::Strong } else { Form::Average },
        key_player_status: if rng.gen_bool(0.2) {
            PlayerStatus::Injured
        } else {
            PlayerStatus::Healthy
        },
    }
}

fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

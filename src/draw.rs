use crate::state::app_state::AppState;
use ncaa_bracket::stats::{StatsSummary, TeamStats};
use ncaa_bracket::wire::PredictionLogs;
use ncaa_bracket::{Bracket, Game, Predictions, RegionBracket, Round, ScoutingStats, Team};
use serde_json::{Value, json};
use std::fmt::Write;

const NAME_WIDTH: usize = 18;
const TOP_TEAMS: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum View {
    #[default]
    All,
    Bracket,
    Stats,
    Logs,
}

impl View {
    fn shows_bracket(self) -> bool {
        matches!(self, View::All | View::Bracket)
    }

    fn shows_stats(self) -> bool {
        matches!(self, View::All | View::Stats)
    }

    fn shows_logs(self) -> bool {
        matches!(self, View::All | View::Logs)
    }
}

/// Plain-text rendering of whatever the app state holds for `view`, plus the
/// matchup detail for `team` when one is given.
pub fn render(state: &AppState, view: View, team: Option<&str>) -> String {
    if state.no_prediction && !state.has_prediction() {
        return "No prediction yet. Run `mmpredict run` first.\n".to_owned();
    }

    let mut sections: Vec<String> = Vec::new();
    if view.shows_bracket()
        && let Some(bracket) = &state.bracket.bracket
    {
        sections.push(render_bracket(bracket));
    }
    if view.shows_stats()
        && let Some(summary) = &state.stats.summary
    {
        sections.push(render_stats(summary));
    }
    if view.shows_logs() {
        match &state.logs {
            Some(logs) => sections.push(render_logs(logs)),
            None if view == View::Logs => sections.push("No prediction logs available.\n".to_owned()),
            None => {}
        }
    }
    if let (Some(team_id), Some(payload)) = (team, &state.payload) {
        sections.push(render_team_games(&payload.predictions, team_id));
    }
    sections.join("\n")
}

/// Machine-readable counterpart of `render`.
pub fn render_json(state: &AppState, view: View, team: Option<&str>) -> serde_json::Result<String> {
    let mut out = serde_json::Map::new();
    if view.shows_bracket() {
        out.insert("bracket".into(), serde_json::to_value(&state.bracket.bracket)?);
    }
    if view.shows_stats() {
        out.insert("stats".into(), serde_json::to_value(&state.stats.summary)?);
    }
    if view.shows_logs() {
        out.insert("logs".into(), serde_json::to_value(&state.logs)?);
    }
    if let (Some(team_id), Some(payload)) = (team, &state.payload) {
        let games: Vec<Value> = payload
            .predictions
            .games_for_team(team_id)
            .map(|(kind, game)| json!({ "round": kind.number(), "round_name": kind.label(), "game": game }))
            .collect();
        out.insert("team".into(), json!({ "id": team_id, "games": games }));
    }
    serde_json::to_string_pretty(&Value::Object(out))
}

// ---------------------------------------------------------------------------
// Bracket
// ---------------------------------------------------------------------------

/// Left regions, the national rounds, then right regions: the poster read
/// top to bottom.
pub fn render_bracket(bracket: &Bracket) -> String {
    let mut out = String::new();
    if bracket.is_empty() {
        out.push_str("Bracket is empty.\n");
        return out;
    }

    for region in &bracket.left_regions {
        render_region(&mut out, region);
    }
    render_round(&mut out, &bracket.final_four, "");
    render_round(&mut out, &bracket.championship, "");
    for region in &bracket.right_regions {
        render_region(&mut out, region);
    }

    match bracket.champion() {
        Some(team) => {
            let _ = writeln!(out, "\nCHAMPION: {}", format_seed_team(team));
        }
        None => out.push_str("\nCHAMPION: TBD\n"),
    }
    out
}

fn render_region(out: &mut String, region: &RegionBracket) {
    let _ = writeln!(out, "{}", region.name.to_uppercase());
    for round in &region.rounds {
        render_round(out, round, "  ");
    }
    out.push('\n');
}

fn render_round(out: &mut String, round: &Round, indent: &str) {
    let _ = writeln!(out, "{indent}{}  {}", round.name, round.dates);
    if round.games.is_empty() {
        let _ = writeln!(out, "{indent}    (no games)");
        return;
    }
    for game in &round.games {
        let _ = writeln!(out, "{indent}    {}", format_game_line(game));
    }
}

fn format_game_line(game: &Game) -> String {
    let winner = game
        .winning_team()
        .map(|t| t.name.as_str())
        .unwrap_or(game.winner.as_str());
    let upset = if game.is_upset() { "  UPSET" } else { "" };
    format!(
        "{} vs {} -> {winner} ({:.0}%, +{:.1}){upset}",
        format_team_cell(&game.team1),
        format_team_cell(&game.team2),
        game.win_probability * 100.0,
        game.point_difference,
    )
}

/// `"[seed] [name padded]"`, seed blank when unknown (0).
fn format_team_cell(team: &Team) -> String {
    let seed = if team.seed > 0 {
        format!("{:>2}", team.seed)
    } else {
        "  ".to_string()
    };
    format!("{seed} {}", truncate_name(&team.name, NAME_WIDTH))
}

fn format_seed_team(team: &Team) -> String {
    let seed = if team.seed > 0 {
        team.seed.to_string()
    } else {
        "-".to_string()
    };
    format!("({seed}) {}", team.name)
}

fn truncate_name(name: &str, max: usize) -> String {
    let mut s: String = name.chars().take(max).collect();
    while s.chars().count() < max {
        s.push(' ');
    }
    s
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

pub fn render_stats(summary: &StatsSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "TOURNAMENT STATS");
    let _ = writeln!(out, "  Total games   {}", summary.total_games);
    let _ = writeln!(
        out,
        "  Upsets        {} ({:.1}%)",
        summary.upsets,
        summary.upset_probability * 100.0
    );

    out.push_str("\nREGION STRENGTH\n");
    if summary.region_strength.is_empty() {
        out.push_str("  (none)\n");
    }
    for region in &summary.region_strength {
        let _ = writeln!(out, "  {} {}", truncate_name(&region.name, 10), region.strength);
    }

    out.push_str("\nSEED ADVANCEMENT\n");
    if summary.seed_advancement.is_empty() {
        out.push_str("  (none)\n");
    }
    for entry in &summary.seed_advancement {
        let _ = writeln!(out, "  seed {:>2}  {:>3} wins", entry.seed, entry.count);
    }

    out.push_str("\nTOP WIN PROBABILITY\n");
    render_team_table(&mut out, &summary.top_by_win_probability(TOP_TEAMS), |t| {
        format!("{:.1}%", t.win_probability * 100.0)
    });

    out.push_str("\nTOP EFFECTIVE FG%\n");
    render_team_table(&mut out, &summary.top_by_effective_fg(TOP_TEAMS), |t| {
        format!("{:.3}", t.metrics.effective_fg_pct)
    });
    out
}

fn render_team_table(out: &mut String, teams: &[&TeamStats], value: impl Fn(&TeamStats) -> String) {
    if teams.is_empty() {
        out.push_str("  (no teams past the Sweet 16)\n");
        return;
    }
    for (i, team) in teams.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. ({:>2}) {} {} {}",
            i + 1,
            team.seed,
            truncate_name(&team.team_name, NAME_WIDTH),
            truncate_name(&team.region, 8),
            value(team)
        );
    }
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

pub fn render_logs(logs: &PredictionLogs) -> String {
    let mut out = String::from("PREDICTION LOG\n");
    let time = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    let _ = writeln!(out, "  Started   {}", time(logs.prediction_start_time));
    let _ = writeln!(out, "  Finished  {}", time(logs.prediction_end_time));
    let _ = writeln!(
        out,
        "  Model     LSTM lookback {}, mean-regression lookback {}",
        logs.model_parameters.lstm_lookback, logs.model_parameters.mean_regression_lookback
    );
    let _ = writeln!(
        out,
        "  Training  LSTM loss {}, regression MSE {}",
        logs.training_metrics.lstm_loss, logs.training_metrics.regression_mse
    );
    let summary = &logs.prediction_summary;
    let _ = writeln!(
        out,
        "  Summary   {} games, {} upsets, {} close games",
        summary.total_games, summary.upsets, summary.close_games
    );

    if !logs.execution_log.is_empty() {
        out.push_str("\nEXECUTION\n");
        for line in &logs.execution_log {
            let _ = writeln!(out, "  {line}");
        }
    }

    if !logs.team_performance.is_empty() {
        out.push_str("\nTEAM PERFORMANCE\n");
        for (name, perf) in &logs.team_performance {
            let _ = writeln!(
                out,
                "  {} eFG {:.2}  TO {:.2}  ORB {:.2}  DefEff {:.1}",
                truncate_name(name, NAME_WIDTH),
                perf.effective_fg_pct,
                perf.turnover_pct,
                perf.offensive_rebound_pct,
                perf.defensive_efficiency
            );
        }
    }

    let upsets = &logs.upset_analysis;
    out.push_str("\nUPSET ANALYSIS\n");
    let _ = writeln!(
        out,
        "  Biggest upset  {}",
        upsets.biggest_upset.as_deref().unwrap_or("none")
    );
    let _ = writeln!(out, "  Regions        {}", upsets.upset_regions.join(", "));
    let rounds: Vec<String> = upsets.upset_rounds.iter().map(u32::to_string).collect();
    let _ = writeln!(out, "  Rounds         {}", rounds.join(", "));
    out
}

// ---------------------------------------------------------------------------
// Matchup detail
// ---------------------------------------------------------------------------

/// Every game `team_id` played, with the scouting report behind each pick.
pub fn render_team_games(predictions: &Predictions, team_id: &str) -> String {
    let mut out = String::new();
    let mut played = false;

    for (kind, game) in predictions.games_for_team(team_id) {
        played = true;
        let _ = writeln!(out, "{}  {}", kind.label(), kind.dates());
        let _ = writeln!(out, "  {}", format_game_line(game));

        let Some(reasoning) = &game.reasoning else {
            out.push_str("  (no reasoning recorded)\n\n");
            continue;
        };
        let _ = writeln!(out, "  {}", reasoning.summary);
        for factor in &reasoning.key_factors {
            let _ = writeln!(out, "   - {factor}");
        }

        let comparison = &reasoning.team_comparison;
        let _ = writeln!(
            out,
            "  {:<22}{:>20}{:>20}",
            "",
            format_seed_team_profile(&comparison.team1.name, comparison.team1.seed),
            format_seed_team_profile(&comparison.team2.name, comparison.team2.seed)
        );
        for (label, a, b) in stat_rows(&comparison.team1.stats, &comparison.team2.stats) {
            let _ = writeln!(out, "  {label:<22}{a:>20}{b:>20}");
        }
        out.push('\n');
    }

    if !played {
        let _ = writeln!(out, "No games found for team {team_id}.");
    }
    out
}

fn format_seed_team_profile(name: &str, seed: u8) -> String {
    let name: String = name.chars().take(14).collect();
    format!("({seed}) {name}")
}

fn stat_rows(a: &ScoutingStats, b: &ScoutingStats) -> Vec<(&'static str, String, String)> {
    vec![
        ("Offensive efficiency", a.offensive_efficiency.to_string(), b.offensive_efficiency.to_string()),
        ("Defensive efficiency", a.defensive_efficiency.to_string(), b.defensive_efficiency.to_string()),
        ("Rebounding rate", format!("{}%", a.rebounding_rate), format!("{}%", b.rebounding_rate)),
        ("Turnover rate", format!("{}%", a.turnover_rate), format!("{}%", b.turnover_rate)),
        ("Three-point pct", format!("{}%", a.three_point_pct), format!("{}%", b.three_point_pct)),
        ("Strength of schedule", a.strength_of_schedule.to_string(), b.strength_of_schedule.to_string()),
        ("Recent form", format!("{:?}", a.recent_form), format!("{:?}", b.recent_form)),
        ("Key players", format!("{:?}", a.key_player_status), format!("{:?}", b.key_player_status)),
    ]
}

mod app;
mod draw;
mod state;

use crate::app::App;
use crate::draw::View;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{PredictionEvent, PredictionRequest};
use crate::state::worker::PredictionWorker;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{debug, warn};
use ncaa_bracket::validate::validate;
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};

#[derive(Debug, Parser)]
#[command(
    name = "mmpredict",
    version,
    about = "Mock NCAA March Madness predictions in your terminal",
    after_help = ENVIRONMENT_HELP
)]
struct Cli {
    /// Directory holding prediction_results.json and prediction_logs.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Seed the generator for a reproducible run
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a new prediction, store it and print the bracket and stats
    Run {
        #[arg(long)]
        json: bool,
    },
    /// Print the stored prediction
    Show {
        #[arg(long, value_enum, default_value_t = View::All)]
        view: View,
        /// Team id such as `west_1` for its matchup detail
        #[arg(long)]
        team: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Archive the stored prediction under a timestamped filename
    Save,
    /// Validate the stored prediction's bracket structure
    Check,
}

const ENVIRONMENT_HELP: &str = "Environment:
  MMPREDICT_DATA_DIR  Data directory (default: public)
  MMPREDICT_SEED      Generator seed (default: random)
  MMPREDICT_LOG       Log level: error, warn, info, debug, trace
  RUST_LOG            env_logger filter, used when MMPREDICT_LOG is unset";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    better_panic::install();

    let cli = Cli::parse();
    let settings = AppSettings::load().with_overrides(cli.data_dir.clone(), cli.seed, cli.verbose);
    init_logger(&settings);

    let request = match cli.command {
        Commands::Run { .. } => PredictionRequest::Run,
        Commands::Show { .. } | Commands::Check => PredictionRequest::Load,
        Commands::Save => PredictionRequest::Save,
    };

    let (request_tx, request_rx) = mpsc::channel::<PredictionRequest>(100);
    let (event_tx, mut event_rx) = broadcast::channel::<PredictionEvent>(64);

    // Prediction thread
    let worker = PredictionWorker::new(&settings, request_rx, event_tx.clone());
    let worker_task = tokio::spawn(worker.run());

    let mut app = App::new(settings);
    request_tx.send(request).await?;

    loop {
        match event_rx.recv().await {
            Ok(event) => {
                if app.handle_event(event) {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => warn!("skipped {skipped} prediction events"),
            Err(RecvError::Closed) => anyhow::bail!("prediction worker stopped before answering"),
        }
    }

    drop(request_tx);
    if let Err(e) = worker_task.await {
        debug!("prediction worker ended abnormally: {e}");
    }

    if let Some(message) = app.state.last_error.take() {
        anyhow::bail!(message);
    }

    match cli.command {
        Commands::Run { json } => {
            if json {
                println!("{}", draw::render_json(&app.state, View::All, None)?);
            } else {
                print!("{}", draw::render(&app.state, View::Bracket, None));
                println!();
                print!("{}", draw::render(&app.state, View::Stats, None));
            }
        }
        Commands::Show { view, team, json } => {
            if json {
                println!("{}", draw::render_json(&app.state, view, team.as_deref())?);
            } else {
                print!("{}", draw::render(&app.state, view, team.as_deref()));
            }
        }
        Commands::Save => {
            if let Some(filename) = &app.state.last_saved {
                println!("Saved {}", app.settings.data_dir.join(filename).display());
            }
        }
        Commands::Check => check(&app)?,
    }
    Ok(())
}

fn check(app: &App) -> anyhow::Result<()> {
    let Some(payload) = &app.state.payload else {
        anyhow::bail!("No prediction yet. Run `mmpredict run` first.");
    };
    let violations = validate(&payload.predictions);
    if violations.is_empty() {
        println!("OK: {} games, bracket is consistent", payload.predictions.game_count());
        return Ok(());
    }
    for violation in &violations {
        println!("{violation}");
    }
    anyhow::bail!("{} bracket violation(s) found", violations.len())
}

/// `-v` and `MMPREDICT_LOG` take precedence over `RUST_LOG`.
fn init_logger(settings: &AppSettings) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = settings.log_level {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).init();
}

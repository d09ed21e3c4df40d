//! Embodied Planner - Entry Point
//!
//! Reads one inbound message (a `{"trials": [...]}` batch or any other text),
//! runs it through the planner, and writes the resulting artifact to stdout.

use clap::Parser;
use embodied_planner::command::{ConsoleReporter, MessageHandler};
use embodied_planner::core::config::{ActionStyle, PlannerConfig};
use embodied_planner::core::error::Result;

use std::io::{self, Read};
use std::path::PathBuf;
use tokio::runtime::Runtime;

/// Plan embodied actions for a batch of trials
#[derive(Parser, Debug)]
#[command(name = "embodied-planner")]
#[command(about = "Plan household-agent actions with a two-stage LLM pipeline")]
struct Args {
    /// Message file to read (stdin when omitted)
    #[arg(long)]
    input: Option<PathBuf>,

    /// TOML config file; environment variables override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Safety rule JSON file
    #[arg(long)]
    safety_rules: Option<PathBuf>,

    /// Action vocabulary for the action prompt
    #[arg(long, value_enum)]
    style: Option<ActionStyle>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("embodied_planner=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    if !config.oracle.has_credential() {
        tracing::warn!("OPENROUTER_API_KEY not set - every trial will fall back to Done");
    }

    let message = read_message(args.input.as_deref())?;

    let rt = Runtime::new()?;
    let handler = MessageHandler::new(config);
    let mut reporter = ConsoleReporter::new(io::stdout());
    rt.block_on(handler.handle(&message, &mut reporter))
}

/// Defaults, then the TOML file, then environment, then CLI flags
///
/// Only an invalid config file is fatal; bad environment values are skipped
/// inside `apply_env` so a batch always gets an answer.
fn load_config(args: &Args) -> Result<PlannerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let config = PlannerConfig::load_from_toml(path)?;
            config.validate()?;
            config
        }
        None => PlannerConfig::new(),
    };
    config.apply_env(|key| std::env::var(key).ok());

    if let Some(path) = &args.safety_rules {
        config.safety_rules_path = path.clone();
    }
    if let Some(style) = args.style {
        config.action_style = style;
    }

    Ok(config)
}

fn read_message(path: Option<&std::path::Path>) -> Result<String> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

//! convwin - Entry Point
//!
//! Runs a JSONL scenario against the conversation-window engine and prints
//! the resulting window layout and tab strips.

use clap::Parser;
use convwin::engine::ConversationEngine;
use convwin::model::error::AppError;
use convwin::source::{InMemoryCore, MemoryPreferences};
use convwin::view::{ColorConfig, TabStyles, DEFAULT_STRIP_WIDTH};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Conversation-window engine driver: replays a scenario script and prints the layout
#[derive(Parser, Debug)]
#[command(name = "convwin")]
#[command(version)]
#[command(about = "Replay a conversation scenario and print the resulting windows and tabs")]
pub struct Args {
    /// Path to JSONL scenario script (reads from stdin if not provided)
    pub script: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Placement policy for new conversations
    #[arg(short, long, value_parser = ["last", "im_chat", "new", "group", "account", "number"])]
    pub placement: Option<String>,

    /// Destroy direct conversations on close instead of parking them
    #[arg(long)]
    pub close_immediately: bool,

    /// Width of printed tab strips, in cells
    #[arg(short, long, default_value_t = DEFAULT_STRIP_WIDTH, value_parser = clap::value_parser!(u16).range(4..))]
    pub width: u16,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Set NO_COLOR env var if --no-color flag is passed
    if args.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = convwin::config::load_config_with_precedence(args.config.clone())?;
        let merged = convwin::config::merge_config(config_file);
        let with_env = convwin::config::apply_env_overrides(merged);
        let close_override = if args.close_immediately {
            Some(true)
        } else {
            None
        };
        convwin::config::apply_cli_overrides(with_env, args.placement.clone(), close_override)
    };

    convwin::logging::init(&config.log_file_path)?;

    info!(
        config = ?config,
        "Configuration loaded and resolved"
    );

    let mut input_source = convwin::source::detect_input_source(args.script.clone())?;
    let script = convwin::source::parse_script(&input_source.read_script()?);

    let mut engine = ConversationEngine::new(
        config.engine_config(),
        InMemoryCore::new(),
        MemoryPreferences::new(),
    );
    let report = convwin::integration::run_script(&mut engine, &script);
    info!(
        applied = report.applied,
        refused = report.errors.len(),
        malformed = script.errors.len(),
        "Scenario finished"
    );

    let mut stderr = std::io::stderr();
    for err in script.errors.iter().chain(&report.errors) {
        writeln!(stderr, "warning: {err}").map_err(AppError::Output)?;
    }

    let styles = TabStyles::with_color_config(ColorConfig::from_env_and_args(args.no_color));
    let output = convwin::view::render_report(&engine, &styles, args.width);
    std::io::stdout()
        .write_all(output.as_bytes())
        .map_err(AppError::Output)?;

    let notices = engine.shutdown();
    info!(notices = notices.len(), "Engine shut down");
    Ok(())
}

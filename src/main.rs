//! tokflow - replay a text file as a paced token stream

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokflow::model::AppError;
use tokflow::source::{ReplayConfig, ReplaySource};
use tracing::info;

/// Replay a text file as a simulated LLM token stream in the terminal
#[derive(Parser, Debug)]
#[command(name = "tokflow")]
#[command(version)]
#[command(about = "Replay text as a frame-paced token stream into a virtualized transcript")]
pub struct Args {
    /// Text file to replay; paragraphs become messages (reads stdin if not provided)
    pub file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum milliseconds between two reveal publishes
    #[arg(long, value_name = "MS")]
    pub min_delay: Option<u64>,

    /// Items kept materialized on each side of the viewport
    #[arg(long)]
    pub buffer: Option<usize>,

    /// Smallest replay chunk, in chars (raised to 1 if zero)
    #[arg(long, default_value_t = tokflow::source::replay::DEFAULT_CHUNK_MIN)]
    pub chunk_min: usize,

    /// Largest replay chunk, in chars
    #[arg(long, default_value_t = tokflow::source::replay::DEFAULT_CHUNK_MAX)]
    pub chunk_max: usize,

    /// Milliseconds between replay chunks
    #[arg(long, value_name = "MS", default_value_t = 30)]
    pub chunk_interval: u64,
}

impl Args {
    fn replay_config(&self) -> ReplayConfig {
        ReplayConfig::new(
            self.chunk_min,
            self.chunk_max,
            Duration::from_millis(self.chunk_interval),
        )
    }
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = tokflow::config::load_config_with_precedence(args.config.clone())?;
        let merged = tokflow::config::merge_config(config_file);
        let with_env = tokflow::config::apply_env_overrides(merged);
        tokflow::config::apply_cli_overrides(with_env, args.min_delay, args.buffer)
    };
    config.validate()?;

    // Flushes buffered log lines on drop
    let _log_guard = tokflow::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let input = tokflow::source::detect_input_source(args.file.clone())?;
    let text = input.read_to_string()?;
    let messages = tokflow::source::split_messages(&text);
    info!(source = ?input, messages = messages.len(), "Input loaded");

    let source = ReplaySource::new(messages, args.replay_config());
    tokflow::view::run_with_source(source, &config)?;

    Ok(())
}

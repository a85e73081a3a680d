use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use snake_coach::coach::TrainerConfig;
use snake_coach::game::GameConfig;
use snake_coach::modes::{PlayConfig, PlayMode, TrainConfig, TrainMode};
use snake_coach::session::SessionPaths;

#[derive(Parser)]
#[command(name = "snake_coach")]
#[command(version, about = "Snake with an AI coach that learns from your games")]
struct Cli {
    #[arg(long, value_enum, default_value = "play")]
    mode: Mode,

    /// Directory holding the dataset, the model, and the log file
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Milliseconds per game tick
    #[arg(long, default_value = "200")]
    tick_ms: u64,

    /// Ticks the coach looks ahead
    #[arg(long, default_value = "5")]
    lookahead: u32,

    /// Training epochs (default from the trainer config)
    #[arg(long)]
    epochs: Option<usize>,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Play with the AI coach; retrains on exit
    Play,
    /// Retrain the coach from the saved dataset only
    Train,
}

/// Log to a file so output never lands on the TUI
fn init_tracing(data_dir: &Path) -> Result<()> {
    let log_path = data_dir.join("snake_coach.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    fs::create_dir_all(&cli.data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", cli.data_dir))?;
    init_tracing(&cli.data_dir)?;

    let mut trainer = TrainerConfig::default();
    if let Some(epochs) = cli.epochs {
        trainer.epochs = epochs;
    }
    trainer.validate()?;

    let paths = SessionPaths::in_dir(&cli.data_dir);

    match cli.mode {
        Mode::Play => {
            let game = GameConfig {
                tick_millis: cli.tick_ms,
                ..GameConfig::default()
            };
            let mut play_mode = PlayMode::new(PlayConfig {
                game,
                paths,
                lookahead: cli.lookahead,
                trainer,
            });
            play_mode.run().await?;
        }
        Mode::Train => {
            let config = TrainConfig {
                dataset_path: paths.dataset,
                model_path: paths.model,
                trainer,
            };
            TrainMode::new(config).run()?;
        }
    }

    Ok(())
}

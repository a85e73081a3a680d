//! A play session: live entities, the feature log, the coach, and shutdown

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::coach::{Advisor, CoachWarning, Dataset, FeatureLog, Trainer, TrainerConfig, TrainingOutcome};
use crate::error::CoachError;
use crate::game::{Action, Direction, GameConfig, GameEngine, GameState, SnakeColor, StepResult};

/// Where the dataset and model live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPaths {
    pub dataset: PathBuf,
    /// Model base path; weights go to `.mpk`, metadata to `.meta.json`
    pub model: PathBuf,
}

impl SessionPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            dataset: dir.join("game_data.csv"),
            model: dir.join("collision_model"),
        }
    }
}

/// Outcome of [`GameSession::shutdown`]
#[derive(Debug)]
pub struct ShutdownReport {
    /// Rows appended to the dataset, or why that failed
    pub flush: Result<usize, CoachError>,
    /// `None` when the session had already been shut down
    pub training: Option<Result<TrainingOutcome, CoachError>>,
}

impl ShutdownReport {
    /// Human-readable lines for the terminal once the TUI is gone
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match &self.flush {
            Ok(rows) => lines.push(format!("Saved {rows} new rows to the dataset")),
            Err(err) => lines.push(format!("Could not save game data: {err}")),
        }
        match &self.training {
            Some(Ok(outcome)) => {
                lines.push("AI coach retrained".to_string());
                lines.push(outcome.stats.format_summary());
            }
            Some(Err(CoachError::EmptyDataset { .. })) => {
                lines.push("AI coach not retrained: no game data yet".to_string());
            }
            Some(Err(err)) => lines.push(format!("AI coach retraining failed: {err}")),
            None => {}
        }
        lines
    }
}

/// Owns everything that lives for one run of the game.
///
/// The feature log spans restarts after game over; it is written to the
/// dataset once, by [`GameSession::shutdown`].
pub struct GameSession {
    engine: GameEngine,
    state: GameState,
    color: SnakeColor,
    log: FeatureLog,
    advisor: Option<Advisor>,
    warning: Option<CoachWarning>,
    pending_direction: Option<Direction>,
    dataset: Dataset,
    model_path: PathBuf,
    trainer: Trainer,
    shut_down: bool,
}

impl GameSession {
    pub fn new(
        mut engine: GameEngine,
        color: SnakeColor,
        paths: SessionPaths,
        advisor: Option<Advisor>,
        trainer: Trainer,
    ) -> Self {
        let state = engine.reset(color);
        let mut session = Self {
            engine,
            state,
            color,
            log: FeatureLog::new(),
            advisor,
            warning: None,
            pending_direction: None,
            dataset: Dataset::new(paths.dataset),
            model_path: paths.model,
            trainer,
            shut_down: false,
        };
        session.refresh_warning();
        session
    }

    /// Build a session, loading the coach model if one has been trained.
    ///
    /// A missing or unreadable model only disables the coach.
    pub fn open(
        config: GameConfig,
        color: SnakeColor,
        paths: SessionPaths,
        lookahead: u32,
        trainer_config: TrainerConfig,
    ) -> Self {
        let advisor = match Advisor::from_model_file(&paths.model, lookahead, &config) {
            Ok(advisor) => Some(advisor),
            Err(err) => {
                warn!(%err, "AI coach unavailable");
                None
            }
        };
        Self::new(
            GameEngine::new(config),
            color,
            paths,
            advisor,
            Trainer::new(trainer_config),
        )
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        self.engine.config()
    }

    pub fn log(&self) -> &FeatureLog {
        &self.log
    }

    pub fn warning(&self) -> Option<CoachWarning> {
        self.warning
    }

    pub fn coach_available(&self) -> bool {
        self.advisor.is_some()
    }

    /// Remember a turn to apply on the next tick
    pub fn queue_direction(&mut self, direction: Direction) {
        self.pending_direction = Some(direction);
    }

    /// Advance one tick, logging its feature record
    pub fn tick(&mut self) -> StepResult {
        let action = Action::from(self.pending_direction.take());
        let result = self.engine.step(&mut self.state, action);

        if let Some(record) = result.record {
            self.log.push(record);
        }
        if result.info.collected_power_up {
            info!(score = self.state.score(), "power-up collected");
        }
        self.refresh_warning();

        result
    }

    /// Start a new game with the same color, keeping the feature log
    pub fn restart(&mut self) {
        self.state = self.engine.reset(self.color);
        self.pending_direction = None;
        self.refresh_warning();
    }

    /// Start a new game with a different snake color
    pub fn restart_with(&mut self, color: SnakeColor) {
        self.color = color;
        self.restart();
    }

    pub fn color(&self) -> SnakeColor {
        self.color
    }

    fn refresh_warning(&mut self) {
        self.warning = match &self.advisor {
            Some(advisor) if self.state.is_alive => advisor.assess(&self.state),
            _ => None,
        };
    }

    /// Flush the feature log to the dataset, then retrain the model.
    ///
    /// Call on every exit path. Records are written once; a second call
    /// writes nothing and does not retrain.
    pub fn shutdown(&mut self) -> ShutdownReport {
        if self.shut_down {
            return ShutdownReport {
                flush: Ok(0),
                training: None,
            };
        }
        self.shut_down = true;

        let flush = self.log.flush_to(&self.dataset);
        match &flush {
            Ok(rows) => info!(rows, dataset = ?self.dataset.path(), "game data saved"),
            Err(err) => error!(%err, "failed to save game data"),
        }

        let training = self.trainer.train(&self.dataset, &self.model_path);
        match &training {
            Ok(_) => info!(model = ?self.model_path, "model retrained"),
            Err(err) => warn!(%err, "model not retrained"),
        }

        ShutdownReport {
            flush,
            training: Some(training),
        }
    }
}

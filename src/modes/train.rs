//! Offline retraining of the collision model
//!
//! Refits the model on the whole dataset without starting a game. This is
//! the same training a play session runs at shutdown.
//!
//! # Example
//!
//! ```rust,ignore
//! use snake_coach::modes::{TrainConfig, TrainMode};
//! use std::path::PathBuf;
//!
//! let config = TrainConfig::new(
//!     PathBuf::from("data/game_data.csv"),
//!     PathBuf::from("data/collision_model"),
//! );
//! TrainMode::new(config).run()?;
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::coach::{Dataset, Trainer, TrainerConfig, TrainingOutcome};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// CSV dataset of feature records
    pub dataset_path: PathBuf,

    /// Model base path; weights and metadata are written next to it
    pub model_path: PathBuf,

    pub trainer: TrainerConfig,
}

impl TrainConfig {
    pub fn new(dataset_path: PathBuf, model_path: PathBuf) -> Self {
        Self {
            dataset_path,
            model_path,
            trainer: TrainerConfig::default(),
        }
    }
}

pub struct TrainMode {
    config: TrainConfig,
}

impl TrainMode {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Train once and print a summary
    pub fn run(&self) -> Result<TrainingOutcome> {
        self.print_header();

        let dataset = Dataset::new(&self.config.dataset_path);
        let outcome = Trainer::new(self.config.trainer.clone())
            .train(&dataset, &self.config.model_path)
            .with_context(|| format!("Failed to train on {:?}", self.config.dataset_path))?;

        println!("\nTraining complete!");
        println!("Model saved to: {:?}", self.config.model_path);
        self.print_results(&outcome);

        Ok(outcome)
    }

    fn print_results(&self, outcome: &TrainingOutcome) {
        let stats = &outcome.stats;
        println!(
            "Rows: {} training, {} validation, {} skipped as malformed",
            stats.training_rows(),
            stats.validation_rows(),
            stats.skipped_rows()
        );
        match (stats.validation_accuracy(), stats.validation_log_loss()) {
            (Some(accuracy), Some(log_loss)) => println!(
                "Validation: accuracy {:.1}%, log loss {:.4}",
                accuracy * 100.0,
                log_loss
            ),
            _ => println!("Validation: n/a (too few rows)"),
        }
        println!("{}", stats.format_summary());
    }

    fn print_header(&self) {
        let trainer = &self.config.trainer;
        println!("{}", "=".repeat(70));
        println!("Collision Model Training - Snake Coach");
        println!("{}", "=".repeat(70));
        println!("Dataset: {:?}", self.config.dataset_path);
        println!("Epochs: {}", trainer.epochs);
        println!("  Batch size: {}", trainer.batch_size);
        println!("  Learning rate: {}", trainer.learning_rate);
        println!("  Hidden layers: {:?}", trainer.hidden_dims);
        println!("  Validation split: {} (seed {})", trainer.validation_fraction, trainer.seed);
        println!("{}", "=".repeat(70));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::FeatureRecord;
    use crate::game::{Direction, Position};
    use tempfile::TempDir;

    #[test]
    fn test_train_config_creation() {
        let config = TrainConfig::new(PathBuf::from("d.csv"), PathBuf::from("m"));
        assert_eq!(config.dataset_path, PathBuf::from("d.csv"));
        assert_eq!(config.trainer.seed, 99);
    }

    #[test]
    fn test_run_writes_model() {
        let temp_dir = TempDir::new().unwrap();
        let dataset_path = temp_dir.path().join("game_data.csv");
        let records: Vec<FeatureRecord> = (0..15)
            .map(|i| {
                FeatureRecord::new(
                    Position::new(i * 50, 100),
                    Direction::Right,
                    Position::new(400, 400),
                    i == 14,
                )
            })
            .collect();
        Dataset::new(&dataset_path).append(&records).unwrap();

        let mut config = TrainConfig::new(dataset_path, temp_dir.path().join("model"));
        config.trainer.epochs = 3;

        let outcome = TrainMode::new(config).run().unwrap();
        assert_eq!(outcome.metadata.training_rows + outcome.metadata.validation_rows, 15);
        assert_eq!(outcome.stats.training_rows(), outcome.metadata.training_rows);
        assert_eq!(outcome.stats.validation_rows(), outcome.metadata.validation_rows);
        assert_eq!(outcome.stats.skipped_rows(), 0);
        assert!(outcome.stats.validation_log_loss().is_some());
        assert!(temp_dir.path().join("model.meta.json").exists());
    }

    #[test]
    fn test_run_without_dataset_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = TrainConfig::new(temp_dir.path().join("none.csv"), temp_dir.path().join("model"));
        assert!(TrainMode::new(config).run().is_err());
    }
}

//! Training statistics for the collision classifier
//!
//! Tracks per-epoch training loss with a rolling window for smoothing, plus
//! the dataset composition and validation results of one training run.

use std::collections::VecDeque;

/// Training statistics tracker with a rolling loss average
///
/// # Example
///
/// ```rust
/// use snake_coach::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(10);
/// stats.record_dataset(800, 200, 40, 3);
/// stats.record_epoch(0.42);
/// stats.record_validation(0.95, 0.12);
///
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Epoch losses (rolling window)
    epoch_losses: VecDeque<f32>,

    /// Loss of the first recorded epoch
    first_loss: Option<f32>,

    /// Total epochs completed
    total_epochs: usize,

    training_rows: usize,
    validation_rows: usize,
    positive_rows: usize,
    skipped_rows: usize,

    validation_accuracy: Option<f32>,
    validation_log_loss: Option<f32>,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a new tracker keeping the last `window_size` epoch losses
    pub fn new(window_size: usize) -> Self {
        Self {
            epoch_losses: VecDeque::with_capacity(window_size),
            first_loss: None,
            total_epochs: 0,
            training_rows: 0,
            validation_rows: 0,
            positive_rows: 0,
            skipped_rows: 0,
            validation_accuracy: None,
            validation_log_loss: None,
            window_size,
        }
    }

    /// Record the split sizes, collision rows, and malformed rows skipped on load
    pub fn record_dataset(
        &mut self,
        training_rows: usize,
        validation_rows: usize,
        positive_rows: usize,
        skipped_rows: usize,
    ) {
        self.training_rows = training_rows;
        self.validation_rows = validation_rows;
        self.positive_rows = positive_rows;
        self.skipped_rows = skipped_rows;
    }

    /// Record the mean loss of one epoch
    pub fn record_epoch(&mut self, loss: f32) {
        if self.first_loss.is_none() {
            self.first_loss = Some(loss);
        }
        if self.epoch_losses.len() >= self.window_size {
            self.epoch_losses.pop_front();
        }
        self.epoch_losses.push_back(loss);
        self.total_epochs += 1;
    }

    pub fn record_validation(&mut self, accuracy: f32, log_loss: f32) {
        self.validation_accuracy = Some(accuracy);
        self.validation_log_loss = Some(log_loss);
    }

    /// Mean loss over the rolling window, 0.0 before any epoch
    pub fn mean_loss(&self) -> f32 {
        if self.epoch_losses.is_empty() {
            0.0
        } else {
            self.epoch_losses.iter().sum::<f32>() / self.epoch_losses.len() as f32
        }
    }

    pub fn first_loss(&self) -> Option<f32> {
        self.first_loss
    }

    pub fn last_loss(&self) -> Option<f32> {
        self.epoch_losses.back().copied()
    }

    pub fn total_epochs(&self) -> usize {
        self.total_epochs
    }

    pub fn training_rows(&self) -> usize {
        self.training_rows
    }

    pub fn validation_rows(&self) -> usize {
        self.validation_rows
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn validation_accuracy(&self) -> Option<f32> {
        self.validation_accuracy
    }

    pub fn validation_log_loss(&self) -> Option<f32> {
        self.validation_log_loss
    }

    /// One-line summary of the run
    pub fn format_summary(&self) -> String {
        let validation = match (self.validation_accuracy, self.validation_log_loss) {
            (Some(acc), Some(loss)) => format!("Val acc: {:.1}% | Val loss: {:.4}", acc * 100.0, loss),
            _ => "Val: n/a".to_string(),
        };
        format!(
            "Rows: {} train / {} val | Collisions: {} | Skipped: {} | Epochs: {} | Loss: {:.4} | {}",
            self.training_rows,
            self.validation_rows,
            self.positive_rows,
            self.skipped_rows,
            self.total_epochs,
            self.mean_loss(),
            validation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let stats = TrainingStats::new(100);
        assert_eq!(stats.total_epochs(), 0);
        assert_eq!(stats.mean_loss(), 0.0);
        assert_eq!(stats.last_loss(), None);
        assert_eq!(stats.validation_accuracy(), None);
    }

    #[test]
    fn test_rolling_average() {
        let mut stats = TrainingStats::new(3);
        stats.record_epoch(1.0);
        stats.record_epoch(2.0);
        stats.record_epoch(3.0);
        assert!((stats.mean_loss() - 2.0).abs() < 1e-5);

        // a 4th epoch evicts the first
        stats.record_epoch(4.0);
        assert_eq!(stats.total_epochs(), 4);
        assert!((stats.mean_loss() - 3.0).abs() < 1e-5);
        assert_eq!(stats.first_loss(), Some(1.0));
        assert_eq!(stats.last_loss(), Some(4.0));
    }

    #[test]
    fn test_format_summary() {
        let mut stats = TrainingStats::new(10);
        stats.record_dataset(80, 20, 5, 2);
        stats.record_epoch(0.25);
        stats.record_validation(0.9, 0.3);

        let summary = stats.format_summary();
        assert!(summary.contains("Rows: 80 train / 20 val"));
        assert!(summary.contains("Collisions: 5"));
        assert!(summary.contains("Skipped: 2"));
        assert!(summary.contains("Loss: 0.2500"));
        assert!(summary.contains("Val acc: 90.0%"));
    }

    #[test]
    fn test_summary_without_validation() {
        let stats = TrainingStats::new(10);
        assert!(stats.format_summary().contains("Val: n/a"));
    }
}

//! Offline trainer for the collision classifier
//!
//! Fits [`CollisionNet`] on the whole dataset (every session ever played) and
//! overwrites the persisted model. Runs synchronously at shutdown or from the
//! `train` mode.

use std::path::Path;

use burn::{
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::{
        ElementConversion, Tensor, TensorData,
        activation::relu,
        backend::Backend,
    },
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::CoachError;
use crate::metrics::TrainingStats;

use super::backend::{InferenceBackend, TrainingBackend, default_device};
use super::dataset::Dataset;
use super::features::{FeatureRecord, FeatureScaler, FeatureVector, NUM_FEATURES};
use super::network::{CollisionNet, CollisionNetConfig};
use super::persistence::{ModelMetadata, save_model};

/// Hyperparameters for a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Seed for the split, batch order, and weight init
    pub seed: u64,

    /// Share of rows held out for validation
    pub validation_fraction: f32,

    /// Passes over the training split
    pub epochs: usize,

    /// Rows per optimizer step
    pub batch_size: usize,

    /// Adam learning rate
    pub learning_rate: f64,

    /// Hidden layer sizes
    pub hidden_dims: [usize; 2],

    /// Upper bound on the weight given to collision rows.
    ///
    /// Collisions are roughly one row per game, so they are up-weighted by the
    /// negative/positive ratio, clamped to `[1, max_positive_weight]`.
    pub max_positive_weight: f32,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            seed: 99,
            validation_fraction: 0.2,
            epochs: 60,
            batch_size: 128,
            learning_rate: 5e-3,
            hidden_dims: [32, 16],
            max_positive_weight: 50.0,
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<(), CoachError> {
        if !(0.0..1.0).contains(&self.validation_fraction) {
            return Err(CoachError::Training(format!(
                "validation_fraction must be in [0, 1), got {}",
                self.validation_fraction
            )));
        }
        if self.epochs == 0 || self.batch_size == 0 {
            return Err(CoachError::Training(
                "epochs and batch_size must be positive".to_string(),
            ));
        }
        if self.max_positive_weight < 1.0 {
            return Err(CoachError::Training(
                "max_positive_weight must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub metadata: ModelMetadata,
    pub stats: TrainingStats,
}

pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Fit on every usable row of `dataset` and persist the model to `model_path`.
    ///
    /// Malformed rows are skipped. A dataset with no usable rows (missing,
    /// header only, or all malformed) is reported as [`CoachError::EmptyDataset`].
    pub fn train(&self, dataset: &Dataset, model_path: &Path) -> Result<TrainingOutcome, CoachError> {
        self.config.validate()?;

        let loaded = dataset.load()?;
        if loaded.skipped > 0 {
            warn!(skipped = loaded.skipped, "malformed dataset rows ignored");
        }
        if loaded.records.is_empty() {
            return Err(CoachError::EmptyDataset {
                path: dataset.path().to_path_buf(),
                skipped: loaded.skipped,
            });
        }

        let (train_idx, val_idx) = split_indices(
            loaded.records.len(),
            self.config.validation_fraction,
            self.config.seed,
        );
        let train: Vec<FeatureRecord> = train_idx.iter().map(|&i| loaded.records[i]).collect();
        let val: Vec<FeatureRecord> = val_idx.iter().map(|&i| loaded.records[i]).collect();

        let mut stats = TrainingStats::new(10);
        stats.record_dataset(train.len(), val.len(), loaded.positives(), loaded.skipped);
        info!(
            train = train.len(),
            validation = val.len(),
            collisions = loaded.positives(),
            "training collision classifier"
        );

        let train_features: Vec<FeatureVector> = train.iter().map(FeatureRecord::features).collect();
        let scaler = FeatureScaler::fit(&train_features);
        let network_config = CollisionNetConfig::new(self.config.hidden_dims);

        let network = self.fit(&train, &scaler, &network_config, &mut stats)?;
        let network = network.valid();

        let mut metadata = ModelMetadata::new(network_config, scaler);
        metadata.training_rows = train.len();
        metadata.validation_rows = val.len();

        if !val.is_empty() {
            let (accuracy, log_loss) = evaluate(&network, &metadata.scaler, &val)?;
            stats.record_validation(accuracy, log_loss);
            metadata.validation_accuracy = Some(accuracy);
            metadata.validation_log_loss = Some(log_loss);
        }

        save_model(&network, &metadata, model_path)?;
        info!(model = ?model_path, "{}", stats.format_summary());

        Ok(TrainingOutcome { metadata, stats })
    }

    fn fit(
        &self,
        train: &[FeatureRecord],
        scaler: &FeatureScaler,
        network_config: &CollisionNetConfig,
        stats: &mut TrainingStats,
    ) -> Result<CollisionNet<TrainingBackend>, CoachError> {
        let device = default_device();
        TrainingBackend::seed(self.config.seed);

        let mut network = network_config.init::<TrainingBackend>(&device);
        let mut optim = AdamConfig::new().init::<TrainingBackend, CollisionNet<TrainingBackend>>();

        let positives = train.iter().filter(|r| r.is_collision()).count();
        let negatives = train.len() - positives;
        let positive_weight = if positives == 0 {
            1.0
        } else {
            (negatives as f32 / positives as f32).clamp(1.0, self.config.max_positive_weight)
        };
        debug!(positive_weight, "class weighting");

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut order: Vec<usize> = (0..train.len()).collect();

        for epoch in 0..self.config.epochs {
            order.shuffle(&mut rng);
            let mut epoch_loss = 0.0;
            let mut batches = 0;

            for chunk in order.chunks(self.config.batch_size) {
                let batch: Vec<FeatureRecord> = chunk.iter().map(|&i| train[i]).collect();
                let (inputs, targets, weights) =
                    batch_tensors::<TrainingBackend>(&batch, scaler, positive_weight, &device);

                let logits = network.forward(inputs);
                let loss = weighted_bce_with_logits(logits, targets, weights);

                let grads = loss.backward();
                let grads = GradientsParams::from_grads(grads, &network);
                network = optim.step(self.config.learning_rate, network, grads);

                let value = loss.into_scalar().elem::<f32>();
                if !value.is_finite() {
                    return Err(CoachError::Training(format!(
                        "loss diverged at epoch {epoch}"
                    )));
                }
                epoch_loss += value;
                batches += 1;
            }

            stats.record_epoch(epoch_loss / batches.max(1) as f32);
        }

        Ok(network)
    }
}

/// Deterministic shuffled split into (train, validation) index sets.
///
/// The validation share is rounded up, but at least one row always stays in
/// the training split.
pub fn split_indices(n: usize, validation_fraction: f32, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let n_val = ((n as f32 * validation_fraction).ceil() as usize).min(n.saturating_sub(1));
    let train = indices.split_off(n_val);
    (train, indices)
}

fn batch_tensors<B: Backend>(
    batch: &[FeatureRecord],
    scaler: &FeatureScaler,
    positive_weight: f32,
    device: &B::Device,
) -> (Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>) {
    let n = batch.len();
    let mut inputs = Vec::with_capacity(n * NUM_FEATURES);
    let mut targets = Vec::with_capacity(n);
    let mut weights = Vec::with_capacity(n);

    for record in batch {
        inputs.extend_from_slice(&scaler.transform(&record.features()));
        targets.push(record.collision as f32);
        weights.push(if record.is_collision() { positive_weight } else { 1.0 });
    }

    (
        Tensor::from_data(TensorData::new(inputs, [n, NUM_FEATURES]), device),
        Tensor::from_data(TensorData::new(targets, [n, 1]), device),
        Tensor::from_data(TensorData::new(weights, [n, 1]), device),
    )
}

/// Weighted binary cross-entropy on logits, computed in the stable form
/// `max(z, 0) - z * y + ln(1 + e^-|z|)`
fn weighted_bce_with_logits<B: Backend>(
    logits: Tensor<B, 2>,
    targets: Tensor<B, 2>,
    weights: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let softplus = logits.clone().abs().neg().exp().add_scalar(1.0).log();
    let per_row = relu(logits.clone()) - logits * targets + softplus;
    (per_row * weights.clone()).sum() / weights.sum()
}

/// Accuracy at 0.5 and mean log loss over `rows`
fn evaluate(
    network: &CollisionNet<InferenceBackend>,
    scaler: &FeatureScaler,
    rows: &[FeatureRecord],
) -> Result<(f32, f32), CoachError> {
    let device = default_device();
    let (inputs, _, _) = batch_tensors::<InferenceBackend>(rows, scaler, 1.0, &device);
    let probs: TensorData = network.probabilities(inputs).into_data();
    let probs = probs
        .as_slice::<f32>()
        .map_err(|e| CoachError::Training(format!("unreadable predictions: {e:?}")))?;

    let mut correct = 0usize;
    let mut log_loss = 0.0f32;
    for (p, record) in probs.iter().zip(rows) {
        let p = p.clamp(1e-7, 1.0 - 1e-7);
        let y = record.is_collision();
        if (p > 0.5) == y {
            correct += 1;
        }
        log_loss -= if y { p.ln() } else { (1.0 - p).ln() };
    }

    let n = rows.len() as f32;
    Ok((correct as f32 / n, log_loss / n))
}

//! In-game coach: short-horizon collision warnings

use std::path::Path;

use burn::tensor::{ElementConversion, Tensor, TensorData, backend::Backend};
use tracing::info;

use crate::error::CoachError;
use crate::game::{GameConfig, GameState};

use super::backend::{InferenceBackend, default_device};
use super::features::{FeatureScaler, FeatureVector, NUM_FEATURES, feature_vector};
use super::network::CollisionNet;
use super::persistence::{ModelMetadata, load_model};

/// Probability above which the coach speaks up
pub const WARNING_THRESHOLD: f32 = 0.5;

/// Anything that can score a feature vector with a collision probability
pub trait CollisionModel {
    /// Probability in `[0, 1]` that this tick ends the game
    fn collision_probability(&self, features: &FeatureVector) -> f32;
}

/// A persisted [`CollisionNet`] together with its input scaler
pub struct CollisionClassifier<B: Backend = InferenceBackend> {
    network: CollisionNet<B>,
    scaler: FeatureScaler,
    metadata: ModelMetadata,
    device: B::Device,
}

impl<B: Backend> CollisionClassifier<B> {
    pub fn load(path: &Path, device: B::Device) -> Result<Self, CoachError> {
        let (network, metadata) = load_model::<B>(path, &device)?;
        Ok(Self {
            network,
            scaler: metadata.scaler.clone(),
            metadata,
            device,
        })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

impl CollisionClassifier<InferenceBackend> {
    /// Load onto the default CPU device
    pub fn load_default(path: &Path) -> Result<Self, CoachError> {
        Self::load(path, default_device())
    }
}

impl<B: Backend> CollisionModel for CollisionClassifier<B> {
    fn collision_probability(&self, features: &FeatureVector) -> f32 {
        let scaled = self.scaler.transform(features);
        let input = Tensor::<B, 2>::from_data(
            TensorData::new(scaled.to_vec(), [1, NUM_FEATURES]),
            &self.device,
        );
        self.network
            .probabilities(input)
            .squeeze::<1>(1)
            .into_scalar()
            .elem::<f32>()
    }
}

/// A predicted collision along the current heading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoachWarning {
    /// Ticks ahead (1-based) at which the risk was found
    pub step: u32,
    pub probability: f32,
}

impl CoachWarning {
    pub const MESSAGE: &'static str = "High risk of collision! Change direction!";
}

/// Projects the snake forward and asks a model about each step.
///
/// Each projected step reuses the current direction and food position; turns
/// and food pickups within the horizon are not simulated.
pub struct Advisor {
    model: Box<dyn CollisionModel>,
    lookahead: u32,
    cell_size: i32,
}

impl Advisor {
    pub fn new(model: Box<dyn CollisionModel>, lookahead: u32, config: &GameConfig) -> Self {
        Self {
            model,
            lookahead,
            cell_size: config.cell_size,
        }
    }

    /// Load the persisted classifier; `ModelLoad` errors leave the game coach-less
    pub fn from_model_file(path: &Path, lookahead: u32, config: &GameConfig) -> Result<Self, CoachError> {
        let classifier = CollisionClassifier::load_default(path)?;
        info!(
            model = ?path,
            rows = classifier.metadata().training_rows,
            accuracy = ?classifier.metadata().validation_accuracy,
            "loaded collision model"
        );
        Ok(Self::new(Box::new(classifier), lookahead, config))
    }

    pub fn lookahead(&self) -> u32 {
        self.lookahead
    }

    /// First projected step whose collision probability exceeds the threshold
    pub fn assess(&self, state: &GameState) -> Option<CoachWarning> {
        let snake = &state.snake;
        (1..=self.lookahead).find_map(|step| {
            let head = snake
                .head
                .moved_in_direction(snake.direction, self.cell_size, step as i32);
            let features = feature_vector(head, snake.direction, state.food);
            let probability = self.model.collision_probability(&features);
            (probability > WARNING_THRESHOLD).then_some(CoachWarning { step, probability })
        })
    }
}

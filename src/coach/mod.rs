//! The AI coach: feature logging, offline training, and in-game advice
//!
//! Provides:
//! - Per-tick feature records and the append-only CSV dataset
//! - A small Burn MLP that predicts the chance a tick ends the game
//! - The offline trainer that refits it on the full dataset
//! - Model persistence (weights + JSON metadata)
//! - The advisor that projects the snake forward and warns the player

pub mod advisor;
pub mod backend;
pub mod dataset;
pub mod features;
pub mod network;
pub mod persistence;
pub mod trainer;

pub use advisor::{Advisor, CoachWarning, CollisionClassifier, CollisionModel};
pub use backend::{InferenceBackend, TrainingBackend, default_device};
pub use dataset::{Dataset, LoadedDataset};
pub use features::{FeatureLog, FeatureRecord, FeatureScaler, FeatureVector, feature_vector};
pub use network::{CollisionNet, CollisionNetConfig};
pub use persistence::{ModelMetadata, load_model, save_model};
pub use trainer::{Trainer, TrainerConfig, TrainingOutcome};

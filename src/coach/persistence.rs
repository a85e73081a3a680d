//! Model persistence for the collision classifier
//!
//! A model is stored as two files next to each other:
//! - `<path>.mpk` - network weights (Burn named MessagePack record)
//! - `<path>.meta.json` - layer sizes, feature scaler, and training summary
//!
//! Every retrain overwrites both; there is no versioning.

use std::path::{Path, PathBuf};

use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::Backend,
};
use serde::{Deserialize, Serialize};

use crate::error::CoachError;

use super::features::FeatureScaler;
use super::network::{CollisionNet, CollisionNetConfig};

/// Metadata saved with the model
///
/// Contains what is needed to rebuild the network and prepare its inputs,
/// plus a summary of the training run that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Layer sizes used to rebuild the network
    pub network: CollisionNetConfig,

    /// Standardization applied to raw features before the forward pass
    pub scaler: FeatureScaler,

    /// Rows in the training split
    pub training_rows: usize,

    /// Rows in the validation split
    pub validation_rows: usize,

    /// Accuracy on the validation split at threshold 0.5
    pub validation_accuracy: Option<f32>,

    /// Mean binary cross-entropy on the validation split
    pub validation_log_loss: Option<f32>,

    /// Crate version that wrote the model
    pub version: String,
}

impl ModelMetadata {
    pub fn new(network: CollisionNetConfig, scaler: FeatureScaler) -> Self {
        Self {
            network,
            scaler,
            training_rows: 0,
            validation_rows: 0,
            validation_accuracy: None,
            validation_log_loss: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Path of the metadata file that accompanies a model
pub fn metadata_path(path: &Path) -> PathBuf {
    path.with_extension("meta.json")
}

/// Save a network and its metadata, replacing any previous model at `path`
///
/// Creates parent directories if they don't exist.
pub fn save_model<B: Backend>(
    network: &CollisionNet<B>,
    metadata: &ModelMetadata,
    path: &Path,
) -> Result<(), CoachError> {
    let save_err = |reason: String| CoachError::ModelSave {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| save_err(format!("failed to create {parent:?}: {e}")))?;
        }
    }

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(network.clone().into_record(), path.to_path_buf())
        .map_err(|e| save_err(format!("failed to write weights: {e}")))?;

    let meta_json = serde_json::to_string_pretty(metadata)
        .map_err(|e| save_err(format!("failed to serialize metadata: {e}")))?;
    std::fs::write(metadata_path(path), meta_json)
        .map_err(|e| save_err(format!("failed to write metadata: {e}")))?;

    Ok(())
}

/// Load a network and its metadata onto `device`
pub fn load_model<B: Backend>(
    path: &Path,
    device: &B::Device,
) -> Result<(CollisionNet<B>, ModelMetadata), CoachError> {
    let load_err = |reason: String| CoachError::ModelLoad {
        path: path.to_path_buf(),
        reason,
    };

    let meta_path = metadata_path(path);
    let meta_json = std::fs::read_to_string(&meta_path)
        .map_err(|e| load_err(format!("failed to read {meta_path:?}: {e}")))?;
    let metadata: ModelMetadata = serde_json::from_str(&meta_json)
        .map_err(|e| load_err(format!("corrupt metadata: {e}")))?;

    let network = metadata.network.init::<B>(device);
    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(path.to_path_buf(), device)
        .map_err(|e| load_err(format!("failed to read weights: {e}")))?;

    Ok((network.load_record(record), metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::backend::{InferenceBackend, default_device};
    use tempfile::TempDir;

    #[test]
    fn test_metadata_serialization() {
        let mut metadata = ModelMetadata::new(CollisionNetConfig::default(), FeatureScaler::default());
        metadata.training_rows = 80;
        metadata.validation_accuracy = Some(0.9);

        let json = serde_json::to_string(&metadata).unwrap();
        let deserialized: ModelMetadata = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized, metadata);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("models").join("collision_model");
        let device = default_device();

        let network = CollisionNetConfig::default().init::<InferenceBackend>(&device);
        let metadata = ModelMetadata::new(CollisionNetConfig::default(), FeatureScaler::default());
        save_model(&network, &metadata, &path).unwrap();

        assert!(metadata_path(&path).exists());
        let (_loaded, loaded_meta) = load_model::<InferenceBackend>(&path, &device).unwrap();
        assert_eq!(loaded_meta, metadata);
    }

    #[test]
    fn test_missing_model_is_load_error() {
        let dir = TempDir::new().unwrap();
        let result = load_model::<InferenceBackend>(&dir.path().join("nothing"), &default_device());
        assert!(matches!(result, Err(CoachError::ModelLoad { .. })));
    }

    #[test]
    fn test_corrupt_metadata_is_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("collision_model");
        std::fs::write(metadata_path(&path), "{ not json").unwrap();

        let result = load_model::<InferenceBackend>(&path, &default_device());
        assert!(matches!(result, Err(CoachError::ModelLoad { .. })));
    }
}

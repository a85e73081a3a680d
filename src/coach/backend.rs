//! Backend type aliases and device management
//!
//! The collision classifier is tiny (six inputs, two hidden layers) so the CPU
//! NdArray backend covers both fitting and in-game inference.
//!
//! - **TrainingBackend**: autodiff-enabled NdArray, used by the offline trainer
//! - **InferenceBackend**: plain NdArray, used by the advisor during play

use burn::backend::{
    Autodiff,
    ndarray::{NdArray, NdArrayDevice},
};

/// Backend used to fit the classifier
pub type TrainingBackend = Autodiff<NdArray<f32>>;

/// Backend used to query a loaded classifier
pub type InferenceBackend = NdArray<f32>;

/// Get the default device for computation (CPU)
pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::default()
}

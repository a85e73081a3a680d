//! Collision classifier network
//!
//! A small multilayer perceptron that maps the six standardized features of a
//! (projected) tick to the logit of "this tick ends the game".
//!
//! ```text
//! Input: [batch, 6]
//!   ↓ Linear(6 → 32) + ReLU
//!   ↓ Linear(32 → 16) + ReLU
//!   ↓ Linear(16 → 1)  → collision logit
//! ```

use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{
        Tensor,
        activation::{relu, sigmoid},
        backend::Backend,
    },
};
use serde::{Deserialize, Serialize};

use super::features::NUM_FEATURES;

/// Layer sizes for [`CollisionNet`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionNetConfig {
    pub input_dim: usize,
    pub hidden_dims: [usize; 2],
}

impl CollisionNetConfig {
    pub fn new(hidden_dims: [usize; 2]) -> Self {
        Self {
            input_dim: NUM_FEATURES,
            hidden_dims,
        }
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> CollisionNet<B> {
        CollisionNet {
            input: LinearConfig::new(self.input_dim, self.hidden_dims[0]).init(device),
            hidden: LinearConfig::new(self.hidden_dims[0], self.hidden_dims[1]).init(device),
            output: LinearConfig::new(self.hidden_dims[1], 1).init(device),
        }
    }
}

impl Default for CollisionNetConfig {
    fn default() -> Self {
        Self::new([32, 16])
    }
}

/// Binary classifier over feature vectors
#[derive(Module, Debug)]
pub struct CollisionNet<B: Backend> {
    input: Linear<B>,
    hidden: Linear<B>,
    output: Linear<B>,
}

impl<B: Backend> CollisionNet<B> {
    /// Collision logits, shape `[batch, 1]`
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.input.forward(features));
        let x = relu(self.hidden.forward(x));
        self.output.forward(x)
    }

    /// Collision probabilities in `[0, 1]`, shape `[batch, 1]`
    pub fn probabilities(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        sigmoid(self.forward(features))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::backend::ndarray::NdArrayDevice;
    use burn::tensor::TensorData;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_output_shape() {
        let device = NdArrayDevice::default();
        let network = CollisionNetConfig::default().init::<TestBackend>(&device);

        let input = Tensor::<TestBackend, 2>::zeros([8, NUM_FEATURES], &device);
        let logits = network.forward(input);

        assert_eq!(logits.dims(), [8, 1]);
    }

    #[test]
    fn test_probabilities_in_unit_interval() {
        let device = NdArrayDevice::default();
        let network = CollisionNetConfig::default().init::<TestBackend>(&device);

        let values: Vec<f32> = (0..4 * NUM_FEATURES).map(|i| i as f32 * 3.0 - 20.0).collect();
        let input = Tensor::<TestBackend, 2>::from_data(
            TensorData::new(values, [4, NUM_FEATURES]),
            &device,
        );
        let probs: TensorData = network.probabilities(input).into_data();

        for p in probs.as_slice::<f32>().unwrap() {
            assert!((0.0..=1.0).contains(p));
        }
    }
}

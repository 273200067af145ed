//! Feed-forward network policies.
//!
//! A [`Brain`] maps the sensor readings to a steering output through a stack of
//! tanh layers. Building and evolving networks is the search's business; this
//! module only evaluates them.

use ndarray::Array1;
use ndarray_rand::rand::Rng;

use super::policy::Policy;

pub mod mlp;

pub use mlp::Mlp;

/// Multi-layer perceptron driving a car.
#[derive(Debug, Clone)]
pub struct Brain {
    /// Ordered layers from input to output.
    pub layers: Vec<Mlp>,
}

impl Brain {
    /// Creates a new brain with random weights.
    pub fn new(layer_sizes: &[usize], scale: f32) -> Self {
        let layers = layer_sizes
            .windows(2)
            .map(|pair| Mlp::new_random(pair[0], pair[1], scale))
            .collect();

        Self { layers }
    }

    /// Creates a new brain with weights drawn from `rng`.
    pub fn new_using<R: Rng + ?Sized>(layer_sizes: &[usize], scale: f32, rng: &mut R) -> Self {
        let layers = layer_sizes
            .windows(2)
            .map(|pair| Mlp::new_random_using(pair[0], pair[1], scale, rng))
            .collect();

        Self { layers }
    }

    /// Creates a brain from prepared layers.
    pub fn from_layers(layers: Vec<Mlp>) -> Self {
        Self { layers }
    }

    /// Runs a forward pass through the brain.
    #[inline]
    pub fn think(&self, inputs: &Array1<f32>) -> Array1<f32> {
        let mut output = inputs.clone();
        for layer in &self.layers {
            output = layer.forward(&output);
        }
        output
    }

    /// Number of inputs expected by the first layer.
    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, Mlp::input_size)
    }

    /// Number of outputs produced by the last layer.
    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, Mlp::output_size)
    }

    /// Total number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum()
    }
}

impl Policy for Brain {
    /// Steers with the first network output.
    fn activate(&mut self, readings: &Array1<f32>) -> f32 {
        self.think(readings).first().copied().unwrap_or(0.0)
    }
}

//! Multi-layer perceptron layer.

use ndarray::{Array1, Array2};
use ndarray_rand::RandomExt;
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::Uniform;

/// A single fully connected layer with tanh activation.
#[derive(Debug, Clone)]
pub struct Mlp {
    /// Weight matrix (`output_size` × `input_size`).
    pub weights: Array2<f32>,
    /// Bias vector (`output_size`).
    pub biases: Array1<f32>,
}

impl Mlp {
    /// Creates a new layer with weights and biases drawn from `[-scale, scale]`.
    pub fn new_random(input_size: usize, output_size: usize, scale: f32) -> Self {
        Self {
            weights: Array2::random((output_size, input_size), Uniform::new(-scale, scale)),
            biases: Array1::random(output_size, Uniform::new(-scale, scale)),
        }
    }

    /// Like [`Mlp::new_random`], drawing from the given generator.
    pub fn new_random_using<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        scale: f32,
        rng: &mut R,
    ) -> Self {
        Self {
            weights: Array2::random_using(
                (output_size, input_size),
                Uniform::new(-scale, scale),
                rng,
            ),
            biases: Array1::random_using(output_size, Uniform::new(-scale, scale), rng),
        }
    }

    /// Creates a layer from explicit weights and biases.
    pub fn from_parts(weights: Array2<f32>, biases: Array1<f32>) -> Self {
        assert_eq!(
            weights.nrows(),
            biases.len(),
            "one bias per output is required"
        );
        Self { weights, biases }
    }

    /// Number of inputs.
    pub fn input_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Number of outputs.
    pub fn output_size(&self) -> usize {
        self.weights.nrows()
    }

    /// Performs forward pass with tanh activation.
    #[inline]
    pub fn forward(&self, inputs: &Array1<f32>) -> Array1<f32> {
        let mut output = self.weights.dot(inputs);
        output += &self.biases;

        output.mapv_inplace(f32::tanh);
        output
    }
}

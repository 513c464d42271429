use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{AgentError, Result};
use crate::layers::{DenseLayer, LayerGradients, LayerTrace, WeightInit};

/// A feed-forward network made of dense layers.
///
/// The network is a pure function of its parameters: `forward_batch` takes
/// `&self` and never mutates anything. Training code asks for a traced
/// forward pass, computes a loss gradient on the output, and hands it back
/// to [`NeuralNetwork::backward`] to obtain per-layer gradients.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
}

/// Per-layer traces of one forward pass, in layer order.
#[derive(Clone, Debug)]
pub struct NetworkTrace {
    layers: Vec<LayerTrace>,
}

impl NeuralNetwork {
    /// Create a new network with the given layer sizes and activations.
    ///
    /// `layer_sizes` lists the input width followed by each layer's output
    /// width, so `activations` must have exactly one fewer entry.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        init: &WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(AgentError::invalid_parameter(
                "layer_sizes",
                "must have at least input and output sizes",
            ));
        }
        if activations.len() != layer_sizes.len() - 1 {
            return Err(AgentError::invalid_parameter(
                "activations",
                "number of activations must match number of layers",
            ));
        }
        if layer_sizes.iter().any(|&size| size == 0) {
            return Err(AgentError::invalid_parameter("layer_sizes", "sizes must be positive"));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| DenseLayer::new(window[0], window[1], activation, init, rng))
            .collect();

        Ok(NeuralNetwork { layers })
    }

    /// ReLU on every hidden layer, `output_activation` on the last one.
    pub fn mlp<R: Rng + ?Sized>(
        input_size: usize,
        hidden_sizes: &[usize],
        output_size: usize,
        output_activation: Activation,
        init: &WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        let mut layer_sizes = vec![input_size];
        layer_sizes.extend_from_slice(hidden_sizes);
        layer_sizes.push(output_size);

        let activations = vec![Activation::Relu; hidden_sizes.len()]
            .into_iter()
            .chain(std::iter::once(output_activation))
            .collect::<Vec<_>>();

        Self::new(&layer_sizes, &activations, init, rng)
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    /// Total number of trainable scalars.
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum()
    }

    /// Perform a forward pass for a single input vector.
    pub fn forward(&self, input: ArrayView1<f32>) -> Array1<f32> {
        let output = self.forward_batch(input.insert_axis(Axis(0)));
        output.row(0).to_owned()
    }

    /// Perform a forward pass for a batch of input vectors.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut current_output = inputs.to_owned();
        for layer in &self.layers {
            current_output = layer.forward_batch(current_output.view());
        }
        current_output
    }

    /// Forward pass that records every layer's trace for [`NeuralNetwork::backward`].
    pub fn forward_traced(&self, inputs: ArrayView2<f32>) -> (Array2<f32>, NetworkTrace) {
        let mut traces = Vec::with_capacity(self.layers.len());
        let mut current_output = inputs.to_owned();
        for layer in &self.layers {
            let (output, trace) = layer.forward_traced(current_output.view());
            traces.push(trace);
            current_output = output;
        }
        (current_output, NetworkTrace { layers: traces })
    }

    /// Backpropagate `output_errors` through the network.
    ///
    /// Returns the gradient with respect to the network input and the
    /// parameter gradients in layer order.
    pub fn backward(&self, trace: &NetworkTrace, output_errors: ArrayView2<f32>) -> (Array2<f32>, Vec<LayerGradients>) {
        let mut gradients = Vec::with_capacity(self.layers.len());
        let mut current_error = output_errors.to_owned();

        for (layer, layer_trace) in self.layers.iter().zip(trace.layers.iter()).rev() {
            let (input_error, layer_gradients) = layer.backward_batch(layer_trace, current_error.view());
            gradients.push(layer_gradients);
            current_error = input_error;
        }

        gradients.reverse();
        (current_error, gradients)
    }

    /// Zero gradients for every layer.
    pub fn zero_gradients(&self) -> Vec<LayerGradients> {
        self.layers.iter().map(LayerGradients::zeros_like).collect()
    }
}

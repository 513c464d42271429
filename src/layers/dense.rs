use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::error::{AgentError, Result};
use super::initialization::WeightInit;

/// A fully connected (dense) layer: `activation(inputs · weights + biases)`.
///
/// The layer owns its parameters and nothing else. Forward passes that need
/// to be differentiated later return a [`LayerTrace`] holding the values the
/// backward pass reads.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
}

/// Values recorded during a traced forward pass.
#[derive(Clone, Debug)]
pub struct LayerTrace {
    inputs: Array2<f32>,
    pre_activation: Array2<f32>,
}

/// Gradients of a scalar loss with respect to one layer's parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerGradients {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

impl LayerGradients {
    /// Zero gradients shaped like `layer`'s parameters.
    pub fn zeros_like(layer: &DenseLayer) -> Self {
        LayerGradients {
            weights: Array2::zeros(layer.weights.dim()),
            biases: Array1::zeros(layer.biases.dim()),
        }
    }
}

impl DenseLayer {
    /// Create a new dense layer with parameters drawn from `init`.
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        init: &WeightInit,
        rng: &mut R,
    ) -> Self {
        DenseLayer {
            weights: init.initialize_weights((input_size, output_size), rng),
            biases: init.initialize_biases(input_size, output_size, rng),
            activation,
        }
    }

    /// Build a layer from existing parameters.
    pub fn from_parameters(weights: Array2<f32>, biases: Array1<f32>, activation: Activation) -> Result<Self> {
        if weights.ncols() != biases.len() {
            return Err(AgentError::shape_mismatch(
                format!("{} biases", weights.ncols()),
                format!("{} biases", biases.len()),
            ));
        }
        Ok(DenseLayer { weights, biases, activation })
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Perform a forward pass for a batch of inputs.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = self.affine(inputs);
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Forward pass that also records what the backward pass needs.
    pub fn forward_traced(&self, inputs: ArrayView2<f32>) -> (Array2<f32>, LayerTrace) {
        let pre_activation = self.affine(inputs);
        let mut outputs = pre_activation.clone();
        self.activation.apply_batch(&mut outputs);
        let trace = LayerTrace {
            inputs: inputs.to_owned(),
            pre_activation,
        };
        (outputs, trace)
    }

    /// Backpropagate `output_errors` (dL/d output, `[batch, output_size]`).
    ///
    /// Returns the error with respect to the layer's inputs together with
    /// the parameter gradients. Gradients are summed over the batch; any
    /// averaging is the loss function's job.
    pub fn backward_batch(&self, trace: &LayerTrace, output_errors: ArrayView2<f32>) -> (Array2<f32>, LayerGradients) {
        let activation_deriv = self.activation.derivative_batch(trace.pre_activation.view());
        let adjusted_error = &output_errors * &activation_deriv;
        let weight_gradients = trace.inputs.t().dot(&adjusted_error);
        let bias_gradients = adjusted_error.sum_axis(Axis(0));
        let input_errors = adjusted_error.dot(&self.weights.t());

        (
            input_errors,
            LayerGradients {
                weights: weight_gradients,
                biases: bias_gradients,
            },
        )
    }

    fn affine(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0))
    }
}

use ndarray::{concatenate, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;

use crate::activations::Activation;
use crate::error::{AgentError, Result};
use crate::layers::{LayerGradients, WeightInit};
use crate::network::{NetworkTrace, NeuralNetwork};
use super::check_width;

/// The critic: maps a (state, one-hot action) pair to a scalar value.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueEstimator {
    network: NeuralNetwork,
    state_dim: usize,
}

impl ValueEstimator {
    pub fn new<R: Rng + ?Sized>(
        state_dim: usize,
        action_dim: usize,
        hidden_sizes: &[usize],
        init: &WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        let network = NeuralNetwork::mlp(state_dim + action_dim, hidden_sizes, 1, Activation::Linear, init, rng)?;
        Ok(ValueEstimator { network, state_dim })
    }

    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut NeuralNetwork {
        &mut self.network
    }

    pub fn state_dim(&self) -> usize {
        self.state_dim
    }

    pub fn action_dim(&self) -> usize {
        self.network.input_size() - self.state_dim
    }

    /// Value of one state paired with one encoded action.
    pub fn forward(&self, state: ArrayView1<f32>, action_onehot: ArrayView1<f32>) -> Result<f32> {
        let values = self.forward_batch(state.insert_axis(Axis(0)), action_onehot.insert_axis(Axis(0)))?;
        Ok(values[[0, 0]])
    }

    /// Values for a batch, returned as a `[batch, 1]` column.
    pub fn forward_batch(&self, states: ArrayView2<f32>, actions_onehot: ArrayView2<f32>) -> Result<Array2<f32>> {
        let inputs = self.concat_inputs(states, actions_onehot)?;
        Ok(self.network.forward_batch(inputs.view()))
    }

    /// Forward pass that can be differentiated with [`ValueEstimator::backward`].
    pub fn forward_traced(
        &self,
        states: ArrayView2<f32>,
        actions_onehot: ArrayView2<f32>,
    ) -> Result<(Array2<f32>, NetworkTrace)> {
        let inputs = self.concat_inputs(states, actions_onehot)?;
        Ok(self.network.forward_traced(inputs.view()))
    }

    /// Backpropagate dL/d(value).
    ///
    /// Returns the gradient with respect to the concatenated
    /// `[state | action]` input and the parameter gradients.
    pub fn backward(&self, trace: &NetworkTrace, value_errors: ArrayView2<f32>) -> (Array2<f32>, Vec<LayerGradients>) {
        self.network.backward(trace, value_errors)
    }

    fn concat_inputs(&self, states: ArrayView2<f32>, actions_onehot: ArrayView2<f32>) -> Result<Array2<f32>> {
        check_width("state", states.ncols(), self.state_dim)?;
        check_width("action encoding", actions_onehot.ncols(), self.action_dim())?;
        if states.nrows() != actions_onehot.nrows() {
            return Err(AgentError::shape_mismatch(
                format!("{} action rows", states.nrows()),
                format!("{} action rows", actions_onehot.nrows()),
            ));
        }
        concatenate(Axis(1), &[states.view(), actions_onehot.view()])
            .map_err(|e| AgentError::shape_mismatch("concatenable inputs".to_string(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn critic() -> ValueEstimator {
        let mut rng = StdRng::seed_from_u64(5);
        ValueEstimator::new(2, 4, &[16, 16], &WeightInit::default(), &mut rng).unwrap()
    }

    #[test]
    fn test_input_width_is_state_plus_action() {
        let critic = critic();
        assert_eq!(critic.network().input_size(), 6);
        assert_eq!(critic.action_dim(), 4);
    }

    #[test]
    fn test_batch_and_single_forward_agree() {
        let critic = critic();
        let states = array![[0.1, 0.2], [-0.3, 0.4]];
        let actions = array![[0.0, 1.0, 0.0, 0.0], [1.0, 0.0, 0.0, 0.0]];
        let values = critic.forward_batch(states.view(), actions.view()).unwrap();
        assert_eq!(values.dim(), (2, 1));
        let single = critic.forward(states.row(1), actions.row(1)).unwrap();
        assert!((single - values[[1, 0]]).abs() < 1e-6);
    }

    #[test]
    fn test_mismatched_rows_rejected() {
        let critic = critic();
        let states = array![[0.1, 0.2], [-0.3, 0.4]];
        let actions = array![[0.0, 1.0, 0.0, 0.0]];
        let result = critic.forward_batch(states.view(), actions.view());
        assert!(matches!(result, Err(AgentError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_wrong_state_width_rejected() {
        let critic = critic();
        let result = critic.forward(array![0.1].view(), array![1.0, 0.0, 0.0, 0.0].view());
        assert!(matches!(result, Err(AgentError::ShapeMismatch { .. })));
    }
}

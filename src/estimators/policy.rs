use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;

use crate::activations::{Activation, Softmax};
use crate::error::Result;
use crate::layers::{LayerGradients, WeightInit};
use crate::network::{NetworkTrace, NeuralNetwork};
use super::check_width;

/// The actor: maps states to a distribution over `action_dim` actions.
#[derive(Clone, Debug, PartialEq)]
pub struct PolicyEstimator {
    network: NeuralNetwork,
}

/// Trace of a differentiable policy forward pass.
#[derive(Clone, Debug)]
pub struct PolicyTrace {
    network: NetworkTrace,
    probabilities: Array2<f32>,
}

impl PolicyEstimator {
    pub fn new<R: Rng + ?Sized>(
        state_dim: usize,
        action_dim: usize,
        hidden_sizes: &[usize],
        init: &WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        let network = NeuralNetwork::mlp(state_dim, hidden_sizes, action_dim, Activation::Linear, init, rng)?;
        Ok(PolicyEstimator { network })
    }

    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut NeuralNetwork {
        &mut self.network
    }

    pub fn state_dim(&self) -> usize {
        self.network.input_size()
    }

    pub fn action_dim(&self) -> usize {
        self.network.output_size()
    }

    /// Action probabilities for a single state.
    pub fn forward(&self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        let probabilities = self.forward_batch(state.insert_axis(Axis(0)))?;
        Ok(probabilities.row(0).to_owned())
    }

    /// Action probabilities for a `[batch, state_dim]` matrix of states.
    pub fn forward_batch(&self, states: ArrayView2<f32>) -> Result<Array2<f32>> {
        check_width("state", states.ncols(), self.state_dim())?;
        let mut probabilities = self.network.forward_batch(states);
        Softmax::apply_batch(&mut probabilities);
        Ok(probabilities)
    }

    /// Forward pass that can be differentiated with [`PolicyEstimator::backward`].
    pub fn forward_traced(&self, states: ArrayView2<f32>) -> Result<(Array2<f32>, PolicyTrace)> {
        check_width("state", states.ncols(), self.state_dim())?;
        let (mut probabilities, network) = self.network.forward_traced(states);
        Softmax::apply_batch(&mut probabilities);
        let trace = PolicyTrace {
            network,
            probabilities: probabilities.clone(),
        };
        Ok((probabilities, trace))
    }

    /// Parameter gradients given dL/d(probabilities).
    pub fn backward(&self, trace: &PolicyTrace, probability_errors: ArrayView2<f32>) -> Vec<LayerGradients> {
        let logit_errors = Softmax::backward_batch(trace.probabilities.view(), probability_errors);
        let (_, gradients) = self.network.backward(&trace.network, logit_errors.view());
        gradients
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn policy() -> PolicyEstimator {
        let mut rng = StdRng::seed_from_u64(11);
        PolicyEstimator::new(2, 4, &[16, 16], &WeightInit::default(), &mut rng).unwrap()
    }

    #[test]
    fn test_forward_is_a_distribution() {
        let probabilities = policy().forward(array![0.5, -1.0].view()).unwrap();
        assert_eq!(probabilities.len(), 4);
        assert!(probabilities.iter().all(|&p| p >= 0.0));
        assert!((probabilities.sum() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_forward_rejects_wrong_state_width() {
        let result = policy().forward(array![0.5, -1.0, 2.0].view());
        assert!(matches!(result, Err(AgentError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_backward_matches_finite_differences() {
        let estimator = policy();
        let states = array![[0.3, -0.7], [1.2, 0.4]];
        let upstream = array![[1.0, -0.5, 0.25, 2.0], [0.0, 1.0, -1.0, 0.5]];
        let (_, trace) = estimator.forward_traced(states.view()).unwrap();
        let gradients = estimator.backward(&trace, upstream.view());

        let objective = |policy: &PolicyEstimator| -> f32 {
            (policy.forward_batch(states.view()).unwrap() * &upstream).sum()
        };

        let eps = 1e-2;
        for (i, j) in [(0, 0), (1, 3), (0, 7)] {
            let mut plus = estimator.clone();
            plus.network_mut().layers[0].weights[[i, j]] += eps;
            let mut minus = estimator.clone();
            minus.network_mut().layers[0].weights[[i, j]] -= eps;
            let numeric = (objective(&plus) - objective(&minus)) / (2.0 * eps);
            assert!((numeric - gradients[0].weights[[i, j]]).abs() < 1e-2);
        }
    }
}

//! Slowly tracking shadow copies of the estimators.
//!
//! Target networks provide the bootstrap term of the TD target. They never
//! receive gradients; after every training step they move a fraction `tau`
//! of the way toward the live parameters:
//!
//! ```text
//! θ_target ← τ · θ_live + (1 − τ) · θ_target
//! ```

use crate::error::{AgentError, Result};
use crate::estimators::{PolicyEstimator, ValueEstimator};
use crate::network::NeuralNetwork;

/// Polyak-average every parameter tensor of `source` into `target`.
///
/// `tau = 0` leaves `target` untouched and `tau = 1` copies `source`
/// exactly. Both networks must share the same architecture.
pub fn soft_update(target: &mut NeuralNetwork, source: &NeuralNetwork, tau: f32) -> Result<()> {
    if target.layers.len() != source.layers.len() {
        return Err(AgentError::shape_mismatch(
            format!("{} layers", source.layers.len()),
            format!("{} layers", target.layers.len()),
        ));
    }
    for (target_layer, source_layer) in target.layers.iter().zip(&source.layers) {
        if target_layer.weights.dim() != source_layer.weights.dim() {
            return Err(AgentError::shape_mismatch(
                format!("weights {:?}", source_layer.weights.dim()),
                format!("weights {:?}", target_layer.weights.dim()),
            ));
        }
    }

    for (target_layer, source_layer) in target.layers.iter_mut().zip(&source.layers) {
        target_layer
            .weights
            .zip_mut_with(&source_layer.weights, |t, &s| *t = polyak(*t, s, tau));
        target_layer
            .biases
            .zip_mut_with(&source_layer.biases, |t, &s| *t = polyak(*t, s, tau));
    }
    Ok(())
}

fn polyak(target: f32, source: f32, tau: f32) -> f32 {
    tau * source + (1.0 - tau) * target
}

/// Target copies of the actor and the critic.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetPair {
    pub policy: PolicyEstimator,
    pub value: ValueEstimator,
}

impl TargetPair {
    /// Start both targets as exact copies of the live estimators.
    pub fn from_live(policy: &PolicyEstimator, value: &ValueEstimator) -> Self {
        TargetPair {
            policy: policy.clone(),
            value: value.clone(),
        }
    }

    /// One Polyak step for the critic pair, then for the actor pair.
    pub fn track(&mut self, policy: &PolicyEstimator, value: &ValueEstimator, tau: f32) -> Result<()> {
        soft_update(self.value.network_mut(), value.network(), tau)?;
        soft_update(self.policy.network_mut(), policy.network(), tau)
    }
}

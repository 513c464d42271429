use ndarray::{Array2, ArrayView2, Zip};

use crate::error::{AgentError, Result};
use crate::estimators::one_hot;
use crate::replay_buffer::Transition;

/// A sampled minibatch stacked into row-aligned matrices.
///
/// `rewards` and `dones` are `[batch, 1]` columns so they broadcast
/// against critic outputs; `dones` holds 1.0 for terminal transitions.
#[derive(Clone, Debug)]
pub struct TransitionBatch {
    pub states: Array2<f32>,
    pub next_states: Array2<f32>,
    pub actions: Vec<usize>,
    pub actions_onehot: Array2<f32>,
    pub rewards: Array2<f32>,
    pub dones: Array2<f32>,
}

impl TransitionBatch {
    pub fn from_transitions(transitions: &[&Transition], action_dim: usize) -> Result<Self> {
        let first = transitions
            .first()
            .ok_or(AgentError::InsufficientData { requested: 1, available: 0 })?;
        let state_dim = first.state.len();
        let batch_size = transitions.len();

        let mut states = Array2::zeros((batch_size, state_dim));
        let mut next_states = Array2::zeros((batch_size, state_dim));
        let mut rewards = Array2::zeros((batch_size, 1));
        let mut dones = Array2::zeros((batch_size, 1));
        let mut actions = Vec::with_capacity(batch_size);

        for (i, transition) in transitions.iter().enumerate() {
            if transition.state.len() != state_dim || transition.next_state.len() != state_dim {
                return Err(AgentError::shape_mismatch(
                    format!("states of length {}", state_dim),
                    format!(
                        "state of length {} and next state of length {}",
                        transition.state.len(),
                        transition.next_state.len()
                    ),
                ));
            }
            states.row_mut(i).assign(&transition.state);
            next_states.row_mut(i).assign(&transition.next_state);
            rewards[[i, 0]] = transition.reward;
            dones[[i, 0]] = if transition.done { 1.0 } else { 0.0 };
            actions.push(transition.action);
        }

        let actions_onehot = one_hot(&actions, action_dim)?;

        Ok(TransitionBatch {
            states,
            next_states,
            actions,
            actions_onehot,
            rewards,
            dones,
        })
    }

    /// `r + γ · next_value` per row; terminal rows keep the bare reward and
    /// never read their `next_values` entry.
    pub fn bootstrap(&self, next_values: ArrayView2<f32>, discount: f32) -> Array2<f32> {
        let mut targets = self.rewards.clone();
        Zip::from(&mut targets)
            .and(&self.dones)
            .and(next_values)
            .for_each(|target, &done, &next_value| {
                if done == 0.0 {
                    *target += discount * next_value;
                }
            });
        targets
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_stacks_rows_in_order() {
        let a = Transition::new(array![0.0, 1.0], array![1.0, 1.0], 3, 0.5, false);
        let b = Transition::new(array![2.0, 2.0], array![2.0, 3.0], 0, -1.0, true);
        let batch = TransitionBatch::from_transitions(&[&a, &b], 4).unwrap();

        assert_eq!(batch.states, array![[0.0, 1.0], [2.0, 2.0]]);
        assert_eq!(batch.next_states, array![[1.0, 1.0], [2.0, 3.0]]);
        assert_eq!(batch.actions_onehot, array![[0.0, 0.0, 0.0, 1.0], [1.0, 0.0, 0.0, 0.0]]);
        assert_eq!(batch.rewards, array![[0.5], [-1.0]]);
        assert_eq!(batch.dones, array![[0.0], [1.0]]);
    }

    #[test]
    fn test_terminal_rows_ignore_next_value() {
        let a = Transition::new(array![0.0], array![1.0], 0, 10.0, true);
        let b = Transition::new(array![1.0], array![2.0], 1, 1.0, false);
        let c = Transition::new(array![2.0], array![3.0], 1, -1.0, true);
        let batch = TransitionBatch::from_transitions(&[&a, &b, &c], 2).unwrap();

        let next_values = array![[f32::INFINITY], [2.0], [f32::NAN]];
        let targets = batch.bootstrap(next_values.view(), 0.5);
        assert_eq!(targets, array![[10.0], [2.0], [-1.0]]);
    }

    #[test]
    fn test_ragged_states_rejected() {
        let a = Transition::new(array![0.0, 1.0], array![1.0, 1.0], 0, 0.0, false);
        let b = Transition::new(array![2.0], array![2.0], 0, 0.0, false);
        let result = TransitionBatch::from_transitions(&[&a, &b], 2);
        assert!(matches!(result, Err(AgentError::ShapeMismatch { .. })));
    }
}

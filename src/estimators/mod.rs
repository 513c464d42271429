//! # Estimators
//!
//! The two function approximators the agent trains:
//!
//! - [`PolicyEstimator`] (actor): state → probability distribution over the
//!   discrete actions, `softmax(MLP(state))`.
//! - [`ValueEstimator`] (critic): (state, one-hot action) → scalar value,
//!   `MLP(concat(state, action))`.
//!
//! Both are pure functions of their owned parameters. Dimensionality is
//! checked here, at the estimator boundary, and reported as
//! [`AgentError::ShapeMismatch`].

mod policy;
mod value;

pub use policy::{PolicyEstimator, PolicyTrace};
pub use value::ValueEstimator;

use ndarray::{Array2, ArrayView2, Axis};

use crate::error::{AgentError, Result};

/// One-hot encode `actions` into a `[actions.len(), action_dim]` matrix.
pub fn one_hot(actions: &[usize], action_dim: usize) -> Result<Array2<f32>> {
    let mut encoded = Array2::zeros((actions.len(), action_dim));
    for (row, &action) in actions.iter().enumerate() {
        if action >= action_dim {
            return Err(AgentError::InvalidAction { action, action_dim });
        }
        encoded[[row, action]] = 1.0;
    }
    Ok(encoded)
}

/// Index of the largest entry of every row; the first one wins on ties.
pub fn argmax_rows(values: ArrayView2<f32>) -> Vec<usize> {
    values
        .axis_iter(Axis(0))
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |(best, best_value), (idx, &value)| {
                    if value > best_value {
                        (idx, value)
                    } else {
                        (best, best_value)
                    }
                })
                .0
        })
        .collect()
}

/// Vector-Jacobian product of "argmax, then one-hot encode".
///
/// The map is piecewise constant in its input, so its Jacobian is zero
/// almost everywhere: whatever arrives from the one-hot side, nothing
/// reaches the probabilities it was computed from.
pub fn argmax_one_hot_backward(onehot_errors: ArrayView2<f32>) -> Array2<f32> {
    Array2::zeros(onehot_errors.raw_dim())
}

pub(crate) fn check_width(what: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(AgentError::shape_mismatch(
            format!("{} of width {}", what, expected),
            format!("{} of width {}", what, actual),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_one_hot_rows() {
        let encoded = one_hot(&[2, 0], 3).unwrap();
        assert_eq!(encoded, array![[0.0, 0.0, 1.0], [1.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_one_hot_rejects_out_of_range_action() {
        assert_eq!(
            one_hot(&[4], 4),
            Err(AgentError::InvalidAction { action: 4, action_dim: 4 })
        );
    }

    #[test]
    fn test_argmax_backward_is_zero() {
        let upstream = array![[3.0, -1.0], [0.5, 2.0]];
        assert_eq!(argmax_one_hot_backward(upstream.view()), Array2::<f32>::zeros((2, 2)));
    }

    #[test]
    fn test_argmax_prefers_first_on_ties() {
        let values = array![[0.1, 0.7, 0.2], [0.5, 0.5, 0.0]];
        assert_eq!(argmax_rows(values.view()), vec![1, 0]);
    }
}

//! # Activation Functions Module
//!
//! Element-wise activations used by the hidden and output layers of the
//! estimators, plus the row-wise softmax that turns the policy's logits
//! into an action distribution.
//!
//! ## Available Activations
//!
//! - **ReLU** (Rectified Linear Unit): `max(0, x)` - hidden layers of both estimators
//! - **Linear**: Identity function - output layer of the critic and the policy logits
//! - **Softmax**: `exp(x_i) / Σ exp(x_j)` per row - applied on top of the policy logits
//!
//! ## Usage Example
//!
//! ```rust
//! use ddpg_discrete::activations::{Activation, Softmax};
//! use ndarray::array;
//!
//! let mut hidden = array![[1.0, -0.5, 0.0, 2.0]];
//! Activation::Relu.apply_batch(&mut hidden);
//! assert_eq!(hidden, array![[1.0, 0.0, 0.0, 2.0]]);
//!
//! let mut logits = array![[0.0, 0.0]];
//! Softmax::apply_batch(&mut logits);
//! assert_eq!(logits, array![[0.5, 0.5]]);
//! ```

pub mod functions;
pub mod softmax;

pub use functions::Activation;
pub use softmax::Softmax;

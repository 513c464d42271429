//! # ddpg-discrete - Off-Policy Actor-Critic for Discrete Actions
//!
//! A small reinforcement learning library built around a single agent: a
//! softmax policy (actor) and an action-value estimator (critic), trained
//! from a replay buffer with slowly tracking target copies of both.
//!
//! ## Key Features
//!
//! - **Pure Estimators**: Forward passes never mutate; gradients come from explicit traces
//! - **Adam Optimizer**: Bias-corrected, with per-layer moment state
//! - **Replay Buffer**: Fixed-capacity ring with uniform sampling
//! - **Target Networks**: Polyak averaging after every training step
//! - **Reproducibility**: Every random draw goes through one seedable generator
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ddpg_discrete::agent::AgentBuilder;
//! use ddpg_discrete::environment::{Environment, GridWorld};
//! use ddpg_discrete::training::Trainer;
//!
//! let mut env = GridWorld::new((5, 5), (0, 0), (4, 4), vec![(2, 2)]).unwrap();
//! let mut agent = AgentBuilder::new(env.state_dim(), env.action_dim())
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! let mut trainer = Trainer::new(100);
//! let summaries = trainer.run(&mut agent, &mut env, 10).unwrap();
//! println!("last reward: {}", summaries[9].total_reward);
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - ReLU, linear and softmax with their derivatives
//! - [`agent`] - The actor-critic agent, its configuration and builder
//! - [`environment`] - Environment trait and a grid world
//! - [`error`] - Error types and result handling
//! - [`estimators`] - Policy and value estimators
//! - [`layers`] - Dense layers and weight initialization
//! - [`loss`] - Mean squared error
//! - [`metrics`] - Training metrics and tracking
//! - [`network`] - Feed-forward network with traced backpropagation
//! - [`optimizer`] - Adam and SGD
//! - [`replay_buffer`] - Experience replay
//! - [`target`] - Target networks and soft updates
//! - [`training`] - Episode driver

pub mod activations;
pub mod agent;
pub mod environment;
pub mod error;
pub mod estimators;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod replay_buffer;
pub mod target;
pub mod training;

#[cfg(test)]
mod tests;

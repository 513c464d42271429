//! # Actor-Critic Agent Module
//!
//! The learning agent: it selects actions, stores experience, and trains a
//! softmax policy (actor) and an action-value estimator (critic) from
//! replayed transitions.
//!
//! ## Training Step
//!
//! Each call to [`Agent::train`] with a sufficiently filled buffer:
//!
//! 1. Samples a batch uniformly from the replay buffer
//! 2. Builds TD targets from the target networks, bootstrapping on the
//!    target actor's greedy next action
//! 3. Takes one optimizer step on the critic's MSE loss
//! 4. Takes one optimizer step on the actor's loss, the negated critic value
//!    of its own greedy actions
//! 5. Polyak-averages both target networks toward the live ones
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ddpg_discrete::agent::{Agent, Device};
//! use ndarray::array;
//!
//! let mut agent = Agent::new(2, 4, 1.0, Device::Cpu).unwrap();
//! let state = array![0.0, 0.0];
//! let action = agent.select_action(state.view(), true).unwrap();
//! ```

mod actor_critic;
mod batch;
mod config;

pub use actor_critic::{Agent, AgentBuilder, TrainStats};
pub use batch::TransitionBatch;
pub use config::{AgentConfig, Device};

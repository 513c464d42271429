//! # Environment Interface
//!
//! The boundary between the agent and whatever it acts in. An environment
//! hands out an initial observation on [`Environment::reset`] and answers
//! every action with a [`Step`]. The agent never looks at `info`.

mod grid;

pub use grid::{GridAction, GridWorld, GOAL_REWARD, OBSTACLE_REWARD, STEP_REWARD};

use ndarray::Array1;

use crate::error::Result;

/// Outcome of applying one action.
#[derive(Clone, Debug, PartialEq)]
pub struct Step<I = ()> {
    pub next_state: Array1<f32>,
    pub reward: f32,
    pub done: bool,
    pub info: I,
}

/// Single-agent, discrete-action environment.
pub trait Environment {
    /// Auxiliary payload returned with every step
    type Info;

    /// Length of every observation vector
    fn state_dim(&self) -> usize;

    /// Number of discrete actions
    fn action_dim(&self) -> usize;

    /// Start a new episode and return its first observation.
    fn reset(&mut self) -> Array1<f32>;

    /// Apply `action` and report what happened.
    fn step(&mut self, action: usize) -> Result<Step<Self::Info>>;
}

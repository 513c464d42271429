use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::error::{AgentError, Result};
use crate::layers::WeightInit;
use crate::optimizer::OptimizerKind;

/// Where the numeric work runs.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum Device {
    #[default]
    Cpu,
}

/// Hyperparameters fixed at agent construction.
///
/// Missing fields fall back to the defaults below when deserialized, so a
/// configuration file only needs to name what it changes.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    /// Widths of the hidden layers, shared by actor and critic
    pub hidden_sizes: Vec<usize>,
    pub actor_learning_rate: f32,
    pub critic_learning_rate: f32,
    pub batch_size: usize,
    /// Discount factor γ of the TD target
    pub discount: f32,
    /// Polyak coefficient τ for the target networks
    pub tau: f32,
    /// Probability of a uniformly random action when exploring
    pub epsilon: f32,
    pub buffer_capacity: usize,
    pub weight_init: WeightInit,
    pub optimizer: OptimizerKind,
    /// Seed for initialisation, exploration and batch sampling; `None` draws from the OS
    pub seed: Option<u64>,
    pub device: Device,
    /// Stored for continuous-action variants; no decision uses it
    pub max_action: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            hidden_sizes: vec![128, 128],
            actor_learning_rate: 1e-3,
            critic_learning_rate: 1e-3,
            batch_size: 64,
            discount: 0.99,
            tau: 0.005,
            epsilon: 0.2,
            buffer_capacity: 100_000,
            weight_init: WeightInit::FanInUniform,
            optimizer: OptimizerKind::Adam,
            seed: None,
            device: Device::Cpu,
            max_action: 1.0,
        }
    }
}

impl AgentConfig {
    /// Parse a JSON document, then validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AgentConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.hidden_sizes.is_empty() || self.hidden_sizes.contains(&0) {
            return Err(AgentError::invalid_parameter(
                "hidden_sizes",
                "need at least one hidden layer, all widths positive",
            ));
        }
        check_positive("actor_learning_rate", self.actor_learning_rate)?;
        check_positive("critic_learning_rate", self.critic_learning_rate)?;
        check_unit_interval("discount", self.discount)?;
        check_unit_interval("tau", self.tau)?;
        check_unit_interval("epsilon", self.epsilon)?;

        if self.batch_size == 0 {
            return Err(AgentError::invalid_parameter("batch_size", "must be positive"));
        }
        if self.batch_size > self.buffer_capacity {
            return Err(AgentError::InvalidParameter {
                name: "batch_size".to_string(),
                reason: format!(
                    "{} exceeds buffer capacity {}, training could never run",
                    self.batch_size, self.buffer_capacity
                ),
            });
        }
        if let WeightInit::Uniform { min, max } = self.weight_init {
            if !(min.is_finite() && max.is_finite() && min <= max) {
                return Err(AgentError::invalid_parameter("weight_init", "uniform range needs finite min <= max"));
            }
        }
        Ok(())
    }
}

fn check_positive(name: &str, value: f32) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(AgentError::InvalidParameter {
            name: name.to_string(),
            reason: format!("must be a positive finite number, got {}", value),
        });
    }
    Ok(())
}

fn check_unit_interval(name: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(AgentError::InvalidParameter {
            name: name.to_string(),
            reason: format!("must lie in [0, 1], got {}", value),
        });
    }
    Ok(())
}

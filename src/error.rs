use std::fmt;

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Main error type for the crate
#[derive(Debug, Clone, PartialEq)]
pub enum AgentError {
    /// Input dimensionality disagrees with what the estimator was built for
    ShapeMismatch {
        expected: String,
        actual: String,
    },

    /// Action index outside `[0, action_dim)`
    InvalidAction {
        action: usize,
        action_dim: usize,
    },

    /// Invalid construction argument
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Not enough stored transitions to draw the requested sample
    InsufficientData {
        requested: usize,
        available: usize,
    },

    /// Numerical computation errors
    NumericalError(String),

    /// IO errors (configuration files)
    IoError(String),

    /// Configuration parse errors
    ConfigError(String),
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::ShapeMismatch { expected, actual } => {
                write!(f, "Shape mismatch: expected {}, got {}", expected, actual)
            }
            AgentError::InvalidAction { action, action_dim } => {
                write!(f, "Invalid action {}: must be less than {}", action, action_dim)
            }
            AgentError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            AgentError::InsufficientData { requested, available } => {
                write!(
                    f,
                    "Insufficient data: requested {} transitions, only {} stored",
                    requested, available
                )
            }
            AgentError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
            AgentError::IoError(msg) => write!(f, "IO error: {}", msg),
            AgentError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AgentError {}

impl From<std::io::Error> for AgentError {
    fn from(err: std::io::Error) -> Self {
        AgentError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::ConfigError(err.to_string())
    }
}

impl AgentError {
    pub fn shape_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        AgentError::ShapeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        AgentError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

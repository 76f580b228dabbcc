//! Crate error types.
//!
//! `CoreError` is reported at the I/O boundary (JSON parsing, configuration).
//! Validation and mapping never fail; their problems are reported as data.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Config,
    Model,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Config => write!(f, "Config"),
            Phase::Model => write!(f, "Model"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoreError {
    pub code: String,
    pub phase: Phase,
    pub message: String,
    pub node_id: Option<String>,
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node_id {
            Some(id) => write!(
                f,
                "[{}:{}] {} (node '{}')",
                self.phase, self.code, self.message, id
            ),
            None => write!(f, "[{}:{}] {}", self.phase, self.code, self.message),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<ModelError> for CoreError {
    fn from(e: ModelError) -> Self {
        let node_id = e.node_id().map(str::to_string);
        CoreError {
            code: e.code().to_string(),
            phase: Phase::Model,
            message: e.to_string(),
            node_id,
        }
    }
}

impl CoreError {
    pub fn parse(code: &str, message: impl Into<String>) -> Self {
        CoreError {
            code: code.into(),
            phase: Phase::Parse,
            message: message.into(),
            node_id: None,
        }
    }

    pub fn config(code: &str, message: impl Into<String>) -> Self {
        CoreError {
            code: code.into(),
            phase: Phase::Config,
            message: message.into(),
            node_id: None,
        }
    }
}

/// Failures of builder-side graph edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("parameter '{parameter}' not found on node '{node_id}'")]
    ParameterNotFound { node_id: String, parameter: String },

    #[error("node '{node_id}' is a {actual} node, expected {expected}")]
    WrongNodeType {
        node_id: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("duplicate node id: {0}")]
    DuplicateId(String),

    #[error("index {index} out of range for workflow of {len} nodes")]
    IndexOutOfRange { index: usize, len: usize },
}

impl ModelError {
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::NodeNotFound(_) => "M001",
            ModelError::ParameterNotFound { .. } => "M002",
            ModelError::WrongNodeType { .. } => "M003",
            ModelError::DuplicateId(_) => "M004",
            ModelError::IndexOutOfRange { .. } => "M005",
        }
    }

    pub fn node_id(&self) -> Option<&str> {
        match self {
            ModelError::NodeNotFound(id) | ModelError::DuplicateId(id) => Some(id),
            ModelError::ParameterNotFound { node_id, .. }
            | ModelError::WrongNodeType { node_id, .. } => Some(node_id),
            ModelError::IndexOutOfRange { .. } => None,
        }
    }
}

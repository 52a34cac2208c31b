use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::errors::ProviderError;

#[non_exhaustive]
#[derive(Error, Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum AgentError {
    /// The request carried nothing the agent can answer
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Model error: {message}")]
    Model { message: String, status: Option<u16> },

    #[error("Could not parse model output: {0}")]
    OutputParse(String),

    #[error("Prompt template error: {0}")]
    Template(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentError {
    /// HTTP status that best describes the error at the request boundary
    pub fn status(&self) -> u16 {
        match self {
            AgentError::Input(_) => 400,
            AgentError::Model {
                status: Some(status),
                ..
            } => *status,
            _ => 500,
        }
    }
}

impl From<ProviderError> for AgentError {
    fn from(err: ProviderError) -> Self {
        AgentError::Model {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl From<tera::Error> for AgentError {
    fn from(err: tera::Error) -> Self {
        AgentError::Template(err.to_string())
    }
}

pub type AgentResult<T> = Result<T, AgentError>;

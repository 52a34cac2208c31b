use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Server error: {status}")]
    ServerError { status: u16 },

    #[error("Request failed: {status}\n{message}")]
    RequestFailed { status: u16, message: String },

    #[error("Could not reach the model: {0}")]
    Network(#[source] reqwest::Error),

    #[error("The model sent nothing for {0:?}")]
    Timeout(Duration),

    #[error("Invalid response from the model: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// The status the model endpoint answered with, if it answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::ServerError { status } => Some(*status),
            ProviderError::RequestFailed { status, .. } => Some(*status),
            ProviderError::Network(err) => err.status().map(|status| status.as_u16()),
            ProviderError::Timeout(_) | ProviderError::InvalidResponse(_) => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        // A body that arrived but is not the expected JSON
        if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else {
            ProviderError::Network(err)
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::InvalidResponse(err.to_string())
    }
}

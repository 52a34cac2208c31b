use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid server address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

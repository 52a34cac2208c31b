use crate::error::ConfigError;
use config::{Config, Environment};
use jarvis::agent::DEFAULT_MAX_ITERATIONS;
use jarvis::prompt_template::Language;
use jarvis::providers::{configs::OllamaProviderConfig, ollama};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let address = format!("{}:{}", self.host, self.port);
        address
            .parse()
            .map_err(|err: std::net::AddrParseError| ConfigError::InvalidAddress {
                reason: err.to_string(),
                address,
            })
    }
}

/// The Ollama server both pipelines talk to
#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_ollama_host")]
    pub host: String,
    #[serde(default = "default_ollama_model")]
    pub model: String,
    /// Sampling temperature of the plain chat pipeline
    #[serde(default = "default_chat_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<i32>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
            temperature: default_chat_temperature(),
            max_tokens: None,
        }
    }
}

impl ProviderSettings {
    pub fn into_config(self) -> OllamaProviderConfig {
        OllamaProviderConfig {
            host: self.host,
            model: self.model,
            temperature: Some(self.temperature),
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default)]
    pub handle_parsing_errors: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_iterations: default_max_iterations(),
            handle_parsing_errors: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub language: Language,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        // Start with default configuration
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Provider defaults
            .set_default("provider.host", default_ollama_host())?
            .set_default("provider.model", default_ollama_model())?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("JARVIS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Self = config.try_deserialize()?;
        Ok(settings)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_ollama_host() -> String {
    ollama::OLLAMA_HOST.to_string()
}

fn default_ollama_model() -> String {
    ollama::OLLAMA_MODEL.to_string()
}

fn default_chat_temperature() -> f32 {
    0.3
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

use std::sync::Arc;

use jarvis::agent::Agent;
use jarvis::chat::ChatPipeline;
use jarvis::prompt_template::Language;
use jarvis::providers::{base::Provider, errors::ProviderError, ollama::OllamaProvider};
use jarvis::tools::default_tools;

use crate::configuration::{AgentSettings, Settings};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    chat_provider: Arc<dyn Provider>,
    agent_provider: Arc<dyn Provider>,
    language: Language,
    agent: AgentSettings,
}

impl AppState {
    pub fn new(
        chat_provider: Arc<dyn Provider>,
        agent_provider: Arc<dyn Provider>,
        language: Language,
        agent: AgentSettings,
    ) -> Self {
        Self {
            chat_provider,
            agent_provider,
            language,
            agent,
        }
    }

    /// Both pipelines share the Ollama server and differ in sampling temperature
    pub fn from_settings(settings: Settings) -> Result<Self, ProviderError> {
        let agent_temperature = settings.agent.temperature;
        let chat_config = settings.provider.into_config();
        let agent_config = chat_config.with_temperature(Some(agent_temperature));

        Ok(Self::new(
            Arc::new(OllamaProvider::new(chat_config)?),
            Arc::new(OllamaProvider::new(agent_config)?),
            settings.language,
            settings.agent,
        ))
    }

    pub fn chat(&self) -> ChatPipeline {
        ChatPipeline::new(self.chat_provider.clone(), self.language)
    }

    /// A fresh executor with the default toolset for one request
    pub fn agent(&self) -> Agent {
        Agent::new(self.agent_provider.clone())
            .with_tools(default_tools())
            .with_max_iterations(self.agent.max_iterations)
            .with_parsing_error_recovery(self.agent.handle_parsing_errors)
    }
}

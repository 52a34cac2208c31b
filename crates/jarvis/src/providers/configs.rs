#[derive(Debug, Clone, PartialEq)]
pub struct OllamaProviderConfig {
    pub host: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

impl OllamaProviderConfig {
    /// The same endpoint and model with a different sampling temperature
    pub fn with_temperature(&self, temperature: Option<f32>) -> Self {
        Self {
            temperature,
            ..self.clone()
        }
    }
}

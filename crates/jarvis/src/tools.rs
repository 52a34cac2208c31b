mod calculator;
mod error;

pub use calculator::Calculator;
pub use error::{ToolError, ToolResult};

use async_trait::async_trait;
use serde::Serialize;

/// A capability the agent can invoke with text input while it reasons
#[async_trait]
pub trait Tool: Send + Sync {
    /// The name the model uses to select the tool
    fn name(&self) -> &str;

    /// What the tool does and what input it expects, shown to the model
    fn description(&self) -> &str;

    /// Run the tool. Errors are reported back to the model, not to the user.
    async fn invoke(&self, input: &str) -> ToolResult<String>;
}

/// Name and description of a tool as rendered into prompts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

impl ToolInfo {
    pub fn of(tool: &dyn Tool) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
        }
    }
}

/// The toolset every agent request starts with
pub fn default_tools() -> Vec<Box<dyn Tool>> {
    vec![Box::new(Calculator)]
}

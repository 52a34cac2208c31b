use serde::{Deserialize, Serialize};

/// A tool selection parsed out of a model response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAction {
    pub tool: String,
    pub tool_input: String,
    /// The raw model text the action was parsed from
    pub log: String,
}

/// One completed tool round: what was asked and what the tool said
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStep {
    pub action: AgentAction,
    pub observation: String,
}

/// The final result of an agent run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentOutput {
    pub output: String,
    pub intermediate_steps: Vec<AgentStep>,
}

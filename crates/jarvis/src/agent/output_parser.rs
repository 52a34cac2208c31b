use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::errors::{AgentError, AgentResult};
use crate::models::step::AgentAction;

/// The exact characters that introduce the user-visible answer
pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

lazy_static! {
    static ref FENCED_BLOB: Regex = Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap();
}

/// What the model decided to do in one step
#[derive(Debug, Clone, PartialEq)]
pub enum AgentDecision {
    Action(AgentAction),
    Finish { output: String },
}

/// Parse one model response.
///
/// A response containing the final answer marker finishes the run with everything after the
/// first marker, trimmed. Otherwise the response must carry a JSON blob with an `action`
/// and an `action_input`, preferably fenced.
pub fn parse(text: &str) -> AgentResult<AgentDecision> {
    if let Some(idx) = text.find(FINAL_ANSWER_MARKER) {
        let output = text[idx + FINAL_ANSWER_MARKER.len()..].trim().to_string();
        return Ok(AgentDecision::Finish { output });
    }

    let blob = FENCED_BLOB
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .or_else(|| bare_blob(text))
        .ok_or_else(|| AgentError::OutputParse(format!("Could not parse LLM output: {}", text)))?;

    let value: Value = serde_json::from_str(blob).map_err(|e| {
        AgentError::OutputParse(format!("Invalid action blob ({}): {}", e, blob))
    })?;

    let tool = value
        .get("action")
        .and_then(|action| action.as_str())
        .ok_or_else(|| AgentError::OutputParse(format!("Action blob has no action: {}", blob)))?;

    let tool_input = match value.get("action_input") {
        Some(Value::String(input)) => input.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    Ok(AgentDecision::Action(AgentAction {
        tool: tool.to_string(),
        tool_input,
        log: text.to_string(),
    }))
}

/// An unfenced `{...}` span, for models that forget the fences
fn bare_blob(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

use serde::Serialize;

use crate::errors::AgentResult;
use crate::models::message::Message;
use crate::models::step::AgentStep;
use crate::prompt_template::load_prompt_file;
use crate::tools::ToolInfo;

#[derive(Serialize)]
struct SystemPromptContext<'a> {
    tools: &'a [ToolInfo],
    tool_names: String,
}

/// The instructions listing the tools and the required response format
pub fn system_prompt(tools: &[ToolInfo]) -> AgentResult<String> {
    let tool_names = tools
        .iter()
        .map(|tool| tool.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Ok(load_prompt_file(
        "agent_system.md",
        &SystemPromptContext { tools, tool_names },
    )?)
}

/// The model's previous actions and what the tools answered, in the format it writes them
pub fn construct_scratchpad(steps: &[AgentStep]) -> String {
    if steps.is_empty() {
        return String::new();
    }

    let mut thoughts = String::from(
        "This was your previous work (but I haven't seen any of it! I only see what you return as final answer):\n",
    );
    for step in steps {
        thoughts.push_str(&step.action.log);
        thoughts.push_str(&format!("\nObservation: {}\nThought:", step.observation));
    }
    thoughts
}

/// Everything the model sees for one step: instructions, earlier conversation, then the
/// question together with the work done so far
pub fn build_messages(
    system: &str,
    history: &[Message],
    input: &str,
    steps: &[AgentStep],
) -> Vec<Message> {
    let scratchpad = construct_scratchpad(steps);
    let question = if scratchpad.is_empty() {
        input.to_string()
    } else {
        format!("{}\n\n{}", input, scratchpad)
    };

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system().with_text(system));
    messages.extend(history.iter().cloned());
    messages.push(Message::user().with_text(question));
    messages
}

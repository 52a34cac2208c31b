use super::step::{AgentAction, AgentOutput, AgentStep};

/// Everything an agent run reports while it progresses, in the order it happens.
///
/// Only `FinalAnswerToken` carries text meant for the end user. The rest describes the
/// reasoning loop and is useful for tracing.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// Model text that is not part of the final answer
    Thought(String),
    /// The model selected a tool
    Action(AgentAction),
    /// A tool ran and its observation was recorded
    Step(AgentStep),
    /// A piece of the user-visible answer
    FinalAnswerToken(String),
    /// The run is over; always the last event of a successful run
    Finished(AgentOutput),
}

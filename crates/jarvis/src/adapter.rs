use crate::errors::{AgentError, AgentResult};
use crate::models::message::{ChatTurn, Message};

/// A client conversation split into the history the model should see and the turn it
/// has to answer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Conversation {
    history: Vec<Message>,
    input: Option<String>,
}

impl Conversation {
    /// Split the raw turns. Every turn but the last becomes history, minus anything that
    /// is not a user or assistant turn. The last turn is the input whatever its role.
    pub fn from_turns(turns: &[ChatTurn]) -> Self {
        let Some((last, previous)) = turns.split_last() else {
            return Self::default();
        };

        let history = previous
            .iter()
            .filter(|turn| turn.role.is_conversational())
            .map(Message::from)
            .collect();

        Self {
            history,
            input: Some(last.content.clone()),
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// The message this request has to answer
    pub fn current_input(&self) -> AgentResult<&str> {
        self.input
            .as_deref()
            .ok_or_else(|| AgentError::Input("no current message to answer".to_string()))
    }

    /// The history flattened into `role: content` lines
    pub fn transcript(&self) -> String {
        self.history
            .iter()
            .map(Message::transcript_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

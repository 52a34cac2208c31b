use std::sync::Arc;
use tracing::debug;

use crate::adapter::Conversation;
use crate::errors::AgentResult;
use crate::models::message::Message;
use crate::prompt_template::{render_chat_prompt, Language};
use crate::providers::base::Provider;
use crate::streaming::{encode_deltas, ByteStream};

/// Answers a conversation directly with the persona prompt, without tools
pub struct ChatPipeline {
    provider: Arc<dyn Provider>,
    language: Language,
}

impl ChatPipeline {
    pub fn new(provider: Arc<dyn Provider>, language: Language) -> Self {
        Self { provider, language }
    }

    /// The single prompt message holding the transcript and the current input
    pub fn prompt(&self, conversation: &Conversation) -> AgentResult<Vec<Message>> {
        let input = conversation.current_input()?;
        let prompt = render_chat_prompt(self.language, &conversation.transcript(), input)?;
        Ok(vec![Message::user().with_text(prompt)])
    }

    /// Stream the model's answer as response bytes
    pub async fn stream(&self, conversation: &Conversation) -> AgentResult<ByteStream> {
        let messages = self.prompt(conversation)?;
        debug!(
            language = %self.language,
            history = conversation.history().len(),
            "streaming chat answer"
        );
        let deltas = self.provider.stream(&messages, &[]).await?;
        Ok(encode_deltas(deltas))
    }
}

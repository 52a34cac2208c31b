use serde_json::{json, Map, Value};

use super::configs::OllamaProviderConfig;
use super::errors::ProviderError;
use crate::models::message::Message;

/// Convert internal messages to OpenAI's chat message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| {
            json!({
                "role": message.role,
                "content": message.content,
            })
        })
        .collect()
}

/// Build a chat completion payload from the provider config
pub fn create_request(
    config: &OllamaProviderConfig,
    messages: &[Message],
    stop: &[String],
    stream: bool,
) -> Value {
    let mut payload = Map::new();
    payload.insert("model".to_string(), json!(config.model));
    payload.insert("messages".to_string(), json!(messages_to_openai_spec(messages)));
    payload.insert("stream".to_string(), json!(stream));

    if let Some(temp) = config.temperature {
        payload.insert("temperature".to_string(), json!(temp));
    }
    if let Some(tokens) = config.max_tokens {
        payload.insert("max_tokens".to_string(), json!(tokens));
    }
    if !stop.is_empty() {
        payload.insert("stop".to_string(), json!(stop));
    }

    Value::Object(payload)
}

/// Pull the assistant text out of a non-streaming completion
pub fn openai_response_to_text(response: &Value) -> Result<String, ProviderError> {
    let message = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".to_string()))?;

    // Null content is a valid, empty reply
    Ok(message
        .get("content")
        .and_then(|content| content.as_str())
        .unwrap_or_default()
        .to_string())
}

/// What a single server-sent event line of a streaming completion carries
#[derive(Debug, PartialEq)]
pub enum StreamLine {
    Delta(String),
    Done,
    Skip,
}

/// Interpret one line of an OpenAI-style SSE completion stream
pub fn parse_stream_line(line: &str) -> Result<StreamLine, ProviderError> {
    let Some(data) = line.trim().strip_prefix("data:") else {
        return Ok(StreamLine::Skip);
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(StreamLine::Done);
    }

    let chunk: Value = serde_json::from_str(data)?;
    if let Some(error) = chunk.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error");
        return Err(ProviderError::InvalidResponse(message.to_string()));
    }

    let delta = chunk
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(|content| content.as_str())
        .unwrap_or_default();

    if delta.is_empty() {
        Ok(StreamLine::Skip)
    } else {
        Ok(StreamLine::Delta(delta.to_string()))
    }
}

/// Splits a byte stream into complete lines. Bytes are only decoded once a whole line is
/// buffered so multi-byte characters split across network chunks survive.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(end) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            lines.push(String::from_utf8_lossy(&line[..end]).into_owned());
        }
        lines
    }

    /// Whatever is left once the stream ends without a trailing newline
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            let rest = std::mem::take(&mut self.pending);
            Some(String::from_utf8_lossy(&rest).into_owned())
        }
    }
}

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use super::base::{Provider, TextStream};
use super::errors::ProviderError;
use crate::models::message::Message;

/// A mock provider that returns pre-configured responses for testing
///
/// Streaming splits a response into word-sized deltas. Stop sequences cut the response the
/// way a real model would, and every call records the messages it was given.
#[derive(Clone, Default)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Result<String, u16>>>>,
    requests: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new<S: Into<String>>(responses: Vec<S>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(
                responses.into_iter().map(|r| Ok(r.into())).collect(),
            )),
            requests: Arc::default(),
        }
    }

    /// Create a provider whose next call fails with the given status
    pub fn failing(status: u16) -> Self {
        Self {
            responses: Arc::new(Mutex::new(vec![Err(status)])),
            requests: Arc::default(),
        }
    }

    /// Every message list this provider was called with, oldest first
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn next_response(&self, messages: &[Message], stop: &[String]) -> Result<String, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages.to_vec());
        }

        let next = match self.responses.lock() {
            Ok(mut responses) if !responses.is_empty() => responses.remove(0),
            // Return empty response if no more pre-configured responses
            _ => Ok(String::new()),
        };

        match next {
            Ok(text) => Ok(truncate_at_stop(text, stop)),
            Err(status) => Err(ProviderError::ServerError { status }),
        }
    }
}

fn truncate_at_stop(mut text: String, stop: &[String]) -> String {
    if let Some(cut) = stop.iter().filter_map(|s| text.find(s.as_str())).min() {
        text.truncate(cut);
    }
    text
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        messages: &[Message],
        stop: &[String],
    ) -> Result<String, ProviderError> {
        self.next_response(messages, stop)
    }

    async fn stream(
        &self,
        messages: &[Message],
        stop: &[String],
    ) -> Result<TextStream, ProviderError> {
        let text = self.next_response(messages, stop)?;
        let deltas: Vec<Result<String, ProviderError>> = text
            .split_inclusive(' ')
            .map(|delta| Ok(delta.to_string()))
            .collect();
        Ok(Box::pin(futures::stream::iter(deltas)))
    }
}

use async_trait::async_trait;
use futures::stream::BoxStream;

use super::errors::ProviderError;
use crate::models::message::Message;

/// Text deltas produced by a streaming completion, in generation order
pub type TextStream = BoxStream<'static, Result<String, ProviderError>>;

/// Base trait for language model providers
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the whole response to `messages`, cut before any of the `stop` sequences
    async fn complete(&self, messages: &[Message], stop: &[String])
        -> Result<String, ProviderError>;

    /// Generate the response to `messages` as a lazy stream of text deltas
    async fn stream(&self, messages: &[Message], stop: &[String])
        -> Result<TextStream, ProviderError>;
}

use bytes::Bytes;
use futures::stream::{BoxStream, Stream, StreamExt, TryStreamExt};

use crate::errors::{AgentError, AgentResult};
use crate::models::event::AgentEvent;
use crate::providers::base::TextStream;

/// UTF-8 text chunks written to the HTTP response body
pub type ByteStream = BoxStream<'static, AgentResult<Bytes>>;

pub fn encode_text(text: &str) -> Bytes {
    Bytes::copy_from_slice(text.as_bytes())
}

/// The bytes an event contributes to the user-visible answer, if any
pub fn final_answer_chunk(event: &AgentEvent) -> Option<Bytes> {
    match event {
        AgentEvent::FinalAnswerToken(text) if !text.is_empty() => Some(encode_text(text)),
        AgentEvent::FinalAnswerToken(_)
        | AgentEvent::Thought(_)
        | AgentEvent::Action(_)
        | AgentEvent::Step(_)
        | AgentEvent::Finished(_) => None,
    }
}

/// Keep only the final answer tokens of an agent run, in order, as response bytes.
///
/// Errors pass through so the caller decides how a failed run ends the response.
pub fn filter_final_answer<S>(events: S) -> impl Stream<Item = AgentResult<Bytes>> + Send
where
    S: Stream<Item = AgentResult<AgentEvent>> + Send,
{
    events.try_filter_map(|event| futures::future::ready(Ok(final_answer_chunk(&event))))
}

/// Encode model text deltas as response bytes
pub fn encode_deltas(deltas: TextStream) -> ByteStream {
    deltas
        .filter(|delta| futures::future::ready(!matches!(delta, Ok(text) if text.is_empty())))
        .map(|delta| delta.map(|text| encode_text(&text)).map_err(AgentError::from))
        .boxed()
}

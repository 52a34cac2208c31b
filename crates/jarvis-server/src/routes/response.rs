use axum::{
    body::Body,
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use futures::{stream::StreamExt, Stream};
use jarvis::errors::AgentError;
use jarvis::streaming::ByteStream;
use serde_json::json;
use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, warn};

/// Chunks buffered between the producing task and the response body
const CHANNEL_CAPACITY: usize = 32;

/// A failed request rendered as `{"error": message}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        let status =
            StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "request failed");
        } else {
            warn!(status = %self.status, error = %self.message, "request rejected");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// A streamed `text/plain` body fed by a producing task
pub struct TextStreamResponse {
    rx: ReceiverStream<Bytes>,
}

impl TextStreamResponse {
    fn new(rx: ReceiverStream<Bytes>) -> Self {
        Self { rx }
    }
}

impl Stream for TextStreamResponse {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_next(cx).map(|opt| opt.map(Ok))
    }
}

impl IntoResponse for TextStreamResponse {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            Body::from_stream(self),
        )
            .into_response()
    }
}

/// Start streaming `stream` to the client.
///
/// The first chunk is awaited here so a stream that fails before producing anything is
/// answered with a JSON error. After that a task pumps the rest into a bounded channel;
/// a later error ends the body, and a client that goes away drops the stream.
pub async fn stream_response(mut stream: ByteStream) -> Result<TextStreamResponse, ApiError> {
    let first = match stream.next().await {
        Some(Ok(chunk)) => Some(chunk),
        Some(Err(err)) => return Err(err.into()),
        None => None,
    };

    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let Some(first) = first else {
            return;
        };
        if tx.send(first).await.is_err() {
            debug!("client disconnected before the first chunk");
            return;
        }

        loop {
            tokio::select! {
                // Observed even while the stream waits on the model
                _ = tx.closed() => {
                    debug!("client disconnected, stopping the stream");
                    break;
                }
                item = stream.next() => match item {
                    Some(Ok(chunk)) => {
                        if tx.send(chunk).await.is_err() {
                            debug!("client disconnected, stopping the stream");
                            break;
                        }
                    }
                    Some(Err(err)) => {
                        error!(error = %err, "stream failed after the response started");
                        break;
                    }
                    None => break,
                },
            }
        }
    });

    Ok(TextStreamResponse::new(ReceiverStream::new(rx)))
}

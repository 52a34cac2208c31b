use super::base::{Provider, TextStream};
use super::configs::OllamaProviderConfig;
use super::errors::ProviderError;
use super::utils::{create_request, openai_response_to_text, parse_stream_line, LineBuffer, StreamLine};
use crate::models::message::Message;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;

pub const OLLAMA_HOST: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "mistrallite";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// Limit for a whole non-streaming completion
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(600);
/// Longest pause allowed between two chunks of a streamed completion
const STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

pub struct OllamaProvider {
    client: Client,
    config: OllamaProviderConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaProviderConfig) -> Result<Self, ProviderError> {
        // Streams may run for as long as the model keeps talking, so only the connection
        // and the gaps between chunks are bounded
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;

        Ok(Self { client, config })
    }

    async fn post(
        &self,
        payload: &Value,
        timeout: Option<Duration>,
    ) -> Result<Response, ProviderError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let mut request = self.client.post(&url).json(payload);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;

        match response.status() {
            StatusCode::OK => Ok(response),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(ProviderError::ServerError {
                    status: status.as_u16(),
                })
            }
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(ProviderError::RequestFailed {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn complete(
        &self,
        messages: &[Message],
        stop: &[String],
    ) -> Result<String, ProviderError> {
        let payload = create_request(&self.config, messages, stop, false);
        let response: Value = self
            .post(&payload, Some(COMPLETION_TIMEOUT))
            .await?
            .json()
            .await?;
        openai_response_to_text(&response)
    }

    async fn stream(
        &self,
        messages: &[Message],
        stop: &[String],
    ) -> Result<TextStream, ProviderError> {
        let payload = create_request(&self.config, messages, stop, true);
        let body = self.post(&payload, None).await?.bytes_stream();
        Ok(Box::pin(sse_deltas(body, STREAM_IDLE_TIMEOUT)))
    }
}

/// Decode an SSE completion body into its text deltas, failing if the body goes quiet for
/// longer than `idle_timeout`
fn sse_deltas<S>(
    body: S,
    idle_timeout: Duration,
) -> impl Stream<Item = Result<String, ProviderError>> + Send
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    async_stream::try_stream! {
        let mut body = Box::pin(body);
        let mut lines = LineBuffer::default();
        'read: loop {
            let chunk = match timeout(idle_timeout, body.next()).await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break 'read,
                Err(_) => Err(ProviderError::Timeout(idle_timeout))?,
            };
            for line in lines.push(&chunk?) {
                match parse_stream_line(&line)? {
                    StreamLine::Delta(delta) => {
                        yield delta;
                    }
                    StreamLine::Done => break 'read,
                    StreamLine::Skip => {}
                }
            }
        }
        // A final event without a trailing newline
        if let Some(line) = lines.finish() {
            if let StreamLine::Delta(delta) = parse_stream_line(&line)? {
                yield delta;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> OllamaProviderConfig {
        OllamaProviderConfig {
            host: server.uri(),
            model: OLLAMA_MODEL.to_string(),
            temperature: Some(0.0),
            max_tokens: None,
        }
    }

    async fn _setup_mock_server(response: ResponseTemplate) -> (MockServer, OllamaProvider) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        let provider = OllamaProvider::new(config_for(&mock_server)).unwrap();
        (mock_server, provider)
    }

    fn sse_body(deltas: &[&str]) -> String {
        let mut body = String::new();
        for delta in deltas {
            let chunk = json!({
                "id": "chatcmpl-1",
                "object": "chat.completion.chunk",
                "choices": [{"index": 0, "delta": {"role": "assistant", "content": delta}}]
            });
            body.push_str(&format!("data: {}\n\n", chunk));
        }
        body.push_str("data: [DONE]\n\n");
        body
    }

    #[tokio::test]
    async fn test_complete_basic() -> anyhow::Result<()> {
        let response_body = json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Hello! How can I assist you today?"
                },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 12,
                "completion_tokens": 15,
                "total_tokens": 27
            }
        });

        let (_, provider) =
            _setup_mock_server(ResponseTemplate::new(200).set_body_json(response_body)).await;

        let messages = vec![Message::user().with_text("Hello?")];
        let text = provider.complete(&messages, &[]).await?;

        assert_eq!(text, "Hello! How can I assist you today?");
        Ok(())
    }

    #[tokio::test]
    async fn test_complete_sends_model_and_stop() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "model": OLLAMA_MODEL,
                "stream": false,
                "stop": ["Observation:"],
                "messages": [{"role": "user", "content": "2+2?"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Final Answer: 4"}}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = OllamaProvider::new(config_for(&mock_server))?;
        let text = provider
            .complete(
                &[Message::user().with_text("2+2?")],
                &["Observation:".to_string()],
            )
            .await?;
        assert_eq!(text, "Final Answer: 4");
        Ok(())
    }

    #[tokio::test]
    async fn test_stream_deltas() -> anyhow::Result<()> {
        let (_, provider) = _setup_mock_server(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body(&["Hel", "lo", " there"])),
        )
        .await;

        let stream = provider
            .stream(&[Message::user().with_text("Hi")], &[])
            .await?;
        let deltas: Vec<String> = stream.try_collect().await?;

        assert_eq!(deltas, vec!["Hel", "lo", " there"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_stream_stops_at_done() -> anyhow::Result<()> {
        let mut body = sse_body(&["one"]);
        body.push_str("data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\n");
        let (_, provider) =
            _setup_mock_server(ResponseTemplate::new(200).set_body_string(body)).await;

        let deltas: Vec<String> = provider
            .stream(&[Message::user().with_text("Hi")], &[])
            .await?
            .try_collect()
            .await?;
        assert_eq!(deltas, vec!["one"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_server_error() -> anyhow::Result<()> {
        let (_, provider) = _setup_mock_server(ResponseTemplate::new(500)).await;

        let messages = vec![Message::user().with_text("Hello?")];
        let result = provider.complete(&messages, &[]).await;

        let err = result.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("Server error: 500"));
        Ok(())
    }

    #[tokio::test]
    async fn test_request_failed_carries_status() -> anyhow::Result<()> {
        let (_, provider) = _setup_mock_server(
            ResponseTemplate::new(404).set_body_string("model \"mistrallite\" not found"),
        )
        .await;

        let err = match provider.stream(&[Message::user().with_text("Hi")], &[]).await {
            Ok(_) => panic!("Expected the stream to fail"),
            Err(err) => err,
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("not found"));
        Ok(())
    }

    #[tokio::test]
    async fn test_complete_non_json_body_is_invalid_response() -> anyhow::Result<()> {
        let (_, provider) =
            _setup_mock_server(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
                .await;

        let err = provider
            .complete(&[Message::user().with_text("Hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
        assert_eq!(err.status(), None);
        Ok(())
    }

    fn delta_event(delta: &str) -> Bytes {
        let chunk = json!({"choices": [{"delta": {"content": delta}}]});
        Bytes::from(format!("data: {}\n\n", chunk))
    }

    #[tokio::test]
    async fn test_slow_stream_outlives_idle_timeout() -> anyhow::Result<()> {
        // Each gap is under the limit while the whole body takes longer than it
        let body = async_stream::stream! {
            for delta in ["a", "b", "c", "d"] {
                tokio::time::sleep(Duration::from_millis(60)).await;
                yield reqwest::Result::Ok(delta_event(delta));
            }
        };

        let deltas: Vec<String> = sse_deltas(body, Duration::from_millis(150))
            .try_collect()
            .await?;
        assert_eq!(deltas, vec!["a", "b", "c", "d"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_stalled_stream_times_out() {
        let body = futures::stream::iter(vec![reqwest::Result::Ok(delta_event("partial"))])
            .chain(futures::stream::pending());

        let mut deltas = Box::pin(sse_deltas(body, Duration::from_millis(50)));
        assert_eq!(deltas.next().await.unwrap().unwrap(), "partial");

        let err = deltas.next().await.unwrap().unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_unreachable_host() -> anyhow::Result<()> {
        let provider = OllamaProvider::new(OllamaProviderConfig {
            host: "http://127.0.0.1:1".to_string(),
            model: OLLAMA_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
        })?;

        let err = provider
            .complete(&[Message::user().with_text("Hi")], &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
        assert_eq!(err.status(), None);
        Ok(())
    }
}

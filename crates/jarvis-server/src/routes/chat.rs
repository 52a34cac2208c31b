use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use jarvis::adapter::Conversation;
use jarvis::models::message::ChatTurn;
use serde::Deserialize;
use tracing::info;

use super::response::{stream_response, ApiError, TextStreamResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ChatRequest {
    messages: Vec<ChatTurn>,
}

async fn handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<TextStreamResponse, ApiError> {
    let Json(request) = payload?;
    let conversation = Conversation::from_turns(&request.messages);
    info!(turns = request.messages.len(), "chat request");

    let stream = state.chat().stream(&conversation).await?;
    stream_response(stream).await
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{app, body_text, post_json};
    use axum::http::StatusCode;
    use jarvis::providers::mock::MockProvider;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_chat_streams_answer() {
        let provider = MockProvider::new(vec!["Hello! I am Jarvis."]);
        let response = post_json(
            app(&provider),
            "/chat",
            json!({"messages": [{"role": "user", "content": "Hi"}]}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Hello! I am Jarvis.");

        let requests = provider.requests();
        let prompt = &requests[0][0].content;
        assert!(prompt.contains("User: Hi"));
    }

    #[tokio::test]
    async fn test_chat_prompt_carries_history() {
        let provider = MockProvider::new(vec!["Tony."]);
        let response = post_json(
            app(&provider),
            "/chat",
            json!({"messages": [
                {"role": "user", "content": "I'm Tony"},
                {"role": "assistant", "content": "Hi Tony"},
                {"role": "function", "content": "hidden", "name": "lookup"},
                {"role": "user", "content": "Who am I?"}
            ]}),
        )
        .await;
        assert_eq!(body_text(response).await, "Tony.");

        let requests = provider.requests();
        let prompt = &requests[0][0].content;
        assert!(prompt.contains("user: I'm Tony\nassistant: Hi Tony"));
        assert!(!prompt.contains("hidden"));
    }

    #[tokio::test]
    async fn test_empty_messages_is_bad_request() {
        let provider = MockProvider::new(vec!["unused"]);
        let response = post_json(app(&provider), "/chat", json!({"messages": []})).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            body["error"],
            "Invalid input: no current message to answer"
        );
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let provider = MockProvider::default();
        let response = post_json(app(&provider), "/chat", json!({"messages": "hello"})).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_model_failure_is_json_error() {
        let provider = MockProvider::failing(503);
        let response = post_json(
            app(&provider),
            "/chat",
            json!({"messages": [{"role": "user", "content": "Hi"}]}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body["error"].as_str().unwrap().contains("503"));
    }
}

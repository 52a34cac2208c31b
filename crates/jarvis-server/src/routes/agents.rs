use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use futures::stream::StreamExt;
use jarvis::adapter::Conversation;
use jarvis::models::message::ChatTurn;
use jarvis::streaming::filter_final_answer;
use serde::Deserialize;
use tracing::info;

use super::response::{stream_response, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct AgentRequest {
    messages: Vec<ChatTurn>,
    /// Answer with the whole run as JSON instead of streaming the answer. Absent or
    /// null streams.
    #[serde(default)]
    show_intermediate_steps: Option<bool>,
}

async fn handler(
    State(state): State<AppState>,
    payload: Result<Json<AgentRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let conversation = Conversation::from_turns(&request.messages);
    let input = conversation.current_input()?.to_string();
    let history = conversation.history().to_vec();
    let trace = request.show_intermediate_steps.unwrap_or(false);
    info!(turns = request.messages.len(), trace, "agent request");

    let agent = state.agent();
    if trace {
        let output = agent.invoke(history, input).await?;
        info!(steps = output.intermediate_steps.len(), "agent answered");
        return Ok(Json(output).into_response());
    }

    let answer = filter_final_answer(agent.stream(history, input)).boxed();
    Ok(stream_response(answer).await?.into_response())
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat/agents", post(handler))
        .with_state(state)
}

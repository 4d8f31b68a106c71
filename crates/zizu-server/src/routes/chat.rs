use axum::extract::State;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use zizu_gateway::{GenMessage, GenRequest};
use zizu_schema::{interpret, ChatTask, Turn};

use crate::error::ApiError;
use crate::state::AppState;

/// Response header carrying the effective session id, so a widget that did
/// not send one can keep the conversation going.
pub const SESSION_HEADER: &str = "x-zizu-session";

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub task: ChatTask,
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/chat", post(chat))
        .route("/handoff", post(handoff))
}

async fn health() -> &'static str {
    "OK"
}

/// Placeholder for a future CRM integration.
async fn handoff() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Response, ApiError> {
    let message = body.message.as_deref().map(str::trim).unwrap_or_default();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message is required".into()));
    }

    let session_id = body
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let history = state.store.history(&session_id).await;
    tracing::debug!(
        session = %session_id,
        task = body.task.as_str(),
        prior_turns = history.len(),
        "chat request"
    );

    let raw = state
        .generator
        .generate(GenRequest {
            task: body.task,
            history: flatten_history(&history),
            message: message.to_owned(),
            language_hint: body.language,
        })
        .await?;

    let reply = interpret(&raw, body.task)?;
    state.store.append_turn(&session_id, message, reply.clone()).await;

    let mut response = Json(reply).into_response();
    if let Ok(value) = HeaderValue::from_str(&session_id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    Ok(response)
}

/// Prior turns become alternating user/assistant context messages; the
/// assistant side is the structured reply re-serialized, which is exactly
/// what the model produced for that turn.
fn flatten_history(history: &[Turn]) -> Vec<GenMessage> {
    let mut messages = Vec::with_capacity(history.len() * 2);
    for turn in history {
        messages.push(GenMessage::user(&turn.user));
        messages.push(GenMessage::assistant(
            serde_json::to_string(&turn.bot).unwrap_or_default(),
        ));
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn chat_body_defaults_task_to_consult() {
        let body: ChatBody = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(body.task, ChatTask::Consult);
        assert!(body.session_id.is_none());
    }

    #[test]
    fn chat_body_accepts_camel_case_session_id() {
        let body: ChatBody =
            serde_json::from_str(r#"{"message":"hi","sessionId":"s1","task":"classify"}"#).unwrap();
        assert_eq!(body.session_id.as_deref(), Some("s1"));
        assert_eq!(body.task, ChatTask::Classify);
    }

    #[test]
    fn flatten_history_alternates_roles() {
        let bot = serde_json::from_value(serde_json::json!({
            "task": "consult",
            "language": "en",
            "need_tools": false,
            "consult": {}
        }))
        .unwrap();
        let history = vec![Turn {
            user: "hello".into(),
            bot,
            at: Utc::now(),
        }];
        let flat = flatten_history(&history);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].role, "user");
        assert_eq!(flat[1].role, "assistant");
        assert!(flat[1].content.contains("\"task\":\"consult\""));
    }
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use zizu_gateway::GatewayError;
use zizu_schema::InterpretError;

/// Everything a handler can fail with, mapped onto the wire taxonomy.
///
/// Handler panics aside, any error ends up here and becomes a JSON body of
/// the form `{"error": <code>, ...}`; the process stays alive.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("missing contact fields")]
    MissingContactFields,
    #[error("model output failed interpretation")]
    InvalidModelOutput { raw: String },
    #[error("text-generation gateway timed out")]
    GatewayTimeout,
    #[error("lead {lead_id} recorded but notification failed: {reason}")]
    NotificationFailed { lead_id: i64, reason: String },
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(details) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "bad_request", "details": details}),
            ),
            ApiError::MissingContactFields => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "missing_contact_fields",
                    "details": "name, email and phone are required"
                }),
            ),
            ApiError::InvalidModelOutput { raw } => (
                StatusCode::BAD_GATEWAY,
                json!({"error": "invalid_model_output", "raw": raw}),
            ),
            ApiError::GatewayTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                json!({"error": "gateway_timeout"}),
            ),
            ApiError::NotificationFailed { lead_id, reason } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "notification_failed",
                    "leadId": lead_id,
                    "details": reason
                }),
            ),
            ApiError::Internal(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "server_error", "details": details}),
            ),
        };
        if status.is_server_error() {
            tracing::error!(%status, "request failed: {}", body["error"]);
        }
        (status, Json(body)).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Timeout(_) => ApiError::GatewayTimeout,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<InterpretError> for ApiError {
    fn from(err: InterpretError) -> Self {
        tracing::warn!("rejecting model output: {}", err.reason);
        ApiError::InvalidModelOutput { raw: err.raw }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_timeout_maps_to_504() {
        let err: ApiError = GatewayError::Timeout(30).into();
        assert!(matches!(err, ApiError::GatewayTimeout));
    }

    #[test]
    fn other_gateway_failures_map_to_server_error() {
        let err: ApiError = GatewayError::Api {
            status: 500,
            message: "upstream broke".into(),
        }
        .into();
        match err {
            ApiError::Internal(details) => assert!(details.contains("upstream broke")),
            other => panic!("expected Internal, got {other:?}"),
        }
    }

    #[test]
    fn interpret_error_keeps_raw_text() {
        let err: ApiError = InterpretError {
            raw: "not json".into(),
            reason: "expected value".into(),
        }
        .into();
        match err {
            ApiError::InvalidModelOutput { raw } => assert_eq!(raw, "not json"),
            other => panic!("expected InvalidModelOutput, got {other:?}"),
        }
    }
}

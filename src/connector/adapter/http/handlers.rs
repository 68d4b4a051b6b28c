use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::application::{RelayChatInput, RelayChatUseCase};
use crate::domain::{DomainError, ErrorKind};

pub const HEALTH_MESSAGE: &str = "Chat proxy is running";

/// Shared handler state. Immutable; every request is independent.
#[derive(Clone)]
pub struct RelayState {
    pub use_case: Arc<RelayChatUseCase>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub message: String,
}

/// `POST /chat` body. Fields are optional here so that validation errors
/// come from the use case rather than from the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequestBody {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, alias = "systemPrompt")]
    pub system_prompt: Option<String>,
}

impl From<ChatRequestBody> for RelayChatInput {
    fn from(body: ChatRequestBody) -> Self {
        RelayChatInput {
            prompt: body.prompt,
            model: body.model,
            system_prompt: body.system_prompt,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponseBody {
    pub response: String,
}

/// JSON error reply: `{"error": message}` with a status derived from the
/// error kind.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = match (&err, err.kind()) {
            (_, ErrorKind::Validation) => StatusCode::BAD_REQUEST,
            (_, ErrorKind::Configuration) => StatusCode::SERVICE_UNAVAILABLE,
            (_, ErrorKind::UpstreamNotFound) => StatusCode::NOT_FOUND,
            (_, ErrorKind::UpstreamUnreachable) | (_, ErrorKind::TransportFailure) => {
                StatusCode::BAD_GATEWAY
            }
            (DomainError::UpstreamStatus { status, .. }, _) => passthrough_status(*status),
            _ => {
                error!("Relay failed internally: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        Self {
            status,
            message: err.user_message(),
        }
    }
}

/// Upstream error statuses are relayed as-is; anything that is not a valid
/// error status becomes 502.
fn passthrough_status(status: u16) -> StatusCode {
    match StatusCode::from_u16(status) {
        Ok(code) if code.is_client_error() || code.is_server_error() => code,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        message: HEALTH_MESSAGE.to_string(),
    })
}

pub async fn chat_handler(
    State(state): State<RelayState>,
    body: Bytes,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let input = match serde_json::from_slice::<ChatRequestBody>(&body) {
        Ok(parsed) => RelayChatInput::from(parsed),
        Err(e) => {
            debug!("Unparseable chat body: {}", e);
            RelayChatInput::default()
        }
    };

    let response = state.use_case.execute(input).await?;
    Ok(Json(ChatResponseBody { response }))
}

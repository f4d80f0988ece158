use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use gatewire_provider::{ChatRequest, Message};
use gatewire_router::{GatewayError, Router};

/// The client-facing request envelope: `{ model, messages, tools? }`. The
/// caller's token carries `client_id` implicitly via the `Authorization`
/// header rather than a body field.
#[derive(Debug, Deserialize)]
pub struct ChatEnvelope {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(default)]
    pub tools: Option<Vec<gatewire_toolcall::Tool>>,
}

#[derive(Debug, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
    retryable: bool,
}

pub async fn chat(
    State(router): State<Arc<Router>>,
    headers: HeaderMap,
    Json(envelope): Json<ChatEnvelope>,
) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return gateway_error_response(GatewayError::AuthError);
    };

    let req = ChatRequest {
        model: envelope.model,
        messages: envelope
            .messages
            .into_iter()
            .map(|m| Message { role: m.role, content: m.content })
            .collect(),
        tools: envelope.tools,
        provider_hint: None,
        stream: false,
    };

    match router.route(&token, req).await {
        Ok(response) => Json(response_envelope(response)).into_response(),
        Err(err) => gateway_error_response(err),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    raw.strip_prefix("Bearer ").map(str::to_string)
}

fn response_envelope(response: gatewire_provider::ChatResponse) -> serde_json::Value {
    serde_json::json!({
        "content": response.content,
        "model": response.model,
        "usage": {
            "prompt": response.usage.prompt,
            "completion": response.usage.completion,
            "total": response.usage.total,
        },
        "finish_reason": response.finish_reason,
        "tool_calls": response.tool_calls,
    })
}

fn gateway_error_response(err: GatewayError) -> Response {
    let status = match &err {
        GatewayError::ValidationError(_) => StatusCode::BAD_REQUEST,
        GatewayError::AuthError => StatusCode::UNAUTHORIZED,
        GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        GatewayError::NoCredentials => StatusCode::SERVICE_UNAVAILABLE,
        GatewayError::UpstreamError { .. } => StatusCode::BAD_GATEWAY,
        GatewayError::TransportError(_) => StatusCode::BAD_GATEWAY,
        GatewayError::ToolParseError => StatusCode::OK,
        GatewayError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        GatewayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
    };
    let body = ErrorEnvelope {
        error: ErrorBody {
            kind: err.kind(),
            message: err.to_string(),
            retryable: err.retryable(),
        },
    };
    (status, Json(body)).into_response()
}

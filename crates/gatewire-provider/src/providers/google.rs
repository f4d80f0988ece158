use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};

use gatewire_toolcall::ToolCallFormat;
use gatewire_toolcall::parsers;

use crate::auth::inject;
use crate::client::{map_transport_error, shared_client};
use crate::context::RequestContext;
use crate::error::ProviderError;
use crate::provider::UpstreamProvider;
use crate::types::{ChatRequest, ChatResponse, Usage};

/// `POST {base_url}/v1beta/models/{model}:generateContent`. Google's
/// `contents`/`parts` shape, `model` role instead of `assistant`, and
/// function calls nested under `functionCall` rather than a flat array.
pub struct GoogleProvider {
    base_url: String,
    auth_method: String,
    auth_header: Option<String>,
}

impl GoogleProvider {
    pub fn new(base_url: impl Into<String>, auth_method: impl Into<String>, auth_header: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_method: auth_method.into(),
            auth_header,
        }
    }
}

fn to_google_role(role: &str) -> &str {
    match role {
        "assistant" => "model",
        other => other,
    }
}

#[async_trait]
impl UpstreamProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn chat_completion(
        &self,
        ctx: &RequestContext,
        credential: &str,
        req: ChatRequest,
    ) -> Result<ChatResponse, ProviderError> {
        let client = shared_client(ctx.proxy.as_deref())?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            req.model
        );

        let contents: Vec<JsonValue> = req
            .messages
            .iter()
            .map(|m| json!({"role": to_google_role(&m.role), "parts": [{"text": m.content}]}))
            .collect();
        let mut body = json!({ "contents": contents });
        if let Some(tools) = &req.tools {
            let declarations: Vec<JsonValue> = tools.iter().map(gatewire_toolcall::translate::to_google).collect();
            body["tools"] = json!([{ "functionDeclarations": declarations }]);
        }

        let builder = client.post(&url).timeout(ctx.timeout).json(&body);
        let builder = inject(builder, &self.auth_method, self.auth_header.as_deref(), credential);

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(map_transport_error)?;

        if !(200..300).contains(&status) {
            return Err(ProviderError::Upstream {
                status,
                body_excerpt: text.chars().take(256).collect(),
            });
        }

        let parsed: JsonValue = serde_json::from_str(&text)
            .map_err(|err| ProviderError::Transport(format!("invalid JSON response: {err}")))?;

        let candidate = parsed.get("candidates").and_then(|c| c.get(0));
        let content = candidate
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(JsonValue::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(JsonValue::as_str))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        let finish_reason = candidate
            .and_then(|c| c.get("finishReason"))
            .and_then(JsonValue::as_str)
            .unwrap_or("STOP")
            .to_string();
        let usage = parsed
            .get("usageMetadata")
            .map(|u| Usage {
                prompt: u.get("promptTokenCount").and_then(JsonValue::as_i64).unwrap_or(0),
                completion: u.get("candidatesTokenCount").and_then(JsonValue::as_i64).unwrap_or(0),
                total: u.get("totalTokenCount").and_then(JsonValue::as_i64).unwrap_or(0),
            })
            .unwrap_or_default();
        let tool_calls = parsers::parse_as(ToolCallFormat::Google, &text)
            .ok()
            .filter(|calls| !calls.is_empty());

        Ok(ChatResponse {
            content,
            model: req.model,
            usage,
            finish_reason,
            tool_calls,
        })
    }
}

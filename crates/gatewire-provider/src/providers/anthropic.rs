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

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// `POST {base_url}/v1/messages`. Anthropic's own wire shape: content
/// blocks instead of a single string, `input_tokens`/`output_tokens`
/// instead of `prompt_tokens`/`completion_tokens`, tool calls as
/// `tool_use` blocks rather than a separate array.
pub struct AnthropicProvider {
    base_url: String,
    auth_method: String,
    auth_header: Option<String>,
}

impl AnthropicProvider {
    pub fn new(base_url: impl Into<String>, auth_method: impl Into<String>, auth_header: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_method: auth_method.into(),
            auth_header,
        }
    }
}

#[async_trait]
impl UpstreamProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn chat_completion(
        &self,
        ctx: &RequestContext,
        credential: &str,
        req: ChatRequest,
    ) -> Result<ChatResponse, ProviderError> {
        let client = shared_client(ctx.proxy.as_deref())?;
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));

        let messages: Vec<JsonValue> = req
            .messages
            .iter()
            .map(|m| json!({"role": m.role, "content": m.content}))
            .collect();
        let mut body = json!({
            "model": req.model,
            "max_tokens": DEFAULT_MAX_TOKENS,
            "messages": messages,
        });
        if let Some(tools) = &req.tools {
            let tools_json: Vec<JsonValue> = tools.iter().map(gatewire_toolcall::translate::to_anthropic).collect();
            body["tools"] = JsonValue::Array(tools_json);
        }

        let builder = client
            .post(&url)
            .timeout(ctx.timeout)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);
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

        let content = parsed
            .get("content")
            .and_then(JsonValue::as_array)
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b.get("type").and_then(JsonValue::as_str) == Some("text"))
                    .filter_map(|b| b.get("text").and_then(JsonValue::as_str))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        let model = parsed.get("model").and_then(JsonValue::as_str).unwrap_or_default().to_string();
        let finish_reason = parsed
            .get("stop_reason")
            .and_then(JsonValue::as_str)
            .unwrap_or("end_turn")
            .to_string();
        let usage = parsed
            .get("usage")
            .map(|u| Usage {
                prompt: u.get("input_tokens").and_then(JsonValue::as_i64).unwrap_or(0),
                completion: u.get("output_tokens").and_then(JsonValue::as_i64).unwrap_or(0),
                total: u.get("input_tokens").and_then(JsonValue::as_i64).unwrap_or(0)
                    + u.get("output_tokens").and_then(JsonValue::as_i64).unwrap_or(0),
            })
            .unwrap_or_default();
        let tool_calls = parsers::parse_as(ToolCallFormat::Anthropic, &text)
            .ok()
            .filter(|calls| !calls.is_empty());

        Ok(ChatResponse {
            content,
            model,
            usage,
            finish_reason,
            tool_calls,
        })
    }
}

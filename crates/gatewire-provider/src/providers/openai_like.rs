use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};

use gatewire_toolcall::{ToolCallFormat, parsers};

use crate::auth::inject;
use crate::client::{map_transport_error, shared_client};
use crate::context::RequestContext;
use crate::error::ProviderError;
use crate::provider::UpstreamProvider;
use crate::types::{ChatRequest, ChatResponse, Usage};

/// How tool calls come back on the wire. OpenAI returns a native JSON
/// array; xAI and DeepSeek reuse OpenAI's chat-completions shape for
/// everything else but embed tool calls as XML inside the message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCallStyle {
    Json,
    EmbeddedXml(ToolCallFormat),
}

/// `POST {base_url}/v1/chat/completions`. Shared by every OpenAI-shaped
/// dialect; only the name, default base URL, and tool-call style differ.
pub struct OpenAiLikeProvider {
    name: &'static str,
    base_url: String,
    auth_method: String,
    auth_header: Option<String>,
    tool_call_style: ToolCallStyle,
}

impl OpenAiLikeProvider {
    pub fn new(
        name: &'static str,
        base_url: impl Into<String>,
        auth_method: impl Into<String>,
        auth_header: Option<String>,
        tool_call_style: ToolCallStyle,
    ) -> Self {
        Self {
            name,
            base_url: base_url.into(),
            auth_method: auth_method.into(),
            auth_header,
            tool_call_style,
        }
    }
}

#[async_trait]
impl UpstreamProvider for OpenAiLikeProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn chat_completion(
        &self,
        ctx: &RequestContext,
        credential: &str,
        req: ChatRequest,
    ) -> Result<ChatResponse, ProviderError> {
        let client = shared_client(ctx.proxy.as_deref())?;
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));

        let messages: Vec<JsonValue> = req
            .messages
            .iter()
            .map(|m| json!({"role": m.role, "content": m.content}))
            .collect();
        let mut body = json!({
            "model": req.model,
            "messages": messages,
        });
        if let Some(tools) = &req.tools {
            let tools_json: Vec<JsonValue> = tools.iter().map(gatewire_toolcall::translate::to_openai).collect();
            body["tools"] = JsonValue::Array(tools_json);
        }

        let builder = client.post(&url).timeout(ctx.timeout).json(&body);
        let builder = inject(builder, &self.auth_method, self.auth_header.as_deref(), credential);

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(map_transport_error)?;

        if !(200..300).contains(&status) {
            return Err(ProviderError::Upstream {
                status,
                body_excerpt: excerpt(&text),
            });
        }

        parse_response(&text, self.tool_call_style)
    }
}

fn parse_response(text: &str, style: ToolCallStyle) -> Result<ChatResponse, ProviderError> {
    let parsed: JsonValue = serde_json::from_str(text)
        .map_err(|err| ProviderError::Transport(format!("invalid JSON response: {err}")))?;

    let choice = parsed
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| ProviderError::Transport("response had no choices".to_string()))?;
    let message = choice.get("message").unwrap_or(&JsonValue::Null);
    let content = message
        .get("content")
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .to_string();
    let finish_reason = choice
        .get("finish_reason")
        .and_then(JsonValue::as_str)
        .unwrap_or("stop")
        .to_string();
    let model = parsed
        .get("model")
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .to_string();
    let usage = parsed
        .get("usage")
        .map(|u| Usage {
            prompt: u.get("prompt_tokens").and_then(JsonValue::as_i64).unwrap_or(0),
            completion: u.get("completion_tokens").and_then(JsonValue::as_i64).unwrap_or(0),
            total: u.get("total_tokens").and_then(JsonValue::as_i64).unwrap_or(0),
        })
        .unwrap_or_default();

    let tool_calls = match style {
        ToolCallStyle::Json => parsers::parse_as(ToolCallFormat::OpenAi, text).ok(),
        ToolCallStyle::EmbeddedXml(format) => parsers::parse_as(format, &content).ok(),
    }
    .filter(|calls: &Vec<_>| !calls.is_empty());

    Ok(ChatResponse {
        content,
        model,
        usage,
        finish_reason,
        tool_calls,
    })
}

fn excerpt(body: &str) -> String {
    body.chars().take(256).collect()
}

use super::openai_like::{OpenAiLikeProvider, ToolCallStyle};

pub fn build(base_url: impl Into<String>, auth_method: impl Into<String>, auth_header: Option<String>) -> OpenAiLikeProvider {
    OpenAiLikeProvider::new("openai", base_url, auth_method, auth_header, ToolCallStyle::Json)
}

use crate::provider::UpstreamProvider;
use crate::providers::{AnthropicProvider, GoogleProvider, build_deepseek, build_openai, build_xai};

/// Everything the registry needs to speak to one configured provider row.
/// Lifted straight from the fields the storage layer persists; this crate
/// has no dependency on the storage crate itself.
pub struct ProviderSpec<'a> {
    pub name: &'a str,
    pub base_url: &'a str,
    pub auth_method: &'a str,
    pub auth_header: Option<&'a str>,
}

/// The wire dialect a configured provider speaks. Nothing in the data
/// model records this directly: it is inferred from the provider's name,
/// defaulting to the OpenAI-compatible shape for anything unrecognized so
/// that adding a sixth OpenAI-shaped provider is a config entry, never new
/// code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Google,
    XAi,
    DeepSeek,
}

pub fn classify(provider_name: &str) -> ProviderKind {
    let lower = provider_name.to_ascii_lowercase();
    if lower.contains("anthropic") || lower.contains("claude") {
        ProviderKind::Anthropic
    } else if lower.contains("google") || lower.contains("gemini") {
        ProviderKind::Google
    } else if lower.contains("xai") || lower.contains("grok") {
        ProviderKind::XAi
    } else if lower.contains("deepseek") {
        ProviderKind::DeepSeek
    } else {
        ProviderKind::OpenAi
    }
}

pub fn build(spec: &ProviderSpec<'_>) -> Box<dyn UpstreamProvider> {
    let auth_header = spec.auth_header.map(str::to_string);
    match classify(spec.name) {
        ProviderKind::OpenAi => Box::new(build_openai(spec.base_url, spec.auth_method, auth_header)),
        ProviderKind::Anthropic => Box::new(AnthropicProvider::new(spec.base_url, spec.auth_method, auth_header)),
        ProviderKind::Google => Box::new(GoogleProvider::new(spec.base_url, spec.auth_method, auth_header)),
        ProviderKind::XAi => Box::new(build_xai(spec.base_url, spec.auth_method, auth_header)),
        ProviderKind::DeepSeek => Box::new(build_deepseek(spec.base_url, spec.auth_method, auth_header)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_names() {
        assert_eq!(classify("Anthropic"), ProviderKind::Anthropic);
        assert_eq!(classify("google-gemini"), ProviderKind::Google);
        assert_eq!(classify("xai-grok"), ProviderKind::XAi);
        assert_eq!(classify("deepseek-chat"), ProviderKind::DeepSeek);
    }

    #[test]
    fn unrecognized_name_defaults_to_openai_compatible() {
        assert_eq!(classify("my-custom-provider"), ProviderKind::OpenAi);
        assert_eq!(classify("together-ai"), ProviderKind::OpenAi);
    }
}

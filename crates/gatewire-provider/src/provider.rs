use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::ProviderError;
use crate::types::{ChatRequest, ChatResponse};

/// Single-provider HTTP speaker. One implementation per wire dialect, not
/// per concrete provider: an OpenAI-shaped provider is a config entry
/// (`base_url`, `auth_method`) against `OpenAiCompatibleProvider`, not new
/// code.
#[async_trait]
pub trait UpstreamProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn chat_completion(
        &self,
        ctx: &RequestContext,
        credential: &str,
        req: ChatRequest,
    ) -> Result<ChatResponse, ProviderError>;

    /// Releases any provider-held resources. Most implementations share the
    /// process-wide client and have nothing to do here.
    async fn close(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

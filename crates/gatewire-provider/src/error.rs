#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("upstream returned {status}: {body_excerpt}")]
    Upstream { status: u16, body_excerpt: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
}

impl ProviderError {
    /// Status codes the router treats as credential-poisoning: the key
    /// itself is rejected or throttled rather than the request being
    /// malformed.
    pub fn is_credential_poisoning(&self) -> bool {
        matches!(self, ProviderError::Upstream { status, .. } if matches!(status, 401 | 403 | 429))
    }
}

use gatewire_ratelimit::LimitDimension;

/// Wire-neutral error taxonomy returned from `Router::route`. Every variant
/// maps to one client-facing error envelope kind; none of them leak
/// implementation details (connection strings, stack traces) to the caller.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("validation error: {0}")]
    ValidationError(String),
    #[error("unknown or expired client token")]
    AuthError,
    #[error("rate limit exceeded: {dimension:?}")]
    RateLimited { dimension: LimitDimension },
    #[error("no eligible credential for provider")]
    NoCredentials,
    #[error("upstream returned {status}")]
    UpstreamError { status: u16 },
    #[error("transport error: {0}")]
    TransportError(String),
    #[error("tool-call response could not be parsed")]
    ToolParseError,
    #[error("catalog store error: {0}")]
    StoreError(#[from] gatewire_storage::StorageError),
    #[error("request canceled or timed out")]
    Timeout,
}

impl GatewayError {
    /// Whether the caller can usefully retry the exact same request without
    /// operator intervention. Mirrors the client-facing error envelope's
    /// `retryable` field (§6).
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::UpstreamError { .. } | GatewayError::TransportError(_) | GatewayError::Timeout
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::ValidationError(_) => "validation_error",
            GatewayError::AuthError => "auth_error",
            GatewayError::RateLimited { .. } => "rate_limited",
            GatewayError::NoCredentials => "no_credentials",
            GatewayError::UpstreamError { .. } => "upstream_error",
            GatewayError::TransportError(_) => "transport_error",
            GatewayError::ToolParseError => "tool_parse_error",
            GatewayError::StoreError(_) => "store_error",
            GatewayError::Timeout => "timeout",
        }
    }
}

impl From<gatewire_provider::ProviderError> for GatewayError {
    fn from(err: gatewire_provider::ProviderError) -> Self {
        match err {
            gatewire_provider::ProviderError::Upstream { status, .. } => GatewayError::UpstreamError { status },
            gatewire_provider::ProviderError::Transport(msg) => GatewayError::TransportError(msg),
            gatewire_provider::ProviderError::Timeout => GatewayError::Timeout,
        }
    }
}

impl From<gatewire_ratelimit::RateLimitError> for GatewayError {
    fn from(err: gatewire_ratelimit::RateLimitError) -> Self {
        match err {
            gatewire_ratelimit::RateLimitError::Denied(dimension) => GatewayError::RateLimited { dimension },
            gatewire_ratelimit::RateLimitError::Store(store_err) => GatewayError::StoreError(store_err),
        }
    }
}

impl From<gatewire_credential::AcquireError> for GatewayError {
    fn from(_: gatewire_credential::AcquireError) -> Self {
        GatewayError::NoCredentials
    }
}

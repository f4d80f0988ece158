pub mod auth;
pub mod client;
pub mod context;
pub mod error;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod types;

pub use client::{DEFAULT_PROBE_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, shared_client};
pub use context::RequestContext;
pub use error::ProviderError;
pub use provider::UpstreamProvider;
pub use registry::{ProviderKind, ProviderSpec, build as build_provider, classify as classify_provider};
pub use types::{ChatRequest, ChatResponse, Message, Usage};

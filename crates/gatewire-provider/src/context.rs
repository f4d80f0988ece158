use std::time::Duration;

use crate::client::DEFAULT_REQUEST_TIMEOUT;

/// Per-request context threaded from the router into the provider client.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub trace_id: String,
    pub timeout: Duration,
    pub proxy: Option<String>,
}

impl RequestContext {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            proxy: None,
        }
    }
}

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use crate::error::ProviderError;

/// Default per-request deadline when the caller sets none (§4.7/§5).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Default deadline for validator HEAD/GET probes.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

static CLIENTS: OnceLock<Mutex<HashMap<Option<String>, wreq::Client>>> = OnceLock::new();

/// One connection-pooled `wreq::Client` per distinct outbound proxy, built
/// once per process and shared by every provider implementation. Adding a
/// sixth OpenAI-shaped provider never needs a new client: it reuses this.
pub fn shared_client(proxy: Option<&str>) -> Result<wreq::Client, ProviderError> {
    let key = normalize_proxy(proxy);
    let cache = CLIENTS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = cache
        .lock()
        .map_err(|_| ProviderError::Transport("client cache lock poisoned".to_string()))?;
    if let Some(client) = guard.get(&key) {
        return Ok(client.clone());
    }
    let client = build_client(key.as_deref())?;
    guard.insert(key, client.clone());
    Ok(client)
}

fn build_client(proxy: Option<&str>) -> Result<wreq::Client, ProviderError> {
    let mut builder = wreq::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(DEFAULT_REQUEST_TIMEOUT);
    if let Some(proxy) = proxy {
        let proxy = wreq::Proxy::all(proxy).map_err(|err| ProviderError::Transport(err.to_string()))?;
        builder = builder.proxy(proxy);
    }
    builder.build().map_err(|err| ProviderError::Transport(err.to_string()))
}

fn normalize_proxy(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn map_transport_error(err: wreq::Error) -> ProviderError {
    if err.is_timeout() {
        return ProviderError::Timeout;
    }
    ProviderError::Transport(err.to_string())
}

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info_span, warn, Instrument};

use gatewire_credential::CredentialPool;
use gatewire_provider::{ProviderSpec, RequestContext};
use gatewire_provider::{ChatRequest, ChatResponse};
use gatewire_ratelimit::RateLimiter;
use gatewire_resolver::{ModelResolver, Resolution};
use gatewire_storage::{NewRequestLog, Storage};

use crate::catalog::Catalog;
use crate::error::GatewayError;

/// Bound on credential-poisoning fallback hops, per request. Prevents two
/// misconfigured routers from oscillating requests between each other.
const MAX_FALLBACK_HOPS: u8 = 1;

/// Ties together the catalog, credential pool, rate limiter and provider
/// clients into the single `Route` operation a client-facing surface calls.
/// A Router optionally wraps a `fallback`, tried once when the primary
/// provider's credential is poisoned by the upstream response.
pub struct Router {
    storage: Arc<dyn Storage>,
    catalog: Arc<Catalog>,
    credentials: Arc<CredentialPool>,
    rate_limiter: Arc<RateLimiter>,
    degrade_duration: Duration,
    fallback: Option<Arc<Router>>,
}

impl Router {
    pub fn new(
        storage: Arc<dyn Storage>,
        catalog: Arc<Catalog>,
        credentials: Arc<CredentialPool>,
        rate_limiter: Arc<RateLimiter>,
        degrade_duration: Duration,
    ) -> Self {
        Self {
            storage,
            catalog,
            credentials,
            rate_limiter,
            degrade_duration,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<Router>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub async fn route(&self, token: &str, req: ChatRequest) -> Result<ChatResponse, GatewayError> {
        self.route_with_hops(token, req, MAX_FALLBACK_HOPS).await
    }

    async fn route_with_hops(
        &self,
        token: &str,
        req: ChatRequest,
        remaining_hops: u8,
    ) -> Result<ChatResponse, GatewayError> {
        let trace_id = uuid::Uuid::new_v4().to_string();
        let start = Instant::now();

        let client = self
            .catalog
            .find_client_by_token(token)
            .await
            .ok_or(GatewayError::AuthError)?;

        let span = info_span!("route", trace_id = %trace_id, client_id = client.id, model = %req.model);
        async {
            if let Err(err) = self.storage.touch_client_last_seen(client.id, time::OffsetDateTime::now_utc()).await {
                warn!(error = %err, "failed to touch client last_seen_at");
            }

            let (concrete_model, provider) = self.resolve_target(&client, &req.model).await?;
            let model_id = self.catalog.find_model_id(provider.id, &concrete_model).await;

            self.rate_limiter.check_limits(client.id).await?;

            let result = self
                .dispatch(&trace_id, &provider, concrete_model.clone(), req.clone())
                .await;

            let latency_ms = start.elapsed().as_millis() as i64;
            match result {
                Ok((response, credential_id)) => {
                    self.credentials
                        .record_usage(provider.id, credential_id, 1, response.usage.total)
                        .await?;
                    self.rate_limiter.record_usage(client.id, 1, response.usage.total).await?;
                    self.append_log(
                        client.id,
                        &req.model,
                        model_id,
                        Some(credential_id),
                        "ok",
                        None,
                        None,
                        Some(response.usage.prompt),
                        Some(response.usage.completion),
                        latency_ms,
                        false,
                    )
                    .await;
                    Ok(response)
                }
                Err((gateway_err, credential_id)) => {
                    let is_poisoning = matches!(&gateway_err, GatewayError::UpstreamError { status }
                        if matches!(status, 401 | 403 | 429));

                    if is_poisoning && let Some(credential_id) = credential_id {
                        warn!(credential_id, provider = %provider.name, "degrading credential after poisoning response");
                        self.credentials.mark_degraded(credential_id, self.degrade_duration).await?;
                    }

                    if is_poisoning && remaining_hops > 0 && let Some(fallback) = &self.fallback {
                        return fallback
                            .route_with_hops(token, req, remaining_hops - 1)
                            .await;
                    }

                    let http_status = match &gateway_err {
                        GatewayError::UpstreamError { status } => Some(*status as i32),
                        _ => None,
                    };
                    self.append_log(
                        client.id,
                        &req.model,
                        model_id,
                        credential_id,
                        "error",
                        http_status,
                        Some(gateway_err.kind().to_string()),
                        None,
                        None,
                        latency_ms,
                        false,
                    )
                    .await;
                    Err(gateway_err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn resolve_target(
        &self,
        client: &gatewire_storage::snapshot::ClientRow,
        requested_model: &str,
    ) -> Result<(String, gatewire_storage::snapshot::ProviderRow), GatewayError> {
        let aliases = self.catalog.aliases_snapshot().await;
        let remap_rules = self.catalog.remap_rules_snapshot().await;
        let models = self.catalog.models_snapshot().await;
        let resolver = ModelResolver::new(&aliases, &remap_rules, &models);

        match resolver.resolve(Some(client.id), requested_model) {
            Resolution::Remapped { model_name, provider_id } => {
                let provider = self
                    .catalog
                    .find_provider(provider_id)
                    .await
                    .ok_or_else(|| GatewayError::ValidationError(format!("remap target provider {provider_id} does not exist")))?;
                Ok((model_name, provider))
            }
            Resolution::Unmapped { model_name } => {
                let priority = provider_priority(client);
                let provider = self
                    .catalog
                    .first_provider_hosting(&priority, &model_name)
                    .await
                    .ok_or_else(|| GatewayError::ValidationError("no provider available for unmapped model".to_string()))?;
                Ok((model_name, provider))
            }
        }
    }

    /// Selects a credential, injects it, and dispatches to the provider.
    /// Returns the credential id alongside both outcomes so the caller can
    /// degrade or bill the right key regardless of success.
    async fn dispatch(
        &self,
        trace_id: &str,
        provider: &gatewire_storage::snapshot::ProviderRow,
        concrete_model: String,
        mut req: ChatRequest,
    ) -> Result<(ChatResponse, i64), (GatewayError, Option<i64>)> {
        let (credential_id, plaintext) = self
            .credentials
            .get_actual_key(provider.id)
            .await
            .map_err(|err| (GatewayError::from(err), None))?;

        req.model = concrete_model;
        let spec = ProviderSpec {
            name: &provider.name,
            base_url: &provider.base_url,
            auth_method: &provider.auth_method,
            auth_header: provider.auth_header.as_deref(),
        };
        let upstream = gatewire_provider::build_provider(&spec);
        let ctx = RequestContext::new(trace_id.to_string());

        upstream
            .chat_completion(&ctx, &plaintext, req)
            .await
            .map(|response| (response, credential_id))
            .map_err(|err| (GatewayError::from(err), Some(credential_id)))
    }

    #[allow(clippy::too_many_arguments)]
    async fn append_log(
        &self,
        client_id: i64,
        requested_model: &str,
        resolved_model_id: Option<i64>,
        credential_id: Option<i64>,
        status: &str,
        http_status: Option<i32>,
        error_kind: Option<String>,
        input_tokens: Option<i64>,
        output_tokens: Option<i64>,
        latency_ms: i64,
        retried: bool,
    ) {
        let entry = NewRequestLog {
            client_id,
            requested_model: requested_model.to_string(),
            resolved_model_id,
            credential_id,
            status: status.to_string(),
            http_status,
            error_kind,
            input_tokens,
            output_tokens,
            latency_ms,
            retried,
        };
        if let Err(err) = self.storage.append_request_log(entry).await {
            warn!(error = %err, "failed to append request log");
        }
    }
}

fn provider_priority(client: &gatewire_storage::snapshot::ClientRow) -> Vec<String> {
    client
        .config_json
        .get("provider_priority")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::OffsetDateTime;

    fn client_with_config(config_json: serde_json::Value) -> gatewire_storage::snapshot::ClientRow {
        gatewire_storage::snapshot::ClientRow {
            id: 1,
            name: "test".to_string(),
            version: "1.0".to_string(),
            token: "tok".to_string(),
            capabilities_json: json!({}),
            config_json,
            created_at: OffsetDateTime::UNIX_EPOCH,
            last_seen_at: None,
        }
    }

    #[test]
    fn provider_priority_reads_ordered_names() {
        let client = client_with_config(json!({"provider_priority": ["openai", "anthropic"]}));
        assert_eq!(provider_priority(&client), vec!["openai".to_string(), "anthropic".to_string()]);
    }

    #[test]
    fn provider_priority_defaults_to_empty_when_absent() {
        let client = client_with_config(json!({}));
        assert!(provider_priority(&client).is_empty());
    }
}

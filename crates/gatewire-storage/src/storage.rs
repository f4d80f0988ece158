use async_trait::async_trait;
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

use gatewire_common::GlobalConfig;

use crate::snapshot::StorageSnapshot;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("db error: {0}")]
    Db(#[from] sea_orm::DbErr),
    #[error("serde json error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(&'static str),
}

#[derive(Debug, Clone)]
pub struct NewRequestLog {
    pub client_id: i64,
    pub requested_model: String,
    pub resolved_model_id: Option<i64>,
    pub credential_id: Option<i64>,
    pub status: String,
    pub http_status: Option<i32>,
    pub error_kind: Option<String>,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub latency_ms: i64,
    pub retried: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UsageAggregate {
    pub request_count: i64,
    pub input_tokens: i64,
    pub output_tokens: i64,
}

/// Storage is used for:
/// - bootstrap (`load_snapshot`)
/// - the few writes that must be durable immediately (credential
///   degradation, rate-limit counters, request logs, usage rollups)
/// - catalog mutation (providers/models/aliases/remap rules/clients)
///
/// Everything else on the request path reads from in-memory state seeded by
/// `load_snapshot` and kept current by each component's own cache.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Applies pending migrations, creating `schema_version` on first run.
    async fn migrate(&self) -> StorageResult<()>;

    async fn load_global_config(&self) -> StorageResult<Option<(i64, GlobalConfig, OffsetDateTime)>>;
    async fn upsert_global_config(&self, config: &GlobalConfig) -> StorageResult<()>;

    async fn load_snapshot(&self) -> StorageResult<StorageSnapshot>;

    // Providers
    async fn upsert_provider(
        &self,
        name: &str,
        base_url: &str,
        auth_method: &str,
        auth_header: Option<&str>,
        pricing_model: Option<&JsonValue>,
    ) -> StorageResult<i64>;
    async fn set_provider_status(
        &self,
        provider_id: i64,
        status: &str,
        last_error: Option<&str>,
    ) -> StorageResult<()>;
    async fn delete_provider(&self, provider_id: i64) -> StorageResult<()>;

    // Model families / models
    async fn upsert_model_family(&self, provider_id: i64, name: &str) -> StorageResult<i64>;
    async fn upsert_model(
        &self,
        family_id: i64,
        name: &str,
        context_window: Option<i64>,
        max_tokens: Option<i64>,
        capabilities: Option<&JsonValue>,
    ) -> StorageResult<i64>;
    async fn set_model_status(&self, model_id: i64, status: &str) -> StorageResult<()>;

    // Credentials
    async fn insert_credential(
        &self,
        provider_id: i64,
        key_hash: &str,
        key_prefix: Option<&str>,
        tier: Option<&str>,
        rpm_limit: Option<i64>,
        tpm_limit: Option<i64>,
        daily_limit: Option<i64>,
    ) -> StorageResult<i64>;
    async fn set_credential_active(&self, credential_id: i64, active: bool) -> StorageResult<()>;
    async fn set_credential_degraded(
        &self,
        credential_id: i64,
        degraded: bool,
        degraded_until: Option<OffsetDateTime>,
    ) -> StorageResult<()>;
    async fn increment_credential_usage(
        &self,
        credential_id: i64,
        requests_delta: i64,
        tokens_delta: i64,
    ) -> StorageResult<()>;
    async fn delete_credential(&self, credential_id: i64) -> StorageResult<()>;

    // Clients
    async fn upsert_client(
        &self,
        name: &str,
        version: &str,
        token: &str,
        capabilities_json: &JsonValue,
        config_json: &JsonValue,
    ) -> StorageResult<i64>;
    async fn touch_client_last_seen(&self, client_id: i64, at: OffsetDateTime) -> StorageResult<()>;
    async fn delete_client(&self, client_id: i64) -> StorageResult<()>;

    // Aliases
    async fn upsert_alias(
        &self,
        name: &str,
        model_id: i64,
        client_id: Option<i64>,
    ) -> StorageResult<i64>;
    async fn delete_alias(&self, alias_id: i64) -> StorageResult<()>;

    // Remap rules
    async fn upsert_remap_rule(
        &self,
        client_id: i64,
        from_model: &str,
        to_model: &str,
        to_provider: i64,
        priority: i64,
        enabled: bool,
    ) -> StorageResult<i64>;
    async fn delete_remap_rule(&self, remap_rule_id: i64) -> StorageResult<()>;

    // Client rate limits
    async fn get_client_rate_limit(
        &self,
        client_id: i64,
    ) -> StorageResult<Option<crate::snapshot::ClientRateLimitRow>>;
    async fn upsert_client_rate_limit(
        &self,
        client_id: i64,
        rpm_limit: Option<i64>,
        tpm_limit: Option<i64>,
        daily_limit: Option<i64>,
    ) -> StorageResult<i64>;
    async fn increment_client_usage(
        &self,
        client_id: i64,
        requests_delta: i64,
        tokens_delta: i64,
    ) -> StorageResult<()>;
    /// Resets every client's minute counters in one statement; called by the
    /// minute-tick loop rather than per-client.
    async fn reset_minute_counters(&self, now: OffsetDateTime) -> StorageResult<()>;
    /// Resets every client's daily counters in one statement; called by the
    /// daily-tick loop.
    async fn reset_daily_counters(&self, now: OffsetDateTime) -> StorageResult<()>;

    // Request logs / usage
    async fn append_request_log(&self, entry: NewRequestLog) -> StorageResult<()>;
    async fn delete_old_request_logs(&self, older_than: OffsetDateTime) -> StorageResult<u64>;
    async fn record_usage(
        &self,
        client_id: i64,
        model_id: i64,
        bucket_started_at: OffsetDateTime,
        input_tokens: i64,
        output_tokens: i64,
    ) -> StorageResult<()>;
    async fn aggregate_usage(
        &self,
        client_id: Option<i64>,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> StorageResult<UsageAggregate>;
}

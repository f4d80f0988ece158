use gatewire_common::GlobalConfig;
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

#[derive(Debug, Clone)]
pub struct GlobalConfigRow {
    pub id: i64,
    pub config: GlobalConfig,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct ProviderRow {
    pub id: i64,
    pub name: String,
    pub base_url: String,
    pub auth_method: String,
    pub auth_header: Option<String>,
    pub pricing_model: Option<JsonValue>,
    pub status: String,
    pub last_error: Option<String>,
    pub discovered_at: OffsetDateTime,
    pub last_validated: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct ModelFamilyRow {
    pub id: i64,
    pub provider_id: i64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ModelRow {
    pub id: i64,
    pub family_id: i64,
    pub name: String,
    pub context_window: Option<i64>,
    pub max_tokens: Option<i64>,
    pub status: String,
    pub cost_in_per_million: Option<f64>,
    pub cost_out_per_million: Option<f64>,
    pub cost_reasoning_per_million: Option<f64>,
    pub capabilities: Option<JsonValue>,
}

#[derive(Debug, Clone)]
pub struct CredentialRow {
    pub id: i64,
    pub provider_id: i64,
    pub key_hash: String,
    pub key_prefix: Option<String>,
    pub tier: Option<String>,
    pub rpm_limit: Option<i64>,
    pub tpm_limit: Option<i64>,
    pub daily_limit: Option<i64>,
    pub reset_interval_secs: Option<i64>,
    pub last_reset: OffsetDateTime,
    pub requests_count: i64,
    pub tokens_count: i64,
    pub active: bool,
    pub degraded: bool,
    pub degraded_until: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct ClientRow {
    pub id: i64,
    pub name: String,
    pub version: String,
    pub token: String,
    pub capabilities_json: JsonValue,
    pub config_json: JsonValue,
    pub created_at: OffsetDateTime,
    pub last_seen_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct AliasRow {
    pub id: i64,
    pub name: String,
    pub model_id: i64,
    pub client_id: Option<i64>,
    pub scope_key: String,
}

#[derive(Debug, Clone)]
pub struct RemapRuleRow {
    pub id: i64,
    pub client_id: i64,
    pub from_model: String,
    pub to_model: String,
    pub to_provider: i64,
    pub priority: i64,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct ClientRateLimitRow {
    pub id: i64,
    pub client_id: i64,
    pub rpm_limit: Option<i64>,
    pub tpm_limit: Option<i64>,
    pub daily_limit: Option<i64>,
    pub requests_this_minute: i64,
    pub tokens_this_minute: i64,
    pub requests_today: i64,
    pub window_started_at: OffsetDateTime,
    pub day_started_at: OffsetDateTime,
}

/// Everything the bootstrap path needs loaded into memory once at startup.
/// Nothing downstream of bootstrap reads the database directly on the
/// request path — the resolver, rate limiter, and credential pool all work
/// off caches seeded from this snapshot and kept warm by their own refresh
/// loops.
#[derive(Debug, Clone, Default)]
pub struct StorageSnapshot {
    pub global_config: Option<GlobalConfigRow>,
    pub providers: Vec<ProviderRow>,
    pub model_families: Vec<ModelFamilyRow>,
    pub models: Vec<ModelRow>,
    pub credentials: Vec<CredentialRow>,
    pub clients: Vec<ClientRow>,
    pub aliases: Vec<AliasRow>,
    pub remap_rules: Vec<RemapRuleRow>,
    pub client_rate_limits: Vec<ClientRateLimitRow>,
}

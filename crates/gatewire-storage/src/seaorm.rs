use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseBackend,
    DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, Statement,
};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

use gatewire_common::GlobalConfig;

use crate::entities;
use crate::migrations;
use crate::snapshot::{
    AliasRow, ClientRateLimitRow, ClientRow, CredentialRow, GlobalConfigRow, ModelFamilyRow,
    ModelRow, ProviderRow, RemapRuleRow, StorageSnapshot,
};
use crate::storage::{NewRequestLog, Storage, StorageResult, UsageAggregate};

#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
}

impl SeaOrmStorage {
    pub async fn connect(dsn: &str) -> StorageResult<Self> {
        let db = crate::db::connect_shared(dsn).await?;
        if db.get_database_backend() == DatabaseBackend::Sqlite {
            db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
        }
        Ok(Self { db })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Seeds the well-known default aliases (`sonnet`, `opus`, `haiku`,
    /// `gpt4`, `gemini`) and their backing providers/models, so a fresh
    /// catalog can resolve these names before any operator has registered
    /// real provider data. Every step goes through the same idempotent
    /// upsert paths the admin surface uses, so re-running this on an
    /// already-seeded catalog is a no-op.
    async fn seed_defaults(&self) -> StorageResult<()> {
        let anthropic = self
            .upsert_provider("anthropic", "https://api.anthropic.com", "header", Some("x-api-key"), None)
            .await?;
        let openai = self
            .upsert_provider("openai", "https://api.openai.com", "bearer", None, None)
            .await?;
        let google = self
            .upsert_provider("google", "https://generativelanguage.googleapis.com", "header", Some("x-goog-api-key"), None)
            .await?;

        let claude_family = self.upsert_model_family(anthropic, "claude").await?;
        let gpt_family = self.upsert_model_family(openai, "gpt").await?;
        let gemini_family = self.upsert_model_family(google, "gemini").await?;

        let sonnet = self.upsert_model(claude_family, "claude-sonnet-4-5-20250929", None, None, None).await?;
        let opus = self.upsert_model(claude_family, "claude-opus-4-1-20250805", None, None, None).await?;
        let haiku = self.upsert_model(claude_family, "claude-3-5-haiku-20241022", None, None, None).await?;
        let gpt4 = self.upsert_model(gpt_family, "gpt-4o", None, None, None).await?;
        let gemini = self.upsert_model(gemini_family, "gemini-2.0-flash", None, None, None).await?;

        self.upsert_alias("sonnet", sonnet, None).await?;
        self.upsert_alias("opus", opus, None).await?;
        self.upsert_alias("haiku", haiku, None).await?;
        self.upsert_alias("gpt4", gpt4, None).await?;
        self.upsert_alias("gemini", gemini, None).await?;

        Ok(())
    }
}

#[async_trait]
impl Storage for SeaOrmStorage {
    async fn migrate(&self) -> StorageResult<()> {
        migrations::run(&self.db).await?;
        self.seed_defaults().await
    }

    async fn load_global_config(
        &self,
    ) -> StorageResult<Option<(i64, GlobalConfig, OffsetDateTime)>> {
        use entities::global_config::Column;
        let row = entities::GlobalConfig::find()
            .order_by_asc(Column::Id)
            .one(&self.db)
            .await?;
        Ok(match row {
            Some(m) => {
                let config: GlobalConfig = serde_json::from_value(m.config_json)?;
                Some((m.id, config, m.updated_at))
            }
            None => None,
        })
    }

    async fn upsert_global_config(&self, config: &GlobalConfig) -> StorageResult<()> {
        use entities::global_config::ActiveModel as GlobalActive;

        let now = OffsetDateTime::now_utc();
        let id = 1_i64;
        let config_json = serde_json::to_value(config)?;
        let existing = entities::GlobalConfig::find_by_id(id).one(&self.db).await?;

        match existing {
            Some(model) => {
                let mut active: GlobalActive = model.into();
                active.config_json = ActiveValue::Set(config_json);
                active.updated_at = ActiveValue::Set(now);
                active.update(&self.db).await?;
            }
            None => {
                let active = GlobalActive {
                    id: ActiveValue::Set(id),
                    config_json: ActiveValue::Set(config_json),
                    updated_at: ActiveValue::Set(now),
                };
                entities::GlobalConfig::insert(active).exec(&self.db).await?;
            }
        }
        Ok(())
    }

    async fn load_snapshot(&self) -> StorageResult<StorageSnapshot> {
        let global_config = self
            .load_global_config()
            .await?
            .map(|(id, config, updated_at)| GlobalConfigRow {
                id,
                config,
                updated_at,
            });

        let providers = entities::Providers::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| ProviderRow {
                id: m.id,
                name: m.name,
                base_url: m.base_url,
                auth_method: m.auth_method,
                auth_header: m.auth_header,
                pricing_model: m.pricing_model,
                status: m.status,
                last_error: m.last_error,
                discovered_at: m.discovered_at,
                last_validated: m.last_validated,
            })
            .collect();

        let model_families = entities::ModelFamilies::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| ModelFamilyRow {
                id: m.id,
                provider_id: m.provider_id,
                name: m.name,
            })
            .collect();

        let models = entities::Models::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| ModelRow {
                id: m.id,
                family_id: m.family_id,
                name: m.name,
                context_window: m.context_window,
                max_tokens: m.max_tokens,
                status: m.status,
                cost_in_per_million: m.cost_in_per_million,
                cost_out_per_million: m.cost_out_per_million,
                cost_reasoning_per_million: m.cost_reasoning_per_million,
                capabilities: m.capabilities,
            })
            .collect();

        let credentials = entities::Credentials::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| CredentialRow {
                id: m.id,
                provider_id: m.provider_id,
                key_hash: m.key_hash,
                key_prefix: m.key_prefix,
                tier: m.tier,
                rpm_limit: m.rpm_limit,
                tpm_limit: m.tpm_limit,
                daily_limit: m.daily_limit,
                reset_interval_secs: m.reset_interval_secs,
                last_reset: m.last_reset,
                requests_count: m.requests_count,
                tokens_count: m.tokens_count,
                active: m.active,
                degraded: m.degraded,
                degraded_until: m.degraded_until,
                created_at: m.created_at,
            })
            .collect();

        let clients = entities::Clients::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| ClientRow {
                id: m.id,
                name: m.name,
                version: m.version,
                token: m.token,
                capabilities_json: m.capabilities_json,
                config_json: m.config_json,
                created_at: m.created_at,
                last_seen_at: m.last_seen_at,
            })
            .collect();

        let aliases = entities::Aliases::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| AliasRow {
                id: m.id,
                name: m.name,
                model_id: m.model_id,
                client_id: m.client_id,
                scope_key: m.scope_key,
            })
            .collect();

        let remap_rules = entities::RemapRules::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| RemapRuleRow {
                id: m.id,
                client_id: m.client_id,
                from_model: m.from_model,
                to_model: m.to_model,
                to_provider: m.to_provider,
                priority: m.priority,
                enabled: m.enabled,
            })
            .collect();

        let client_rate_limits = entities::ClientRateLimits::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| ClientRateLimitRow {
                id: m.id,
                client_id: m.client_id,
                rpm_limit: m.rpm_limit,
                tpm_limit: m.tpm_limit,
                daily_limit: m.daily_limit,
                requests_this_minute: m.requests_this_minute,
                tokens_this_minute: m.tokens_this_minute,
                requests_today: m.requests_today,
                window_started_at: m.window_started_at,
                day_started_at: m.day_started_at,
            })
            .collect();

        Ok(StorageSnapshot {
            global_config,
            providers,
            model_families,
            models,
            credentials,
            clients,
            aliases,
            remap_rules,
            client_rate_limits,
        })
    }

    async fn upsert_provider(
        &self,
        name: &str,
        base_url: &str,
        auth_method: &str,
        auth_header: Option<&str>,
        pricing_model: Option<&JsonValue>,
    ) -> StorageResult<i64> {
        use entities::providers::Column;

        let existing = entities::Providers::find()
            .filter(Column::Name.eq(name))
            .one(&self.db)
            .await?;
        let now = OffsetDateTime::now_utc();

        match existing {
            Some(model) => {
                let id = model.id;
                let mut active: entities::providers::ActiveModel = model.into();
                active.base_url = ActiveValue::Set(base_url.to_string());
                active.auth_method = ActiveValue::Set(auth_method.to_string());
                active.auth_header = ActiveValue::Set(auth_header.map(str::to_string));
                active.pricing_model = ActiveValue::Set(pricing_model.cloned());
                active.update(&self.db).await?;
                Ok(id)
            }
            None => {
                let active = entities::providers::ActiveModel {
                    id: ActiveValue::NotSet,
                    name: ActiveValue::Set(name.to_string()),
                    base_url: ActiveValue::Set(base_url.to_string()),
                    auth_method: ActiveValue::Set(auth_method.to_string()),
                    auth_header: ActiveValue::Set(auth_header.map(str::to_string)),
                    pricing_model: ActiveValue::Set(pricing_model.cloned()),
                    status: ActiveValue::Set("online".to_string()),
                    last_error: ActiveValue::Set(None),
                    discovered_at: ActiveValue::Set(now),
                    last_validated: ActiveValue::Set(None),
                };
                let res = entities::Providers::insert(active).exec(&self.db).await?;
                Ok(res.last_insert_id)
            }
        }
    }

    async fn set_provider_status(
        &self,
        provider_id: i64,
        status: &str,
        last_error: Option<&str>,
    ) -> StorageResult<()> {
        let model = entities::Providers::find_by_id(provider_id)
            .one(&self.db)
            .await?
            .ok_or(crate::storage::StorageError::NotFound("provider"))?;
        let mut active: entities::providers::ActiveModel = model.into();
        active.status = ActiveValue::Set(status.to_string());
        active.last_error = ActiveValue::Set(last_error.map(str::to_string));
        active.last_validated = ActiveValue::Set(Some(OffsetDateTime::now_utc()));
        active.update(&self.db).await?;
        Ok(())
    }

    async fn delete_provider(&self, provider_id: i64) -> StorageResult<()> {
        entities::Providers::delete_by_id(provider_id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn upsert_model_family(&self, provider_id: i64, name: &str) -> StorageResult<i64> {
        use entities::model_families::Column;
        let existing = entities::ModelFamilies::find()
            .filter(Column::ProviderId.eq(provider_id))
            .filter(Column::Name.eq(name))
            .one(&self.db)
            .await?;
        if let Some(m) = existing {
            return Ok(m.id);
        }
        let active = entities::model_families::ActiveModel {
            id: ActiveValue::NotSet,
            provider_id: ActiveValue::Set(provider_id),
            name: ActiveValue::Set(name.to_string()),
        };
        let res = entities::ModelFamilies::insert(active).exec(&self.db).await?;
        Ok(res.last_insert_id)
    }

    async fn upsert_model(
        &self,
        family_id: i64,
        name: &str,
        context_window: Option<i64>,
        max_tokens: Option<i64>,
        capabilities: Option<&JsonValue>,
    ) -> StorageResult<i64> {
        use entities::models::Column;
        let existing = entities::Models::find()
            .filter(Column::FamilyId.eq(family_id))
            .filter(Column::Name.eq(name))
            .one(&self.db)
            .await?;

        match existing {
            Some(model) => {
                let id = model.id;
                let mut active: entities::models::ActiveModel = model.into();
                active.context_window = ActiveValue::Set(context_window);
                active.max_tokens = ActiveValue::Set(max_tokens);
                active.capabilities = ActiveValue::Set(capabilities.cloned());
                active.update(&self.db).await?;
                Ok(id)
            }
            None => {
                let active = entities::models::ActiveModel {
                    id: ActiveValue::NotSet,
                    family_id: ActiveValue::Set(family_id),
                    name: ActiveValue::Set(name.to_string()),
                    context_window: ActiveValue::Set(context_window),
                    max_tokens: ActiveValue::Set(max_tokens),
                    status: ActiveValue::Set("online".to_string()),
                    cost_in_per_million: ActiveValue::Set(None),
                    cost_out_per_million: ActiveValue::Set(None),
                    cost_reasoning_per_million: ActiveValue::Set(None),
                    capabilities: ActiveValue::Set(capabilities.cloned()),
                };
                let res = entities::Models::insert(active).exec(&self.db).await?;
                Ok(res.last_insert_id)
            }
        }
    }

    async fn set_model_status(&self, model_id: i64, status: &str) -> StorageResult<()> {
        let model = entities::Models::find_by_id(model_id)
            .one(&self.db)
            .await?
            .ok_or(crate::storage::StorageError::NotFound("model"))?;
        let mut active: entities::models::ActiveModel = model.into();
        active.status = ActiveValue::Set(status.to_string());
        active.update(&self.db).await?;
        Ok(())
    }

    async fn insert_credential(
        &self,
        provider_id: i64,
        key_hash: &str,
        key_prefix: Option<&str>,
        tier: Option<&str>,
        rpm_limit: Option<i64>,
        tpm_limit: Option<i64>,
        daily_limit: Option<i64>,
    ) -> StorageResult<i64> {
        let now = OffsetDateTime::now_utc();
        let active = entities::credentials::ActiveModel {
            id: ActiveValue::NotSet,
            provider_id: ActiveValue::Set(provider_id),
            key_hash: ActiveValue::Set(key_hash.to_string()),
            key_prefix: ActiveValue::Set(key_prefix.map(str::to_string)),
            tier: ActiveValue::Set(tier.map(str::to_string)),
            rpm_limit: ActiveValue::Set(rpm_limit),
            tpm_limit: ActiveValue::Set(tpm_limit),
            daily_limit: ActiveValue::Set(daily_limit),
            reset_interval_secs: ActiveValue::Set(None),
            last_reset: ActiveValue::Set(now),
            requests_count: ActiveValue::Set(0),
            tokens_count: ActiveValue::Set(0),
            active: ActiveValue::Set(true),
            degraded: ActiveValue::Set(false),
            degraded_until: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
        };
        let res = entities::Credentials::insert(active).exec(&self.db).await?;
        Ok(res.last_insert_id)
    }

    async fn set_credential_active(&self, credential_id: i64, active_flag: bool) -> StorageResult<()> {
        let model = entities::Credentials::find_by_id(credential_id)
            .one(&self.db)
            .await?
            .ok_or(crate::storage::StorageError::NotFound("credential"))?;
        let mut active: entities::credentials::ActiveModel = model.into();
        active.active = ActiveValue::Set(active_flag);
        active.update(&self.db).await?;
        Ok(())
    }

    async fn set_credential_degraded(
        &self,
        credential_id: i64,
        degraded: bool,
        degraded_until: Option<OffsetDateTime>,
    ) -> StorageResult<()> {
        let model = entities::Credentials::find_by_id(credential_id)
            .one(&self.db)
            .await?
            .ok_or(crate::storage::StorageError::NotFound("credential"))?;
        let mut active: entities::credentials::ActiveModel = model.into();
        active.degraded = ActiveValue::Set(degraded);
        active.degraded_until = ActiveValue::Set(degraded_until);
        active.update(&self.db).await?;
        Ok(())
    }

    async fn increment_credential_usage(
        &self,
        credential_id: i64,
        requests_delta: i64,
        tokens_delta: i64,
    ) -> StorageResult<()> {
        let backend = self.db.get_database_backend();
        self.db
            .execute(Statement::from_sql_and_values(
                backend,
                "UPDATE credentials SET requests_count = requests_count + ?, \
                 tokens_count = tokens_count + ? WHERE id = ?",
                [requests_delta.into(), tokens_delta.into(), credential_id.into()],
            ))
            .await?;
        Ok(())
    }

    async fn delete_credential(&self, credential_id: i64) -> StorageResult<()> {
        entities::Credentials::delete_by_id(credential_id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn upsert_client(
        &self,
        name: &str,
        version: &str,
        token: &str,
        capabilities_json: &JsonValue,
        config_json: &JsonValue,
    ) -> StorageResult<i64> {
        use entities::clients::Column;
        let existing = entities::Clients::find()
            .filter(Column::Token.eq(token))
            .one(&self.db)
            .await?;
        let now = OffsetDateTime::now_utc();

        match existing {
            Some(model) => {
                let id = model.id;
                let mut active: entities::clients::ActiveModel = model.into();
                active.name = ActiveValue::Set(name.to_string());
                active.version = ActiveValue::Set(version.to_string());
                active.capabilities_json = ActiveValue::Set(capabilities_json.clone());
                active.config_json = ActiveValue::Set(config_json.clone());
                active.update(&self.db).await?;
                Ok(id)
            }
            None => {
                let active = entities::clients::ActiveModel {
                    id: ActiveValue::NotSet,
                    name: ActiveValue::Set(name.to_string()),
                    version: ActiveValue::Set(version.to_string()),
                    token: ActiveValue::Set(token.to_string()),
                    capabilities_json: ActiveValue::Set(capabilities_json.clone()),
                    config_json: ActiveValue::Set(config_json.clone()),
                    created_at: ActiveValue::Set(now),
                    last_seen_at: ActiveValue::Set(None),
                };
                let res = entities::Clients::insert(active).exec(&self.db).await?;
                Ok(res.last_insert_id)
            }
        }
    }

    async fn touch_client_last_seen(&self, client_id: i64, at: OffsetDateTime) -> StorageResult<()> {
        let backend = self.db.get_database_backend();
        self.db
            .execute(Statement::from_sql_and_values(
                backend,
                "UPDATE clients SET last_seen_at = ? WHERE id = ?",
                [at.into(), client_id.into()],
            ))
            .await?;
        Ok(())
    }

    async fn delete_client(&self, client_id: i64) -> StorageResult<()> {
        entities::Clients::delete_by_id(client_id).exec(&self.db).await?;
        Ok(())
    }

    async fn upsert_alias(
        &self,
        name: &str,
        model_id: i64,
        client_id: Option<i64>,
    ) -> StorageResult<i64> {
        use entities::aliases::Column;
        let scope_key = entities::aliases::scope_key(client_id);
        let existing = entities::Aliases::find()
            .filter(Column::Name.eq(name))
            .filter(Column::ScopeKey.eq(scope_key.clone()))
            .one(&self.db)
            .await?;

        match existing {
            Some(model) => {
                let id = model.id;
                let mut active: entities::aliases::ActiveModel = model.into();
                active.model_id = ActiveValue::Set(model_id);
                active.update(&self.db).await?;
                Ok(id)
            }
            None => {
                let active = entities::aliases::ActiveModel {
                    id: ActiveValue::NotSet,
                    name: ActiveValue::Set(name.to_string()),
                    model_id: ActiveValue::Set(model_id),
                    client_id: ActiveValue::Set(client_id),
                    scope_key: ActiveValue::Set(scope_key),
                };
                let res = entities::Aliases::insert(active).exec(&self.db).await?;
                Ok(res.last_insert_id)
            }
        }
    }

    async fn delete_alias(&self, alias_id: i64) -> StorageResult<()> {
        entities::Aliases::delete_by_id(alias_id).exec(&self.db).await?;
        Ok(())
    }

    async fn upsert_remap_rule(
        &self,
        client_id: i64,
        from_model: &str,
        to_model: &str,
        to_provider: i64,
        priority: i64,
        enabled: bool,
    ) -> StorageResult<i64> {
        let active = entities::remap_rules::ActiveModel {
            id: ActiveValue::NotSet,
            client_id: ActiveValue::Set(client_id),
            from_model: ActiveValue::Set(from_model.to_string()),
            to_model: ActiveValue::Set(to_model.to_string()),
            to_provider: ActiveValue::Set(to_provider),
            priority: ActiveValue::Set(priority),
            enabled: ActiveValue::Set(enabled),
        };
        let res = entities::RemapRules::insert(active).exec(&self.db).await?;
        Ok(res.last_insert_id)
    }

    async fn delete_remap_rule(&self, remap_rule_id: i64) -> StorageResult<()> {
        entities::RemapRules::delete_by_id(remap_rule_id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn get_client_rate_limit(
        &self,
        client_id: i64,
    ) -> StorageResult<Option<ClientRateLimitRow>> {
        use entities::client_rate_limits::Column;
        let row = entities::ClientRateLimits::find()
            .filter(Column::ClientId.eq(client_id))
            .one(&self.db)
            .await?;
        Ok(row.map(|m| ClientRateLimitRow {
            id: m.id,
            client_id: m.client_id,
            rpm_limit: m.rpm_limit,
            tpm_limit: m.tpm_limit,
            daily_limit: m.daily_limit,
            requests_this_minute: m.requests_this_minute,
            tokens_this_minute: m.tokens_this_minute,
            requests_today: m.requests_today,
            window_started_at: m.window_started_at,
            day_started_at: m.day_started_at,
        }))
    }

    async fn upsert_client_rate_limit(
        &self,
        client_id: i64,
        rpm_limit: Option<i64>,
        tpm_limit: Option<i64>,
        daily_limit: Option<i64>,
    ) -> StorageResult<i64> {
        use entities::client_rate_limits::Column;
        let existing = entities::ClientRateLimits::find()
            .filter(Column::ClientId.eq(client_id))
            .one(&self.db)
            .await?;
        let now = OffsetDateTime::now_utc();

        match existing {
            Some(model) => {
                let id = model.id;
                let mut active: entities::client_rate_limits::ActiveModel = model.into();
                active.rpm_limit = ActiveValue::Set(rpm_limit);
                active.tpm_limit = ActiveValue::Set(tpm_limit);
                active.daily_limit = ActiveValue::Set(daily_limit);
                active.update(&self.db).await?;
                Ok(id)
            }
            None => {
                let active = entities::client_rate_limits::ActiveModel {
                    id: ActiveValue::NotSet,
                    client_id: ActiveValue::Set(client_id),
                    rpm_limit: ActiveValue::Set(rpm_limit),
                    tpm_limit: ActiveValue::Set(tpm_limit),
                    daily_limit: ActiveValue::Set(daily_limit),
                    requests_this_minute: ActiveValue::Set(0),
                    tokens_this_minute: ActiveValue::Set(0),
                    requests_today: ActiveValue::Set(0),
                    window_started_at: ActiveValue::Set(now),
                    day_started_at: ActiveValue::Set(now),
                };
                let res = entities::ClientRateLimits::insert(active)
                    .exec(&self.db)
                    .await?;
                Ok(res.last_insert_id)
            }
        }
    }

    async fn increment_client_usage(
        &self,
        client_id: i64,
        requests_delta: i64,
        tokens_delta: i64,
    ) -> StorageResult<()> {
        let backend = self.db.get_database_backend();
        self.db
            .execute(Statement::from_sql_and_values(
                backend,
                "UPDATE client_rate_limits SET requests_this_minute = requests_this_minute + ?, \
                 tokens_this_minute = tokens_this_minute + ?, \
                 requests_today = requests_today + ? WHERE client_id = ?",
                [
                    requests_delta.into(),
                    tokens_delta.into(),
                    requests_delta.into(),
                    client_id.into(),
                ],
            ))
            .await?;
        Ok(())
    }

    async fn reset_minute_counters(&self, now: OffsetDateTime) -> StorageResult<()> {
        let backend = self.db.get_database_backend();
        self.db
            .execute(Statement::from_sql_and_values(
                backend,
                "UPDATE client_rate_limits SET requests_this_minute = 0, \
                 tokens_this_minute = 0, window_started_at = ?",
                [now.into()],
            ))
            .await?;
        Ok(())
    }

    async fn reset_daily_counters(&self, now: OffsetDateTime) -> StorageResult<()> {
        let backend = self.db.get_database_backend();
        self.db
            .execute(Statement::from_sql_and_values(
                backend,
                "UPDATE client_rate_limits SET requests_today = 0, day_started_at = ?",
                [now.into()],
            ))
            .await?;
        Ok(())
    }

    async fn append_request_log(&self, entry: NewRequestLog) -> StorageResult<()> {
        let active = entities::request_logs::ActiveModel {
            id: ActiveValue::NotSet,
            client_id: ActiveValue::Set(entry.client_id),
            requested_model: ActiveValue::Set(entry.requested_model),
            resolved_model_id: ActiveValue::Set(entry.resolved_model_id),
            credential_id: ActiveValue::Set(entry.credential_id),
            status: ActiveValue::Set(entry.status),
            http_status: ActiveValue::Set(entry.http_status),
            error_kind: ActiveValue::Set(entry.error_kind),
            input_tokens: ActiveValue::Set(entry.input_tokens),
            output_tokens: ActiveValue::Set(entry.output_tokens),
            latency_ms: ActiveValue::Set(entry.latency_ms),
            retried: ActiveValue::Set(entry.retried),
            created_at: ActiveValue::Set(OffsetDateTime::now_utc()),
        };
        entities::RequestLogs::insert(active).exec(&self.db).await?;
        Ok(())
    }

    async fn delete_old_request_logs(&self, older_than: OffsetDateTime) -> StorageResult<u64> {
        use entities::request_logs::Column;
        let res = entities::RequestLogs::delete_many()
            .filter(Column::CreatedAt.lt(older_than))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }

    async fn record_usage(
        &self,
        client_id: i64,
        model_id: i64,
        bucket_started_at: OffsetDateTime,
        input_tokens: i64,
        output_tokens: i64,
    ) -> StorageResult<()> {
        use entities::usage_records::Column;
        let existing = entities::UsageRecords::find()
            .filter(Column::ClientId.eq(client_id))
            .filter(Column::ModelId.eq(model_id))
            .filter(Column::BucketStartedAt.eq(bucket_started_at))
            .one(&self.db)
            .await?;

        match existing {
            Some(model) => {
                let backend = self.db.get_database_backend();
                self.db
                    .execute(Statement::from_sql_and_values(
                        backend,
                        "UPDATE usage_records SET request_count = request_count + 1, \
                         input_tokens = input_tokens + ?, output_tokens = output_tokens + ? \
                         WHERE id = ?",
                        [input_tokens.into(), output_tokens.into(), model.id.into()],
                    ))
                    .await?;
            }
            None => {
                let active = entities::usage_records::ActiveModel {
                    id: ActiveValue::NotSet,
                    client_id: ActiveValue::Set(client_id),
                    model_id: ActiveValue::Set(model_id),
                    bucket_started_at: ActiveValue::Set(bucket_started_at),
                    request_count: ActiveValue::Set(1),
                    input_tokens: ActiveValue::Set(input_tokens),
                    output_tokens: ActiveValue::Set(output_tokens),
                };
                entities::UsageRecords::insert(active).exec(&self.db).await?;
            }
        }
        Ok(())
    }

    async fn aggregate_usage(
        &self,
        client_id: Option<i64>,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> StorageResult<UsageAggregate> {
        #[derive(Debug, FromQueryResult)]
        struct Row {
            request_count: Option<i64>,
            input_tokens: Option<i64>,
            output_tokens: Option<i64>,
        }

        let backend = self.db.get_database_backend();
        let row = match client_id {
            Some(id) => {
                Row::find_by_statement(Statement::from_sql_and_values(
                    backend,
                    "SELECT SUM(request_count) AS request_count, SUM(input_tokens) AS input_tokens, \
                     SUM(output_tokens) AS output_tokens FROM usage_records \
                     WHERE client_id = ? AND bucket_started_at >= ? AND bucket_started_at < ?",
                    [id.into(), from.into(), to.into()],
                ))
                .one(&self.db)
                .await?
            }
            None => {
                Row::find_by_statement(Statement::from_sql_and_values(
                    backend,
                    "SELECT SUM(request_count) AS request_count, SUM(input_tokens) AS input_tokens, \
                     SUM(output_tokens) AS output_tokens FROM usage_records \
                     WHERE bucket_started_at >= ? AND bucket_started_at < ?",
                    [from.into(), to.into()],
                ))
                .one(&self.db)
                .await?
            }
        };

        Ok(row
            .map(|r| UsageAggregate {
                request_count: r.request_count.unwrap_or(0),
                input_tokens: r.input_tokens.unwrap_or(0),
                output_tokens: r.output_tokens.unwrap_or(0),
            })
            .unwrap_or_default())
    }
}

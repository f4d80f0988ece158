use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use gatewire_storage::snapshot::ClientRateLimitRow;
use gatewire_storage::{Storage, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitDimension {
    Rpm,
    Tpm,
    Daily,
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limit exceeded: {0:?}")]
    Denied(LimitDimension),
    #[error("rate limit store error: {0}")]
    Store(#[from] StorageError),
}

/// Per-client admission check and counter bookkeeping. Unlike the credential
/// pool, limits are read straight from the store on every call rather than
/// from a racy in-memory copy: admission must fail closed on a store error,
/// which an in-memory cache could paper over.
pub struct RateLimiter {
    storage: Arc<dyn Storage>,
}

impl RateLimiter {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Loads the client's row and evaluates `rpm, tpm, daily` in that order,
    /// returning the first violated dimension. A client with no configured
    /// row is unlimited. A store failure denies rather than admits.
    pub async fn check_limits(&self, client_id: i64) -> Result<(), RateLimitError> {
        let row = self.storage.get_client_rate_limit(client_id).await?;
        match row {
            Some(row) => evaluate(&row),
            None => Ok(()),
        }
    }

    /// Applies the request and token deltas in one store update. Daily takes
    /// the request delta, not the token delta.
    pub async fn record_usage(
        &self,
        client_id: i64,
        requests_delta: i64,
        tokens_delta: i64,
    ) -> Result<(), RateLimitError> {
        self.storage
            .increment_client_usage(client_id, requests_delta, tokens_delta)
            .await?;
        Ok(())
    }

    /// Spawns the minute-tick and daily-tick reset loops. Dropping (or
    /// explicitly stopping) the returned handle cancels both on their next
    /// wakeup.
    pub fn spawn_reset_loops(self: &Arc<Self>) -> ResetLoopsHandle {
        let minute_stop = spawn_reset_loop(
            Arc::clone(&self.storage),
            Duration::from_secs(60),
            "minute",
            |storage, now| {
                let storage = Arc::clone(storage);
                async move { storage.reset_minute_counters(now).await }
            },
        );
        let daily_stop = spawn_reset_loop(
            Arc::clone(&self.storage),
            Duration::from_secs(86_400),
            "daily",
            |storage, now| {
                let storage = Arc::clone(storage);
                async move { storage.reset_daily_counters(now).await }
            },
        );
        ResetLoopsHandle {
            minute_stop: Some(minute_stop),
            daily_stop: Some(daily_stop),
        }
    }
}

fn evaluate(row: &ClientRateLimitRow) -> Result<(), RateLimitError> {
    if let Some(limit) = row.rpm_limit
        && row.requests_this_minute >= limit
    {
        return Err(RateLimitError::Denied(LimitDimension::Rpm));
    }
    if let Some(limit) = row.tpm_limit
        && row.tokens_this_minute >= limit
    {
        return Err(RateLimitError::Denied(LimitDimension::Tpm));
    }
    if let Some(limit) = row.daily_limit
        && row.requests_today >= limit
    {
        return Err(RateLimitError::Denied(LimitDimension::Daily));
    }
    Ok(())
}

fn spawn_reset_loop<F, Fut>(
    storage: Arc<dyn Storage>,
    period: Duration,
    label: &'static str,
    reset: F,
) -> oneshot::Sender<()>
where
    F: Fn(&Arc<dyn Storage>, time::OffsetDateTime) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = gatewire_storage::StorageResult<()>> + Send,
{
    let (stop_tx, mut stop_rx) = oneshot::channel();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut stop_rx => {
                    debug!(loop_name = label, "rate limit reset loop stopping");
                    break;
                }
                _ = tokio::time::sleep(period) => {
                    let now = time::OffsetDateTime::now_utc();
                    if let Err(err) = reset(&storage, now).await {
                        warn!(loop_name = label, error = %err, "rate limit counter reset failed");
                    }
                }
            }
        }
    });
    stop_tx
}

/// Owns the stop signals for both reset loops. Dropping it stops both tasks
/// on their next wakeup; `stop()` is the explicit, immediate-intent form.
pub struct ResetLoopsHandle {
    minute_stop: Option<oneshot::Sender<()>>,
    daily_stop: Option<oneshot::Sender<()>>,
}

impl ResetLoopsHandle {
    pub fn stop(mut self) {
        if let Some(tx) = self.minute_stop.take() {
            let _ = tx.send(());
        }
        if let Some(tx) = self.daily_stop.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::Value as JsonValue;
    use time::OffsetDateTime;

    use gatewire_common::GlobalConfig;
    use gatewire_storage::snapshot::StorageSnapshot;
    use gatewire_storage::{NewRequestLog, StorageResult, UsageAggregate};

    use super::*;

    /// A fake store used only to exercise fail-closed semantics: every call
    /// returns a `StorageError`, regardless of arguments.
    struct FailingStorage;

    #[async_trait]
    impl Storage for FailingStorage {
        async fn migrate(&self) -> StorageResult<()> {
            unimplemented!()
        }
        async fn load_global_config(
            &self,
        ) -> StorageResult<Option<(i64, GlobalConfig, OffsetDateTime)>> {
            unimplemented!()
        }
        async fn upsert_global_config(&self, _config: &GlobalConfig) -> StorageResult<()> {
            unimplemented!()
        }
        async fn load_snapshot(&self) -> StorageResult<StorageSnapshot> {
            unimplemented!()
        }
        async fn upsert_provider(
            &self,
            _name: &str,
            _base_url: &str,
            _auth_method: &str,
            _auth_header: Option<&str>,
            _pricing_model: Option<&JsonValue>,
        ) -> StorageResult<i64> {
            unimplemented!()
        }
        async fn set_provider_status(
            &self,
            _provider_id: i64,
            _status: &str,
            _last_error: Option<&str>,
        ) -> StorageResult<()> {
            unimplemented!()
        }
        async fn delete_provider(&self, _provider_id: i64) -> StorageResult<()> {
            unimplemented!()
        }
        async fn upsert_model_family(&self, _provider_id: i64, _name: &str) -> StorageResult<i64> {
            unimplemented!()
        }
        async fn upsert_model(
            &self,
            _family_id: i64,
            _name: &str,
            _context_window: Option<i64>,
            _max_tokens: Option<i64>,
            _capabilities: Option<&JsonValue>,
        ) -> StorageResult<i64> {
            unimplemented!()
        }
        async fn set_model_status(&self, _model_id: i64, _status: &str) -> StorageResult<()> {
            unimplemented!()
        }
        async fn insert_credential(
            &self,
            _provider_id: i64,
            _key_hash: &str,
            _key_prefix: Option<&str>,
            _tier: Option<&str>,
            _rpm_limit: Option<i64>,
            _tpm_limit: Option<i64>,
            _daily_limit: Option<i64>,
        ) -> StorageResult<i64> {
            unimplemented!()
        }
        async fn set_credential_active(&self, _credential_id: i64, _active: bool) -> StorageResult<()> {
            unimplemented!()
        }
        async fn set_credential_degraded(
            &self,
            _credential_id: i64,
            _degraded: bool,
            _degraded_until: Option<OffsetDateTime>,
        ) -> StorageResult<()> {
            unimplemented!()
        }
        async fn increment_credential_usage(
            &self,
            _credential_id: i64,
            _requests_delta: i64,
            _tokens_delta: i64,
        ) -> StorageResult<()> {
            unimplemented!()
        }
        async fn delete_credential(&self, _credential_id: i64) -> StorageResult<()> {
            unimplemented!()
        }
        async fn upsert_client(
            &self,
            _name: &str,
            _version: &str,
            _token: &str,
            _capabilities_json: &JsonValue,
            _config_json: &JsonValue,
        ) -> StorageResult<i64> {
            unimplemented!()
        }
        async fn touch_client_last_seen(&self, _client_id: i64, _at: OffsetDateTime) -> StorageResult<()> {
            unimplemented!()
        }
        async fn delete_client(&self, _client_id: i64) -> StorageResult<()> {
            unimplemented!()
        }
        async fn upsert_alias(
            &self,
            _name: &str,
            _model_id: i64,
            _client_id: Option<i64>,
        ) -> StorageResult<i64> {
            unimplemented!()
        }
        async fn delete_alias(&self, _alias_id: i64) -> StorageResult<()> {
            unimplemented!()
        }
        async fn upsert_remap_rule(
            &self,
            _client_id: i64,
            _from_model: &str,
            _to_model: &str,
            _to_provider: i64,
            _priority: i64,
            _enabled: bool,
        ) -> StorageResult<i64> {
            unimplemented!()
        }
        async fn delete_remap_rule(&self, _remap_rule_id: i64) -> StorageResult<()> {
            unimplemented!()
        }
        async fn get_client_rate_limit(
            &self,
            _client_id: i64,
        ) -> StorageResult<Option<ClientRateLimitRow>> {
            Err(StorageError::NotFound("forced failure"))
        }
        async fn upsert_client_rate_limit(
            &self,
            _client_id: i64,
            _rpm_limit: Option<i64>,
            _tpm_limit: Option<i64>,
            _daily_limit: Option<i64>,
        ) -> StorageResult<i64> {
            unimplemented!()
        }
        async fn increment_client_usage(
            &self,
            _client_id: i64,
            _requests_delta: i64,
            _tokens_delta: i64,
        ) -> StorageResult<()> {
            unimplemented!()
        }
        async fn reset_minute_counters(&self, _now: OffsetDateTime) -> StorageResult<()> {
            unimplemented!()
        }
        async fn reset_daily_counters(&self, _now: OffsetDateTime) -> StorageResult<()> {
            unimplemented!()
        }
        async fn append_request_log(&self, _entry: NewRequestLog) -> StorageResult<()> {
            unimplemented!()
        }
        async fn delete_old_request_logs(&self, _older_than: OffsetDateTime) -> StorageResult<u64> {
            unimplemented!()
        }
        async fn record_usage(
            &self,
            _client_id: i64,
            _model_id: i64,
            _bucket_started_at: OffsetDateTime,
            _input_tokens: i64,
            _output_tokens: i64,
        ) -> StorageResult<()> {
            unimplemented!()
        }
        async fn aggregate_usage(
            &self,
            _client_id: Option<i64>,
            _from: OffsetDateTime,
            _to: OffsetDateTime,
        ) -> StorageResult<UsageAggregate> {
            unimplemented!()
        }
    }

    fn row(rpm: Option<i64>, tpm: Option<i64>, daily: Option<i64>, rpm_now: i64, tpm_now: i64, daily_now: i64) -> ClientRateLimitRow {
        let now = OffsetDateTime::UNIX_EPOCH;
        ClientRateLimitRow {
            id: 1,
            client_id: 1,
            rpm_limit: rpm,
            tpm_limit: tpm,
            daily_limit: daily,
            requests_this_minute: rpm_now,
            tokens_this_minute: tpm_now,
            requests_today: daily_now,
            window_started_at: now,
            day_started_at: now,
        }
    }

    #[test]
    fn unconfigured_dimension_never_denies() {
        assert!(evaluate(&row(None, None, None, 999, 999, 999)).is_ok());
    }

    #[test]
    fn rpm_checked_before_tpm_and_daily() {
        let r = row(Some(10), Some(10), Some(10), 10, 0, 0);
        assert!(matches!(
            evaluate(&r),
            Err(RateLimitError::Denied(LimitDimension::Rpm))
        ));
    }

    #[test]
    fn tpm_denial_when_rpm_is_fine() {
        let r = row(Some(10), Some(10), Some(10), 0, 10, 0);
        assert!(matches!(
            evaluate(&r),
            Err(RateLimitError::Denied(LimitDimension::Tpm))
        ));
    }

    #[test]
    fn daily_denial_when_rpm_and_tpm_are_fine() {
        let r = row(Some(10), Some(10), Some(10), 0, 0, 10);
        assert!(matches!(
            evaluate(&r),
            Err(RateLimitError::Denied(LimitDimension::Daily))
        ));
    }

    #[tokio::test]
    async fn store_error_fails_closed() {
        let limiter = RateLimiter::new(Arc::new(FailingStorage));
        let err = limiter.check_limits(1).await.unwrap_err();
        assert!(matches!(err, RateLimitError::Store(_)));
    }
}

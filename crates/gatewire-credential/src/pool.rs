use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, oneshot};
use tokio::time::Instant;
use tracing::{debug, warn};

use gatewire_storage::Storage;

use crate::state::{CachedCredential, CredentialId, ProviderId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AcquireError {
    #[error("no credentials registered for provider")]
    NotFound,
    #[error("every credential for provider is degraded or over limit")]
    NoEligibleCredential,
    #[error("credential plaintext was never registered in the vault")]
    VaultMiss,
}

struct PoolState {
    cache: HashMap<ProviderId, Vec<CachedCredential>>,
    vault: HashMap<String, String>,
}

/// Per-provider working set of credentials plus the in-memory plaintext
/// vault, guarded by one read-write lock. Selection takes the read lock;
/// every mutation (cache refresh, degrade, vault insert) takes the write
/// lock. `mark_degraded` releases the lock before calling the store and
/// re-acquires it to splice the result back in, so C2 never holds its own
/// lock while waiting on C1.
pub struct CredentialPool {
    state: RwLock<PoolState>,
    storage: Arc<dyn Storage>,
}

impl CredentialPool {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            state: RwLock::new(PoolState {
                cache: HashMap::new(),
                vault: HashMap::new(),
            }),
            storage,
        }
    }

    /// Reloads every provider's credential list from the store. Vault
    /// entries are untouched — plaintext never round-trips through C1.
    pub async fn refresh_all(&self) -> gatewire_storage::StorageResult<()> {
        let snapshot = self.storage.load_snapshot().await?;
        let now = Instant::now();
        let mut by_provider: HashMap<ProviderId, Vec<CachedCredential>> = HashMap::new();
        for row in snapshot.credentials {
            let degraded_until = match (row.degraded, row.degraded_until) {
                (true, Some(until)) => {
                    let remaining = until - time::OffsetDateTime::now_utc();
                    let remaining = remaining.whole_milliseconds().max(0) as u64;
                    Some(now + Duration::from_millis(remaining))
                }
                _ => None,
            };
            by_provider
                .entry(row.provider_id)
                .or_default()
                .push(CachedCredential {
                    id: row.id,
                    provider_id: row.provider_id,
                    key_hash: row.key_hash,
                    rpm_limit: row.rpm_limit,
                    tpm_limit: row.tpm_limit,
                    daily_limit: row.daily_limit,
                    requests_count: row.requests_count,
                    tokens_count: row.tokens_count,
                    active: row.active,
                    degraded: row.degraded,
                    degraded_until,
                });
        }

        let mut state = self.state.write().await;
        state.cache = by_provider;
        Ok(())
    }

    /// Spawns the periodic cache-refresh task. The returned sender, when
    /// dropped or sent to, stops the task on its next wakeup.
    pub fn spawn_refresh_task(
        self: &Arc<Self>,
        cache_ttl: Duration,
    ) -> oneshot::Sender<()> {
        let (stop_tx, mut stop_rx) = oneshot::channel();
        let pool = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        debug!("credential pool refresh task stopping");
                        break;
                    }
                    _ = tokio::time::sleep(cache_ttl) => {
                        if let Err(err) = pool.refresh_all().await {
                            warn!(error = %err, "credential pool refresh failed");
                        }
                    }
                }
            }
        });
        stop_tx
    }

    /// Selects the lowest-scoring eligible credential for a provider.
    pub async fn get_key(&self, provider_id: ProviderId) -> Result<CredentialId, AcquireError> {
        let state = self.state.read().await;
        let list = state.cache.get(&provider_id).ok_or(AcquireError::NotFound)?;
        if list.is_empty() {
            return Err(AcquireError::NotFound);
        }
        let now = Instant::now();
        list.iter()
            .filter(|c| c.is_eligible(now))
            .min_by(|a, b| a.score().partial_cmp(&b.score()).unwrap())
            .map(|c| c.id)
            .ok_or(AcquireError::NoEligibleCredential)
    }

    pub async fn register_actual_key(&self, key_hash: impl Into<String>, plaintext: impl Into<String>) {
        let mut state = self.state.write().await;
        state.vault.insert(key_hash.into(), plaintext.into());
    }

    /// Resolves a provider to a `(credential_id, plaintext)` pair via
    /// selection followed by a vault lookup.
    pub async fn get_actual_key(
        &self,
        provider_id: ProviderId,
    ) -> Result<(CredentialId, String), AcquireError> {
        let credential_id = self.get_key(provider_id).await?;
        let state = self.state.read().await;
        let key_hash = state
            .cache
            .get(&provider_id)
            .and_then(|list| list.iter().find(|c| c.id == credential_id))
            .map(|c| c.key_hash.clone())
            .ok_or(AcquireError::NotFound)?;
        state
            .vault
            .get(&key_hash)
            .cloned()
            .map(|plaintext| (credential_id, plaintext))
            .ok_or(AcquireError::VaultMiss)
    }

    /// Writes degradation to the store, then splices the refreshed row back
    /// into the cache at its existing position.
    pub async fn mark_degraded(
        &self,
        credential_id: CredentialId,
        duration: Duration,
    ) -> gatewire_storage::StorageResult<()> {
        let degraded_until = time::OffsetDateTime::now_utc() + duration;
        self.storage
            .set_credential_degraded(credential_id, true, Some(degraded_until))
            .await?;

        let until_instant = Instant::now() + duration;
        let mut state = self.state.write().await;
        for list in state.cache.values_mut() {
            if let Some(entry) = list.iter_mut().find(|c| c.id == credential_id) {
                entry.degraded = true;
                entry.degraded_until = Some(until_instant);
            }
        }
        Ok(())
    }

    /// Clears degradation and resets the in-cache counters, mirroring an
    /// explicit `ResetLimits` admin action.
    pub async fn reset_limits(
        &self,
        credential_id: CredentialId,
    ) -> gatewire_storage::StorageResult<()> {
        self.storage
            .set_credential_degraded(credential_id, false, None)
            .await?;
        let mut state = self.state.write().await;
        for list in state.cache.values_mut() {
            if let Some(entry) = list.iter_mut().find(|c| c.id == credential_id) {
                entry.degraded = false;
                entry.degraded_until = None;
                entry.requests_count = 0;
                entry.tokens_count = 0;
            }
        }
        Ok(())
    }

    /// Records a completed request's usage both durably (C1) and in the
    /// in-cache copy, which is what selection actually reads.
    pub async fn record_usage(
        &self,
        provider_id: ProviderId,
        credential_id: CredentialId,
        requests_delta: i64,
        tokens_delta: i64,
    ) -> gatewire_storage::StorageResult<()> {
        self.storage
            .increment_credential_usage(credential_id, requests_delta, tokens_delta)
            .await?;
        let mut state = self.state.write().await;
        if let Some(list) = state.cache.get_mut(&provider_id)
            && let Some(entry) = list.iter_mut().find(|c| c.id == credential_id)
        {
            entry.requests_count += requests_delta;
            entry.tokens_count += tokens_delta;
        }
        Ok(())
    }
}

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, oneshot};
use tracing::{debug, warn};

use gatewire_storage::snapshot::{AliasRow, ClientRow, ModelFamilyRow, ModelRow, ProviderRow, RemapRuleRow};
use gatewire_storage::{Storage, StorageResult};

struct CatalogState {
    clients: Vec<ClientRow>,
    providers: Vec<ProviderRow>,
    model_families: Vec<ModelFamilyRow>,
    models: Vec<ModelRow>,
    aliases: Vec<AliasRow>,
    remap_rules: Vec<RemapRuleRow>,
}

/// In-memory mirror of everything the Router needs to resolve a request
/// without touching the database: client tokens, provider endpoints, the
/// model catalog, aliases and remap rules. Refreshed wholesale on the same
/// cache-TTL rhythm as the credential pool, and guarded the same way — one
/// read-write lock, read path takes the read lock.
pub struct Catalog {
    state: RwLock<CatalogState>,
    storage: Arc<dyn Storage>,
}

impl Catalog {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            state: RwLock::new(CatalogState {
                clients: Vec::new(),
                providers: Vec::new(),
                model_families: Vec::new(),
                models: Vec::new(),
                aliases: Vec::new(),
                remap_rules: Vec::new(),
            }),
            storage,
        }
    }

    pub async fn refresh_all(&self) -> StorageResult<()> {
        let snapshot = self.storage.load_snapshot().await?;
        let mut state = self.state.write().await;
        state.clients = snapshot.clients;
        state.providers = snapshot.providers;
        state.model_families = snapshot.model_families;
        state.models = snapshot.models;
        state.aliases = snapshot.aliases;
        state.remap_rules = snapshot.remap_rules;
        Ok(())
    }

    pub fn spawn_refresh_task(self: &Arc<Self>, cache_ttl: Duration) -> oneshot::Sender<()> {
        let (stop_tx, mut stop_rx) = oneshot::channel();
        let catalog = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        debug!("catalog refresh task stopping");
                        break;
                    }
                    _ = tokio::time::sleep(cache_ttl) => {
                        if let Err(err) = catalog.refresh_all().await {
                            warn!(error = %err, "catalog refresh failed");
                        }
                    }
                }
            }
        });
        stop_tx
    }

    pub async fn find_client_by_token(&self, token: &str) -> Option<ClientRow> {
        let state = self.state.read().await;
        state.clients.iter().find(|c| c.token == token).cloned()
    }

    pub async fn find_provider(&self, provider_id: i64) -> Option<ProviderRow> {
        let state = self.state.read().await;
        state.providers.iter().find(|p| p.id == provider_id).cloned()
    }

    pub async fn find_provider_by_name(&self, name: &str) -> Option<ProviderRow> {
        let state = self.state.read().await;
        state.providers.iter().find(|p| p.name == name).cloned()
    }

    pub async fn find_model_id(&self, provider_id: i64, model_name: &str) -> Option<i64> {
        let state = self.state.read().await;
        let family_ids: Vec<i64> = state
            .model_families
            .iter()
            .filter(|f| f.provider_id == provider_id)
            .map(|f| f.id)
            .collect();
        state
            .models
            .iter()
            .find(|m| m.name == model_name && family_ids.contains(&m.family_id))
            .map(|m| m.id)
    }

    /// Picks the first provider from `priority` (provider names, in order)
    /// that is online and hosts `concrete_model`. Used only when C3 yields no
    /// remap and the caller must fall back to the client's own provider
    /// preference.
    pub async fn first_provider_hosting(&self, priority: &[String], concrete_model: &str) -> Option<ProviderRow> {
        let state = self.state.read().await;
        pick_provider_hosting(priority, concrete_model, &state.providers, &state.model_families, &state.models).cloned()
    }

    pub async fn aliases_snapshot(&self) -> Vec<AliasRow> {
        self.state.read().await.aliases.clone()
    }

    pub async fn remap_rules_snapshot(&self) -> Vec<RemapRuleRow> {
        self.state.read().await.remap_rules.clone()
    }

    pub async fn models_snapshot(&self) -> Vec<ModelRow> {
        self.state.read().await.models.clone()
    }
}

/// A provider is excluded only when explicitly `offline`; `online` and
/// `degraded` both remain eligible for the priority fallback.
fn pick_provider_hosting<'a>(
    priority: &[String],
    concrete_model: &str,
    providers: &'a [ProviderRow],
    model_families: &[ModelFamilyRow],
    models: &[ModelRow],
) -> Option<&'a ProviderRow> {
    for name in priority {
        let Some(provider) = providers.iter().find(|p| &p.name == name && p.status != "offline") else {
            continue;
        };
        let family_ids: Vec<i64> = model_families
            .iter()
            .filter(|f| f.provider_id == provider.id)
            .map(|f| f.id)
            .collect();
        let hosts_model = models
            .iter()
            .any(|m| m.name == concrete_model && family_ids.contains(&m.family_id));
        if hosts_model {
            return Some(provider);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(id: i64, name: &str, status: &str) -> ProviderRow {
        ProviderRow {
            id,
            name: name.to_string(),
            base_url: format!("https://{name}.example"),
            auth_method: "bearer".to_string(),
            auth_header: None,
            pricing_model: None,
            status: status.to_string(),
            last_error: None,
            discovered_at: time::OffsetDateTime::UNIX_EPOCH,
            last_validated: None,
        }
    }

    fn family(id: i64, provider_id: i64, name: &str) -> ModelFamilyRow {
        ModelFamilyRow {
            id,
            provider_id,
            name: name.to_string(),
        }
    }

    fn model(id: i64, family_id: i64, name: &str) -> ModelRow {
        ModelRow {
            id,
            family_id,
            name: name.to_string(),
            context_window: None,
            max_tokens: None,
            status: "online".to_string(),
            cost_in_per_million: None,
            cost_out_per_million: None,
            cost_reasoning_per_million: None,
            capabilities: None,
        }
    }

    #[test]
    fn picks_first_priority_provider_hosting_the_model() {
        let providers = vec![provider(1, "openai", "online"), provider(2, "anthropic", "online")];
        let families = vec![family(10, 1, "gpt"), family(20, 2, "claude")];
        let models = vec![model(100, 10, "gpt-4o"), model(200, 20, "claude-sonnet-4-5-20250929")];

        let picked = pick_provider_hosting(
            &["openai".to_string(), "anthropic".to_string()],
            "claude-sonnet-4-5-20250929",
            &providers,
            &families,
            &models,
        );
        assert_eq!(picked.map(|p| p.id), Some(2));
    }

    #[test]
    fn online_status_is_eligible_not_just_literal_active() {
        let providers = vec![provider(1, "openai", "online")];
        let families = vec![family(10, 1, "gpt")];
        let models = vec![model(100, 10, "gpt-4o")];

        let picked = pick_provider_hosting(&["openai".to_string()], "gpt-4o", &providers, &families, &models);
        assert_eq!(picked.map(|p| p.id), Some(1));
    }

    #[test]
    fn offline_provider_is_skipped() {
        let providers = vec![provider(1, "openai", "offline"), provider(2, "openai-backup", "online")];
        let families = vec![family(10, 1, "gpt"), family(20, 2, "gpt")];
        let models = vec![model(100, 10, "gpt-4o"), model(200, 20, "gpt-4o")];

        let picked = pick_provider_hosting(&["openai".to_string()], "gpt-4o", &providers, &families, &models);
        assert!(picked.is_none());
    }

    #[test]
    fn provider_up_but_not_hosting_model_is_skipped() {
        let providers = vec![provider(1, "openai", "online")];
        let families = vec![family(10, 1, "gpt")];
        let models = vec![model(100, 10, "gpt-4o")];

        let picked = pick_provider_hosting(&["openai".to_string()], "gpt-3.5-turbo", &providers, &families, &models);
        assert!(picked.is_none());
    }
}

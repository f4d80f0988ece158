use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::oneshot;

use gatewire_common::{GlobalConfig, GlobalConfigPatch, hash_secret};
use gatewire_credential::CredentialPool;
use gatewire_ratelimit::{RateLimiter, ResetLoopsHandle};
use gatewire_router::{Catalog, Router};
use gatewire_storage::{SeaOrmStorage, Storage};

use crate::cli::CliArgs;
use crate::dsn;

/// Owns every background task's stop-signal. Dropped (or explicitly
/// stopped) at process shutdown so loops never outlive the process they
/// were spawned for.
pub struct BackgroundTasks {
    pub catalog_refresh: oneshot::Sender<()>,
    pub credential_refresh: oneshot::Sender<()>,
    pub rate_limit_resets: ResetLoopsHandle,
}

pub struct Bootstrap {
    pub storage: Arc<SeaOrmStorage>,
    pub global: GlobalConfig,
    pub router: Arc<Router>,
    pub catalog: Arc<Catalog>,
    pub credentials: Arc<CredentialPool>,
    pub rate_limiter: Arc<RateLimiter>,
    pub background: BackgroundTasks,
}

pub async fn bootstrap(args: CliArgs) -> anyhow::Result<Bootstrap> {
    let requested_dsn = args.dsn.clone().unwrap_or_else(dsn::default_dsn);
    dsn::ensure_sqlite_parent_dir(&requested_dsn)?;

    let storage = Arc::new(SeaOrmStorage::connect(&requested_dsn).await.context("connect storage")?);
    storage.migrate().await.context("apply migrations")?;

    let db_global = storage.load_global_config().await.context("load global config")?;
    let mut merged = db_global.map(|(_, config, _)| GlobalConfigPatch::from(config)).unwrap_or_default();

    let admin_key_hash = args.admin_key.as_deref().map(hash_secret);

    let cli_patch = GlobalConfigPatch {
        host: args.host,
        port: args.port,
        admin_key_hash,
        proxy: args.proxy,
        dsn: Some(requested_dsn),
        default_degrade_secs: None,
        credential_cache_ttl_secs: None,
    };
    merged.overlay(cli_patch);
    let global = merged.into_config().context("finalize merged global config")?;

    storage.upsert_global_config(&global).await.context("persist merged global config")?;

    let catalog = Arc::new(Catalog::new(storage.clone()));
    catalog.refresh_all().await.context("initial catalog load")?;

    let credentials = Arc::new(CredentialPool::new(storage.clone()));
    credentials.refresh_all().await.context("initial credential pool load")?;

    let rate_limiter = Arc::new(RateLimiter::new(storage.clone()));

    let degrade_duration = Duration::from_secs(global.default_degrade_secs);
    let router = Arc::new(Router::new(
        storage.clone(),
        catalog.clone(),
        credentials.clone(),
        rate_limiter.clone(),
        degrade_duration,
    ));

    let cache_ttl = Duration::from_secs(global.credential_cache_ttl_secs);
    let background = BackgroundTasks {
        catalog_refresh: catalog.spawn_refresh_task(cache_ttl),
        credential_refresh: credentials.spawn_refresh_task(cache_ttl),
        rate_limit_resets: rate_limiter.spawn_reset_loops(),
    };

    Ok(Bootstrap {
        storage,
        global,
        router,
        catalog,
        credentials,
        rate_limiter,
        background,
    })
}

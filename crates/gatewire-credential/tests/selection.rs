use std::sync::Arc;
use std::time::Duration;

use gatewire_credential::{AcquireError, CredentialPool};
use gatewire_storage::SeaOrmStorage;

async fn seeded_pool() -> (Arc<SeaOrmStorage>, CredentialPool, i64) {
    let storage = SeaOrmStorage::connect("sqlite::memory:").await.unwrap();
    storage.migrate().await.unwrap();
    let provider_id = storage
        .upsert_provider("openai", "https://api.openai.com/v1", "bearer", None, None)
        .await
        .unwrap();
    let storage = Arc::new(storage);
    let pool = CredentialPool::new(storage.clone());
    (storage, pool, provider_id)
}

#[tokio::test]
async fn selects_lowest_scoring_eligible_credential() {
    let (storage, pool, provider_id) = seeded_pool().await;

    let cheap = storage
        .insert_credential(provider_id, "hash-cheap", None, None, None, None, None)
        .await
        .unwrap();
    let expensive = storage
        .insert_credential(provider_id, "hash-expensive", None, None, None, None, None)
        .await
        .unwrap();
    storage
        .increment_credential_usage(expensive, 50, 50_000)
        .await
        .unwrap();

    pool.refresh_all().await.unwrap();

    let chosen = pool.get_key(provider_id).await.unwrap();
    assert_eq!(chosen, cheap);
}

#[tokio::test]
async fn unknown_provider_is_not_found() {
    let (_storage, pool, _provider_id) = seeded_pool().await;
    let err = pool.get_key(999).await.unwrap_err();
    assert_eq!(err, AcquireError::NotFound);
}

#[tokio::test]
async fn degraded_credential_is_excluded_until_window_elapses() {
    let (storage, pool, provider_id) = seeded_pool().await;
    let only = storage
        .insert_credential(provider_id, "hash-only", None, None, None, None, None)
        .await
        .unwrap();
    pool.refresh_all().await.unwrap();
    assert_eq!(pool.get_key(provider_id).await.unwrap(), only);

    pool.mark_degraded(only, Duration::from_millis(50))
        .await
        .unwrap();
    let err = pool.get_key(provider_id).await.unwrap_err();
    assert_eq!(err, AcquireError::NoEligibleCredential);

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(pool.get_key(provider_id).await.unwrap(), only);
}

#[tokio::test]
async fn vault_miss_is_distinct_from_selection_failure() {
    let (storage, pool, provider_id) = seeded_pool().await;
    storage
        .insert_credential(provider_id, "hash-unregistered", None, None, None, None, None)
        .await
        .unwrap();
    pool.refresh_all().await.unwrap();

    let err = pool.get_actual_key(provider_id).await.unwrap_err();
    assert_eq!(err, AcquireError::VaultMiss);

    pool.register_actual_key("hash-unregistered", "sk-plaintext")
        .await;
    let (_, plaintext) = pool.get_actual_key(provider_id).await.unwrap();
    assert_eq!(plaintext, "sk-plaintext");
}

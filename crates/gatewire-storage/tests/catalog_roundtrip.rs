use gatewire_common::GlobalConfig;
use gatewire_storage::{SeaOrmStorage, Storage};

async fn memory_storage() -> SeaOrmStorage {
    let storage = SeaOrmStorage::connect("sqlite::memory:").await.unwrap();
    storage.migrate().await.unwrap();
    storage
}

#[tokio::test]
async fn global_config_roundtrips_through_json_column() {
    let storage = memory_storage().await;
    assert!(storage.load_global_config().await.unwrap().is_none());

    let config = GlobalConfig {
        host: "0.0.0.0".to_string(),
        port: 8080,
        admin_key_hash: "deadbeef".to_string(),
        proxy: None,
        dsn: "sqlite::memory:".to_string(),
        default_degrade_secs: 30,
        credential_cache_ttl_secs: 300,
    };
    storage.upsert_global_config(&config).await.unwrap();

    let (_, loaded, _) = storage.load_global_config().await.unwrap().unwrap();
    assert_eq!(loaded, config);
}

#[tokio::test]
async fn provider_model_credential_chain_persists() {
    let storage = memory_storage().await;

    let provider_id = storage
        .upsert_provider("openai", "https://api.openai.com/v1", "bearer", None, None)
        .await
        .unwrap();
    let family_id = storage
        .upsert_model_family(provider_id, "gpt")
        .await
        .unwrap();
    let model_id = storage
        .upsert_model(family_id, "gpt-4o", Some(128_000), Some(16_000), None)
        .await
        .unwrap();
    let credential_id = storage
        .insert_credential(
            provider_id,
            &gatewire_common::hash_secret("sk-test"),
            Some("sk-test12..."),
            Some("tier1"),
            Some(60),
            Some(100_000),
            None,
        )
        .await
        .unwrap();

    let snapshot = storage.load_snapshot().await.unwrap();
    assert_eq!(snapshot.providers.len(), 1);
    assert_eq!(snapshot.models.len(), 1);
    assert_eq!(snapshot.credentials.len(), 1);
    assert_eq!(snapshot.models[0].id, model_id);
    assert_eq!(snapshot.credentials[0].id, credential_id);

    storage
        .increment_credential_usage(credential_id, 1, 1234)
        .await
        .unwrap();
    let snapshot = storage.load_snapshot().await.unwrap();
    assert_eq!(snapshot.credentials[0].requests_count, 1);
    assert_eq!(snapshot.credentials[0].tokens_count, 1234);
}

#[tokio::test]
async fn global_and_client_scoped_aliases_coexist_by_name() {
    let storage = memory_storage().await;
    let provider_id = storage
        .upsert_provider("openai", "https://api.openai.com/v1", "bearer", None, None)
        .await
        .unwrap();
    let family_id = storage.upsert_model_family(provider_id, "gpt").await.unwrap();
    let model_id = storage
        .upsert_model(family_id, "gpt-4o", None, None, None)
        .await
        .unwrap();
    let client_id = storage
        .upsert_client(
            "acme-cli",
            "1.0.0",
            "tok-1",
            &serde_json::json!({}),
            &serde_json::json!({}),
        )
        .await
        .unwrap();

    storage.upsert_alias("fast", model_id, None).await.unwrap();
    storage
        .upsert_alias("fast", model_id, Some(client_id))
        .await
        .unwrap();

    let snapshot = storage.load_snapshot().await.unwrap();
    assert_eq!(snapshot.aliases.len(), 2);
    assert!(snapshot.aliases.iter().any(|a| a.scope_key == "*"));
    assert!(
        snapshot
            .aliases
            .iter()
            .any(|a| a.scope_key == client_id.to_string())
    );
}

#[tokio::test]
async fn request_log_retention_deletes_only_old_rows() {
    use gatewire_storage::NewRequestLog;
    use time::OffsetDateTime;

    let storage = memory_storage().await;
    let client_id = storage
        .upsert_client(
            "acme-cli",
            "1.0.0",
            "tok-2",
            &serde_json::json!({}),
            &serde_json::json!({}),
        )
        .await
        .unwrap();

    storage
        .append_request_log(NewRequestLog {
            client_id,
            requested_model: "gpt-4o".to_string(),
            resolved_model_id: None,
            credential_id: None,
            status: "ok".to_string(),
            http_status: Some(200),
            error_kind: None,
            input_tokens: Some(10),
            output_tokens: Some(20),
            latency_ms: 120,
            retried: false,
        })
        .await
        .unwrap();

    let cutoff_in_future = OffsetDateTime::now_utc() + time::Duration::seconds(60);
    let deleted = storage
        .delete_old_request_logs(cutoff_in_future)
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    let cutoff_in_past = OffsetDateTime::now_utc() - time::Duration::seconds(60);
    let deleted = storage.delete_old_request_logs(cutoff_in_past).await.unwrap();
    assert_eq!(deleted, 0);
}

use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "credentials")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique_key = "provider_key_hash")]
    pub provider_id: i64,
    /// SHA-256 hex of the plaintext key. The plaintext itself never reaches
    /// this table; it lives only in the credential pool's in-memory vault.
    #[sea_orm(unique_key = "provider_key_hash")]
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
    #[sea_orm(belongs_to, from = "provider_id", to = "id", on_delete = "Cascade")]
    pub provider: HasOne<super::providers::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

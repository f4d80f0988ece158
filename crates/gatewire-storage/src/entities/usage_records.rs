use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

/// Hourly-bucketed usage rollup per client/model/credential, used for
/// reporting without scanning the full `request_logs` table.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "usage_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique_key = "usage_bucket")]
    pub client_id: i64,
    #[sea_orm(unique_key = "usage_bucket")]
    pub model_id: i64,
    #[sea_orm(unique_key = "usage_bucket")]
    pub bucket_started_at: OffsetDateTime,
    pub request_count: i64,
    pub input_tokens: i64,
    pub output_tokens: i64,
    #[sea_orm(belongs_to, from = "client_id", to = "id", on_delete = "Cascade")]
    pub client: HasOne<super::clients::Entity>,
    #[sea_orm(belongs_to, from = "model_id", to = "id", on_delete = "Cascade")]
    pub model: HasOne<super::models::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

/// An append-only record of one routed request, written after the router
/// reaches a terminal outcome (success or exhausted retries). Nothing in
/// this crate trims this table; callers that want retention limits drive
/// [`crate::storage::Storage::delete_old_request_logs`] from their own
/// schedule.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "request_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub client_id: i64,
    pub requested_model: String,
    pub resolved_model_id: Option<i64>,
    pub credential_id: Option<i64>,
    pub status: String,
    pub http_status: Option<i32>,
    pub error_kind: Option<String>,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub latency_ms: i64,
    pub retried: bool,
    pub created_at: OffsetDateTime,
    #[sea_orm(belongs_to, from = "client_id", to = "id", on_delete = "Cascade")]
    pub client: HasOne<super::clients::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

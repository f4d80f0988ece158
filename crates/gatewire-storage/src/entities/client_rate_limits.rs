use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

/// Per-client admission counters. One row per client; counters are reset in
/// bulk by the minute/day tick loops rather than lazily per-request, so a
/// quiet client's row can sit with a stale `window_started_at` between ticks.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "client_rate_limits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique_key = "client_rate_limit_client")]
    pub client_id: i64,
    pub rpm_limit: Option<i64>,
    pub tpm_limit: Option<i64>,
    pub daily_limit: Option<i64>,
    pub requests_this_minute: i64,
    pub tokens_this_minute: i64,
    pub requests_today: i64,
    pub window_started_at: OffsetDateTime,
    pub day_started_at: OffsetDateTime,
    #[sea_orm(belongs_to, from = "client_id", to = "id", on_delete = "Cascade")]
    pub client: HasOne<super::clients::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

/// Single-row table holding the persisted [`gatewire_common::GlobalConfig`]
/// patch layer. Bootstrap reads this row, overlays CLI/env values on top,
/// and writes the merged result back so the next start sees prior choices.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "global_config")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub config_json: Json,
    pub updated_at: OffsetDateTime,
}

impl ActiveModelBehavior for ActiveModel {}

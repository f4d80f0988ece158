use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub version: String,
    #[sea_orm(unique_key = "client_token")]
    pub token: String,
    pub capabilities_json: Json,
    pub config_json: Json,
    pub created_at: OffsetDateTime,
    pub last_seen_at: Option<OffsetDateTime>,
    #[sea_orm(has_many)]
    pub aliases: HasMany<super::aliases::Entity>,
    #[sea_orm(has_many)]
    pub remap_rules: HasMany<super::remap_rules::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "providers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique_key = "provider_name")]
    pub name: String,
    #[sea_orm(unique_key = "provider_base_url")]
    pub base_url: String,
    /// `bearer`, `header`, or `oauth`.
    pub auth_method: String,
    pub auth_header: Option<String>,
    pub pricing_model: Option<Json>,
    /// `online`, `degraded`, or `offline`.
    pub status: String,
    pub last_error: Option<String>,
    pub discovered_at: OffsetDateTime,
    pub last_validated: Option<OffsetDateTime>,
    #[sea_orm(has_many)]
    pub model_families: HasMany<super::model_families::Entity>,
    #[sea_orm(has_many)]
    pub credentials: HasMany<super::credentials::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

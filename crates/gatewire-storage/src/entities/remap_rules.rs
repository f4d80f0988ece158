use sea_orm::entity::prelude::*;

/// A client-scoped glob rewrite applied after alias resolution.
///
/// `to_model`/`to_provider` are a plain name and a provider reference, not a
/// foreign key into `models` — a remap can redirect to a model the catalog
/// hasn't discovered yet, and the rewritten name is sent upstream as-is.
///
/// Unlike aliases, remap rules have no global scope: `client_id` is always
/// set, since a rule with no owning client would apply to every request and
/// the spec models that case as an alias instead.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "remap_rules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub client_id: i64,
    pub from_model: String,
    pub to_model: String,
    pub to_provider: i64,
    pub priority: i64,
    pub enabled: bool,
    #[sea_orm(belongs_to, from = "client_id", to = "id", on_delete = "Cascade")]
    pub client: HasOne<super::clients::Entity>,
    #[sea_orm(belongs_to, from = "to_provider", to = "id", on_delete = "Cascade")]
    pub provider: HasOne<super::providers::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

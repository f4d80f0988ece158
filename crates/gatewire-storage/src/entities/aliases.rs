use sea_orm::entity::prelude::*;

/// A client-scoped or global name binding resolved to a concrete model.
///
/// `client_id` is `None` for a global alias. Since SQLite/Postgres both treat
/// NULL as distinct from every other value in a unique index, a nullable
/// `client_id` column cannot itself carry the "one binding per (name, scope)"
/// invariant — two global aliases with the same name would both satisfy a
/// unique index over `(name, client_id)`. `scope_key` sidesteps this: it is
/// always non-null, set to the client id's decimal string or to the `"*"`
/// sentinel for the global scope, and carries the actual uniqueness.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "aliases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique_key = "alias_scope")]
    pub name: String,
    pub model_id: i64,
    pub client_id: Option<i64>,
    #[sea_orm(unique_key = "alias_scope")]
    pub scope_key: String,
    #[sea_orm(belongs_to, from = "model_id", to = "id", on_delete = "Cascade")]
    pub model: HasOne<super::models::Entity>,
    #[sea_orm(belongs_to, from = "client_id", to = "id", on_delete = "Cascade")]
    pub client: HasOne<super::clients::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

/// Sentinel `scope_key` for aliases visible to every client.
pub const GLOBAL_SCOPE: &str = "*";

/// Derives the `scope_key` column value from an optional client id.
pub fn scope_key(client_id: Option<i64>) -> String {
    match client_id {
        Some(id) => id.to_string(),
        None => GLOBAL_SCOPE.to_string(),
    }
}

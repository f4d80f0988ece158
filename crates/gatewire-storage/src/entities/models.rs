use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "models")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub family_id: i64,
    pub name: String,
    pub context_window: Option<i64>,
    pub max_tokens: Option<i64>,
    pub status: String,
    pub cost_in_per_million: Option<f64>,
    pub cost_out_per_million: Option<f64>,
    pub cost_reasoning_per_million: Option<f64>,
    pub capabilities: Option<Json>,
    #[sea_orm(belongs_to, from = "family_id", to = "id", on_delete = "Cascade")]
    pub family: HasOne<super::model_families::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

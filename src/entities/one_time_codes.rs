use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "one_time_codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Lower-cased email the code was issued for.
    pub subject: String,

    pub purpose: String,

    pub actor_kind: String,

    /// Six ASCII digits
    pub code: String,

    pub consumed: bool,

    /// Unix epoch milliseconds
    pub issued_at: i64,

    /// Unix epoch milliseconds
    pub expires_at: i64,

    /// JSON document attached at issuance (pending product attributes).
    #[sea_orm(column_type = "Text", nullable)]
    pub payload: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

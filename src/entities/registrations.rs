use sea_orm::entity::prelude::*;

/// Provisional record tracking how far a registrant has progressed.
/// One row per (email, actor kind).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "registrations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub email: String,

    pub actor_kind: String,

    pub name: String,

    pub phone: String,

    /// One of `RegistrationStatus`
    pub status: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sellers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub address: String,

    pub company: String,

    /// Stored lower-cased
    #[sea_orm(unique)]
    pub email: String,

    #[sea_orm(unique)]
    pub phone: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub email_verified: bool,

    pub phone_verified: bool,

    pub blocked: bool,

    pub blocked_reason: Option<String>,

    pub blocked_at: Option<String>,

    pub blocked_by: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

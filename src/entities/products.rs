use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub price: f64,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub image_url: String,

    /// One of `ProductSex`
    pub sex: String,

    /// -1 denotes one size
    pub size: i32,

    /// Units in stock, never negative.
    pub quantity: i32,

    pub brand: String,

    /// One of `ProductType`
    pub product_type: String,

    pub seller_id: i32,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cart_items::Entity")]
    CartItems,
}

impl Related<super::cart_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

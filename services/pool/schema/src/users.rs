use sea_orm::entity::prelude::*;

/// Team account. `password_hash` is stored as provided and never returned.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub team_name: String,
    pub user_name: String,
    #[sea_orm(unique)]
    pub contact_email: String,
    pub is_admin: bool,
    pub password_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;

/// Append-only audit trail. Rows are never updated or deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub code: String,
    pub action: String,
    pub acting_user: String,
    pub tester_name: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub note: Option<String>,
    pub logged_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

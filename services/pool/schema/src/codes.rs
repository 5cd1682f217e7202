use sea_orm::entity::prelude::*;

/// One EK-code. The reservation columns are populated only while
/// `state = 'RESERVED'`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    pub family: String,
    /// Origin country; `None` for COMMON codes.
    pub country: Option<String>,
    pub state: String,
    /// Insertion sequence, tie-breaker for `available_since`.
    pub seq: i64,
    /// Instant the code last (re)entered the available sequence.
    pub available_since: chrono::DateTime<chrono::Utc>,
    pub holder_id: Option<i64>,
    pub holder_name: Option<String>,
    pub tester_name: Option<String>,
    pub reserved_country: Option<String>,
    pub requested_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

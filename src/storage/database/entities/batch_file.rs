use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// File row of an import batch
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "batch_files")]
pub struct Model {
    /// Owning batch ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub batch_id: Uuid,

    /// File name, unique within the batch
    #[sea_orm(primary_key, auto_increment = false)]
    pub filename: String,

    /// Arrival order within the batch
    pub position: i32,

    pub line_count: i64,

    pub is_last_in_request: bool,

    /// Imported resources; null until reconciled
    pub success_count: Option<i64>,

    /// Rejected resources; null until reconciled
    pub error_count: Option<i64>,

    /// Error details location
    pub error_url: Option<String>,
}

/// Batch file entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Belongs to batch relation
    #[sea_orm(
        belongs_to = "super::batch::Entity",
        from = "Column::BatchId",
        to = "super::batch::Column::Id",
        on_delete = "Cascade"
    )]
    Batch,
}

impl Related<super::batch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Batch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

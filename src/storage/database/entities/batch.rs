use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Import batch database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "batches")]
pub struct Model {
    /// Batch ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Lifecycle status (`staging`, `initiated`, ...)
    pub status: String,

    /// Sum of the files' line counts
    pub total_resource_count: i64,

    /// Import job status handle, once submitted
    pub status_handle: Option<String>,

    pub total_success_count: i64,

    pub total_error_count: i64,

    /// Closed to new files, waiting for submission
    pub closed: bool,

    /// Cleared after a permanent poll failure
    pub pollable: bool,

    /// Reason polling stopped
    pub last_error: Option<String>,

    /// Optimistic concurrency token
    pub version: i64,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

/// Batch entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Files grouped into this batch
    #[sea_orm(has_many = "super::batch_file::Entity")]
    BatchFile,
}

impl Related<super::batch_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BatchFile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

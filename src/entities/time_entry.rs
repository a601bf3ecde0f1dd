//! Time entry entity - One logged work interval.
//!
//! `hours` is derived from `start_time`/`end_time` at creation (rounded to two decimals)
//! but may later be overridden by the edit dialog. `date` is the day the work counts
//! towards in reports.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Time entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "time_entries")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the work object this entry belongs to
    pub work_object_id: i64,
    /// Local start of the interval
    pub start_time: DateTime,
    /// Local end of the interval
    pub end_time: DateTime,
    /// Duration in fractional hours
    pub hours: f64,
    /// Calendar day the entry is attributed to
    pub date: Date,
    /// Optional free-text note
    pub comment: Option<String>,
    /// When the entry was created
    pub created_at: DateTimeUtc,
    /// When the entry was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `TimeEntry` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one work object
    #[sea_orm(
        belongs_to = "super::work_object::Entity",
        from = "Column::WorkObjectId",
        to = "super::work_object::Column::Id",
        on_delete = "Cascade"
    )]
    WorkObject,
}

impl Related<super::work_object::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkObject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

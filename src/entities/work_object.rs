//! Work object entity - A named project or site that time and payments are logged against.
//!
//! Names are unique per owner among non-deleted objects. Deletion is soft: the row and
//! everything logged against it stay in place with `is_deleted` set.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a work object
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ObjectStatus {
    /// Work is ongoing; offered in selection keyboards
    #[sea_orm(string_value = "active")]
    Active,
    /// Work is finished; hidden from selection keyboards but still reported
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// Work object database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_objects")]
pub struct Model {
    /// Unique identifier for the object
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning user
    pub user_id: i64,
    /// Human-readable name (e.g., "ЖК Олимпийский")
    pub name: String,
    /// Active or completed
    pub status: ObjectStatus,
    /// Soft delete flag - if true, object is hidden but data is preserved
    pub is_deleted: bool,
    /// When the object was created
    pub created_at: DateTimeUtc,
    /// When the object was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `WorkObject` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each object belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    /// One object has many time entries
    #[sea_orm(has_many = "super::time_entry::Entity")]
    TimeEntries,
    /// One object has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::time_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TimeEntries.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

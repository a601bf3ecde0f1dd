//! Payment entity - Money received for a work object.
//!
//! Amounts are stored in kopecks (1/100 ruble) as integers; conversion to rubles only
//! happens when formatting.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the work object this payment belongs to
    pub work_object_id: i64,
    /// Amount in kopecks
    pub amount: i64,
    /// Calendar day of the payment
    pub date: Date,
    /// When the payment was created
    pub created_at: DateTimeUtc,
    /// When the payment was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one work object
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

//! User entity - The identity anchor for every other record.
//!
//! Users are created lazily the first time an unseen transport identifier interacts
//! with the bot. Only the profile fields change afterwards; users are never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Internal identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user ID
    #[sea_orm(unique)]
    pub external_id: String,
    /// Discord account name
    pub username: Option<String>,
    /// Display name shown in the client, if set
    pub display_name: Option<String>,
    /// When the user first contacted the bot
    pub created_at: DateTimeUtc,
    /// When the profile fields were last refreshed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user owns many work objects
    #[sea_orm(has_many = "super::work_object::Entity")]
    WorkObjects,
}

impl Related<super::work_object::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkObjects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

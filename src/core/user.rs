//! User business logic - implicit registration and identity lookup.
//!
//! A user row is created the first time an unseen transport identifier reaches the bot.
//! Later contacts only refresh the profile fields.

use crate::{
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Profile fields reported by the transport for the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    /// Account name
    pub username: Option<String>,
    /// Display name, if the user set one
    pub display_name: Option<String>,
}

/// Finds a user by transport identifier.
pub async fn get_by_external_id<C>(db: &C, external_id: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::ExternalId.eq(external_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by transport identifier, failing with [`Error::UserNotFound`] when absent.
pub async fn require_user<C>(db: &C, external_id: &str) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    get_by_external_id(db, external_id)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            external_id: external_id.to_string(),
        })
}

/// Returns the user for `external_id`, creating it on first contact. Profile fields are
/// refreshed when they changed.
pub async fn get_or_create_user<C>(db: &C, external_id: &str, profile: Profile) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now();

    if let Some(existing) = get_by_external_id(db, external_id).await? {
        if existing.username == profile.username && existing.display_name == profile.display_name
        {
            return Ok(existing);
        }
        let mut active: user::ActiveModel = existing.into();
        active.username = Set(profile.username);
        active.display_name = Set(profile.display_name);
        active.updated_at = Set(now);
        return active.update(db).await.map_err(Into::into);
    }

    tracing::info!("Registering new user {external_id}");
    let new_user = user::ActiveModel {
        external_id: Set(external_id.to_string()),
        username: Set(profile.username),
        display_name: Set(profile.display_name),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    new_user.insert(db).await.map_err(Into::into)
}

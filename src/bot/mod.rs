//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the `WorktimeBuddy` application:
//! slash commands, routing of plain messages and button presses into the dialog engine,
//! and conversion of engine replies into Discord messages.

/// Discord command implementations (general, tracking, objects)
pub mod commands;
/// Discord event handlers (messages, button interactions)
pub mod handlers;
/// Conversion of replies into Discord messages and components
pub mod render;

use crate::{
    config::settings::TrackerSettings,
    core::user::{self, Profile},
    errors::{Error, Result},
    wizard::ConversationStore,
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
/// This structure holds the database connection, the tracker settings and the
/// in-flight conversations of every user.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Tracker behaviour settings
    pub settings: TrackerSettings,
    /// Dialog state per Discord user
    pub conversations: ConversationStore,
}

impl BotData {
    /// Creates a new `BotData` instance with no dialogs in flight.
    #[must_use]
    pub fn new(database: DatabaseConnection, settings: TrackerSettings) -> Self {
        Self {
            database,
            settings,
            conversations: ConversationStore::new(),
        }
    }
}

/// Registers the Discord user on first contact and refreshes their profile afterwards.
pub async fn register_user(db: &DatabaseConnection, author: &serenity::User) -> Result<()> {
    let profile = Profile {
        username: Some(author.name.clone()),
        display_name: author.global_name.clone(),
    };
    user::get_or_create_user(db, &author.id.to_string(), profile).await?;
    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {error:?}", ctx.command().name);
            if let Err(e) = ctx.say(error.user_message()).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Builds the poise framework and runs the Discord client until it stops.
#[instrument(skip_all)]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::start(),
                commands::help(),
                commands::cancel(),
                commands::add(),
                commands::payment(),
                commands::edit_time(),
                commands::edit_pay(),
                commands::report(),
                commands::objects(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(handlers::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    // Plain messages answer dialog steps, so message content is required
    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e:?}"))?;
    Ok(())
}

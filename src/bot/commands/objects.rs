//! Object browsing command. The list itself is driven by buttons from here on.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::{Entry, run_entry},
        },
        errors::{Error, Result},
    };

    /// Shows your work objects.
    #[poise::command(slash_command)]
    pub async fn objects(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        run_entry(ctx, Entry::Objects).await
    }
}

// Re-export all commands
pub use inner::*;

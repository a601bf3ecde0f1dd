//! Tracking commands - start the add, edit and report dialogs.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{
            BotData,
            commands::{Entry, run_entry},
        },
        errors::{Error, Result},
        wizard::Flow,
    };

    /// Logs hours worked on an object.
    #[poise::command(slash_command)]
    pub async fn add(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        run_entry(ctx, Entry::Flow(Flow::AddTime)).await
    }

    /// Records a payment received for an object.
    #[poise::command(slash_command)]
    pub async fn payment(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        run_entry(ctx, Entry::Flow(Flow::AddPayment)).await
    }

    /// Edits a time entry by its number.
    #[poise::command(slash_command)]
    pub async fn edit_time(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Entry number from /objects"] entry_id: i64,
    ) -> Result<()> {
        run_entry(ctx, Entry::EditTime(entry_id)).await
    }

    /// Edits a payment by its number.
    #[poise::command(slash_command)]
    pub async fn edit_pay(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Payment number from /objects"] payment_id: i64,
    ) -> Result<()> {
        run_entry(ctx, Entry::EditPayment(payment_id)).await
    }

    /// Builds an hours and payments report for last month or a chosen period.
    #[poise::command(slash_command)]
    pub async fn report(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        run_entry(ctx, Entry::Flow(Flow::Report)).await
    }
}

// Re-export all commands
pub use inner::*;

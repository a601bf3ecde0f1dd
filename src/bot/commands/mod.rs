//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Welcome, help and cancel
pub mod general;

/// Object browsing
pub mod objects;

/// Time, payment and report dialogs
pub mod tracking;

// Export commands
pub use general::*;
pub use objects::*;
pub use tracking::*;

use crate::{
    bot::{BotData, register_user, render},
    errors::{Error, Result},
    wizard::{Action, Flow, Input, Outcome, Reply, Turn, browse, engine},
};

/// What a slash command asks the dialog engine to do.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Entry {
    /// Show a fixed text
    Notice(&'static str),
    /// Start a flow from its first step
    Flow(Flow),
    /// Edit the given time entry
    EditTime(i64),
    /// Edit the given payment
    EditPayment(i64),
    /// Show the object list
    Objects,
    /// Cancel the dialog in flight
    Cancel,
}

/// Shared body of every slash command.
///
/// Registers the caller, takes their conversation slot, runs `entry` and stores whatever
/// conversation comes back. Any previous dialog is dropped, except that `Cancel` gets to
/// see it first.
pub(crate) async fn run_entry(ctx: poise::Context<'_, BotData, Error>, entry: Entry) -> Result<()> {
    let data = ctx.data();
    let user_id = ctx.author().id.to_string();
    register_user(&data.database, ctx.author()).await?;

    let outcome = {
        let mut slot = data.conversations.lock(&user_id).await;
        let current = slot.take();
        let turn = Turn::now(&data.database, &user_id, &data.settings);

        let result = match entry {
            Entry::Notice(text) => Ok(Outcome::finish(Reply::text(text))),
            Entry::Flow(flow) => engine::start_flow(&turn, flow).await,
            Entry::EditTime(id) => engine::start_edit_time(&turn, id).await,
            Entry::EditPayment(id) => engine::start_edit_payment(&turn, id).await,
            Entry::Objects => browse::list_objects(&turn, true).await.map(Outcome::finish),
            Entry::Cancel => engine::advance(&turn, current, Input::Action(Action::Cancel)).await,
        };
        let outcome = engine::recover(&turn, result);
        *slot = outcome.next.clone();
        outcome
    };

    if let Some(reply) = &outcome.reply {
        ctx.send(render::command_reply(reply)).await?;
    }
    Ok(())
}

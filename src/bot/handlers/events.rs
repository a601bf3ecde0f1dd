//! Message and component interaction handlers.
//!
//! Both paths take the author's conversation lock before reading their dialog state and
//! hold it until the new state is stored, so a user's inputs are processed one at a
//! time.

use crate::{
    bot::{BotData, register_user, render},
    errors::{Error, Result},
    wizard::{self, Action, Input, Outcome, Reply, Turn},
};
use poise::serenity_prelude as serenity;
use tracing::{debug, instrument, warn};

/// Entry point for every gateway event poise does not consume itself.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<()> {
    match event {
        serenity::FullEvent::Message { new_message } => on_message(ctx, new_message, data).await,
        serenity::FullEvent::InteractionCreate { interaction } => {
            match interaction.as_message_component() {
                Some(component) => on_component(ctx, component, data).await,
                None => Ok(()),
            }
        }
        _ => Ok(()),
    }
}

/// Runs one input through the wizard under the user's lock and stores the new state.
async fn dispatch(data: &BotData, user_id: &str, input: Input) -> Outcome {
    let mut slot = data.conversations.lock(user_id).await;
    let current = slot.take();
    let turn = Turn::now(&data.database, user_id, &data.settings);
    let outcome = wizard::handle(&turn, current, input).await;
    *slot = outcome.next.clone();
    outcome
}

/// Plain text answers the current dialog step. Without a dialog the message is ignored.
#[instrument(skip_all, fields(user = %message.author.id))]
async fn on_message(ctx: &serenity::Context, message: &serenity::Message, data: &BotData) -> Result<()> {
    if message.author.bot {
        return Ok(());
    }
    let user_id = message.author.id.to_string();
    if !data.conversations.is_active(&user_id).await {
        return Ok(());
    }

    debug!("Dialog input received");
    let outcome = dispatch(data, &user_id, Input::Text(message.content.clone())).await;
    if let Some(reply) = &outcome.reply {
        message
            .channel_id
            .send_message(&ctx.http, render::message(reply).reference_message(message))
            .await?;
    }
    Ok(())
}

const FOREIGN_BUTTON: &str = "🔒 Эти кнопки относятся к чужому диалогу.";

/// The user a bot message was produced for: the slash command invoker, or the author of
/// the message it replies to.
fn dialog_owner(message: &serenity::Message) -> Option<serenity::UserId> {
    #[allow(deprecated)]
    let invoker = message.interaction.as_ref().map(|i| i.user.id);
    invoker.or_else(|| message.referenced_message.as_ref().map(|m| m.author.id))
}

fn is_foreign_press(owner: Option<serenity::UserId>, presser: serenity::UserId) -> bool {
    owner.is_some_and(|owner| owner != presser)
}

/// A button click replaces the message it was attached to with the next screen.
/// Clicks on somebody else's message get a private notice and leave it untouched.
#[instrument(skip_all, fields(user = %component.user.id, custom_id = %component.data.custom_id))]
async fn on_component(
    ctx: &serenity::Context,
    component: &serenity::ComponentInteraction,
    data: &BotData,
) -> Result<()> {
    if is_foreign_press(dialog_owner(&component.message), component.user.id) {
        debug!("Button pressed on another user's message");
        let notice = serenity::CreateInteractionResponseMessage::new()
            .content(FOREIGN_BUTTON)
            .ephemeral(true);
        component
            .create_response(&ctx.http, serenity::CreateInteractionResponse::Message(notice))
            .await?;
        return Ok(());
    }

    let reply = match component.data.custom_id.parse::<Action>() {
        Ok(action) => {
            register_user(&data.database, &component.user).await?;
            let user_id = component.user.id.to_string();
            dispatch(data, &user_id, Input::Action(action)).await.reply
        }
        Err(e) => {
            warn!("Undecodable button: {e}");
            Some(Reply::text(e.user_message()))
        }
    };

    let response = match reply {
        Some(reply) => {
            serenity::CreateInteractionResponse::UpdateMessage(render::update(&reply))
        }
        None => serenity::CreateInteractionResponse::Acknowledge,
    };
    component.create_response(&ctx.http, response).await?;
    Ok(())
}

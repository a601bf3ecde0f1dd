//! Conversational data entry.
//!
//! A dialog is a [`Conversation`] moving through the steps of one flow table (see
//! [`graph`]). The transport hands every inbound message or button press to [`handle`]
//! together with the user's current conversation, and stores back whatever
//! [`Outcome::next`] says. Nothing here knows about Discord.

pub mod action;
pub mod browse;
pub mod conversation;
pub mod engine;
pub mod graph;
pub mod reply;

pub use action::{Action, DateChoice, Input, PeriodChoice};
pub use conversation::{Answers, Conversation, ConversationStore, Flow, Step};
pub use reply::{Button, Reply};

use crate::config::settings::TrackerSettings;
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Per-turn values the validators may depend on.
#[derive(Debug, Clone, Copy)]
pub struct StepEnv<'a> {
    /// Today in the configured timezone
    pub today: NaiveDate,
    /// Tracker settings
    pub settings: &'a TrackerSettings,
}

/// Everything needed to process one inbound action for one user.
#[derive(Debug, Clone, Copy)]
pub struct Turn<'a> {
    /// Database handle
    pub db: &'a DatabaseConnection,
    /// External id of the acting user
    pub user: &'a str,
    /// Date and settings
    pub env: StepEnv<'a>,
}

impl<'a> Turn<'a> {
    /// A turn dated with today's date in the configured timezone.
    #[must_use]
    pub fn now(db: &'a DatabaseConnection, user: &'a str, settings: &'a TrackerSettings) -> Self {
        Self {
            db,
            user,
            env: StepEnv {
                today: settings.today(),
                settings,
            },
        }
    }
}

/// Result of one turn: what to send and what to remember.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// Message for the user, if any
    pub reply: Option<Reply>,
    /// Conversation to store; `None` clears it
    pub next: Option<Conversation>,
}

impl Outcome {
    /// Send `reply` and keep waiting in `conversation`.
    #[must_use]
    pub const fn ask(reply: Reply, conversation: Conversation) -> Self {
        Self {
            reply: Some(reply),
            next: Some(conversation),
        }
    }

    /// Send `reply` and end the dialog.
    #[must_use]
    pub const fn finish(reply: Reply) -> Self {
        Self {
            reply: Some(reply),
            next: None,
        }
    }

    /// Nothing to say, nothing to keep.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            reply: None,
            next: None,
        }
    }
}

/// Processes one inbound input. Never fails: errors become a message and clear the
/// dialog.
///
/// Browsing buttons and the "add ... for this object" buttons replace any dialog in
/// flight; everything else is fed to the current conversation.
pub async fn handle(turn: &Turn<'_>, current: Option<Conversation>, input: Input) -> Outcome {
    let result = match input {
        Input::Action(Action::AddTimeFor(id)) => {
            engine::start_flow_for_object(turn, Flow::AddTime, id).await
        }
        Input::Action(Action::AddPaymentFor(id)) => {
            engine::start_flow_for_object(turn, Flow::AddPayment, id).await
        }
        Input::Action(
            action @ (Action::ListObjects { .. }
            | Action::ShowObject(_)
            | Action::CompleteObject(_)
            | Action::ReopenObject(_)
            | Action::DeleteObject(_)
            | Action::ConfirmDelete(_)),
        ) => browse::handle(turn, action).await.map(Outcome::finish),
        input => engine::advance(turn, current, input).await,
    };
    engine::recover(turn, result)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_browsing_drops_the_dialog() -> crate::errors::Result<()> {
        let (db, owner) = setup_with_user().await?;
        let settings = TrackerSettings::default();
        let turn = test_turn(&db, &settings, date(2024, 8, 15));
        let object = create_test_object(&db, owner.id, "Site A").await?;

        let started = engine::start_flow(&turn, Flow::AddPayment).await?;
        let outcome = handle(&turn, started.next, Input::Action(Action::ShowObject(object.id))).await;
        assert!(outcome.next.is_none());
        assert!(outcome.reply.unwrap().text.contains("Site A"));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_for_object_starts_preset_dialog() -> crate::errors::Result<()> {
        let (db, owner) = setup_with_user().await?;
        let settings = TrackerSettings::default();
        let turn = test_turn(&db, &settings, date(2024, 8, 15));
        let object = create_test_object(&db, owner.id, "Site A").await?;

        let outcome = handle(&turn, None, Input::Action(Action::AddPaymentFor(object.id))).await;
        let conversation = outcome.next.unwrap();
        assert_eq!(conversation.flow, Flow::AddPayment);
        assert_eq!(conversation.answers.object_id, Some(object.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_user_is_told_to_register() {
        let db = setup_test_db().await.unwrap();
        let settings = TrackerSettings::default();
        let turn = test_turn(&db, &settings, date(2024, 8, 15));

        let outcome = handle(
            &turn,
            None,
            Input::Action(Action::ListObjects {
                include_completed: true,
            }),
        )
        .await;
        assert!(outcome.reply.unwrap().text.contains("/start"));
    }
}

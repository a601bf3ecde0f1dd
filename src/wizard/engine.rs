//! The dialog engine: starts flows, feeds inputs through the step tables and commits the
//! collected answers.
//!
//! Validators run against a scratch copy of the answers, so a rejected input never
//! changes the stored conversation. Commits that write run inside one database
//! transaction and only touch that transaction.

use super::{
    Outcome, Turn,
    action::{Action, Input},
    conversation::{Answers, Conversation, Flow, Step},
    graph::{FlowGraph, PromptView, Transition, Verdict, graph},
    reply::Reply,
};
use crate::{
    core::{
        format::{format_currency, format_date, format_hours, format_time},
        payment, report,
        time_entry::{self, NewTimeEntry, TimeEntryUpdate},
        user::require_user,
        work_object,
    },
    entities::work_object as work_object_entity,
    errors::{Error, Result},
};
use sea_orm::{ConnectionTrait, TransactionTrait};
use std::fmt::Write;

const NOTHING_TO_CANCEL: &str = "ℹ️ Нет активного действия для отмены.";
const STALE_BUTTON: &str = "⌛ Эта кнопка больше не действует. Начните заново.";

fn rule_missing(conversation: &Conversation) -> Error {
    tracing::error!(
        "{:?} has no rule for step {:?}",
        conversation.flow,
        conversation.step
    );
    Error::MissingAnswer { field: "step" }
}

/// Renders the question for the conversation's current step. `objects` feeds the
/// object selection keyboard.
fn prompt_for(
    turn: &Turn<'_>,
    conversation: &Conversation,
    objects: &[work_object_entity::Model],
) -> Result<Reply> {
    let rule = graph(conversation.flow)
        .rule(conversation.step)
        .ok_or_else(|| rule_missing(conversation))?;
    let view = PromptView {
        answers: &conversation.answers,
        objects,
        env: &turn.env,
    };
    Ok((rule.prompt)(&view))
}

/// Like [`prompt_for`], loading the owner's active objects when the step lists them.
async fn render_step(turn: &Turn<'_>, conversation: &Conversation) -> Result<Reply> {
    if conversation.step != Step::ObjectChoice {
        return prompt_for(turn, conversation, &[]);
    }
    let owner = require_user(turn.db, turn.user).await?;
    let objects = work_object::list_for_owner(turn.db, owner.id, false).await?;
    prompt_for(turn, conversation, &objects)
}

async fn open(turn: &Turn<'_>, flow: &FlowGraph, answers: Answers, header: &str) -> Result<Outcome> {
    let conversation = Conversation::new(flow.flow, flow.first, answers);
    let reply = render_step(turn, &conversation).await?.with_header(header);
    tracing::info!("User {} started {:?}", turn.user, flow.flow);
    Ok(Outcome::ask(reply, conversation))
}

/// Starts `flow` from its first step.
pub async fn start_flow(turn: &Turn<'_>, flow: Flow) -> Result<Outcome> {
    let graph = graph(flow);
    open(turn, graph, Answers::default(), graph.title).await
}

/// Starts an add flow with the object already chosen. The object must belong to the
/// caller.
pub async fn start_flow_for_object(turn: &Turn<'_>, flow: Flow, object_id: i64) -> Result<Outcome> {
    let owner = require_user(turn.db, turn.user).await?;
    let object = work_object::require_owned(turn.db, object_id, owner.id).await?;

    let answers = Answers {
        object_id: Some(object.id),
        object_name: Some(object.name),
        ..Answers::default()
    };
    let graph = graph(flow);
    open(turn, graph, answers, graph.title).await
}

/// Starts editing one of the caller's time entries, showing its current values first.
pub async fn start_edit_time(turn: &Turn<'_>, entry_id: i64) -> Result<Outcome> {
    let owner = require_user(turn.db, turn.user).await?;
    let (entry, object) = time_entry::get_owned_time_entry(turn.db, entry_id, owner.id).await?;

    let graph = graph(Flow::EditTime);
    let mut header = format!(
        "{}\n\n📅 Дата: {}\n⏰ Часы: {}\n🏗️ Объект: {}",
        graph.title,
        format_date(entry.date),
        format_hours(entry.hours),
        object.name
    );
    if let Some(comment) = &entry.comment {
        write!(header, "\n💬 Комментарий: {comment}")?;
    }

    let answers = Answers {
        entry_id: Some(entry.id),
        ..Answers::default()
    };
    open(turn, graph, answers, &header).await
}

/// Starts editing one of the caller's payments, showing its current values first.
pub async fn start_edit_payment(turn: &Turn<'_>, payment_id: i64) -> Result<Outcome> {
    let owner = require_user(turn.db, turn.user).await?;
    let (payment, object) = payment::get_owned_payment(turn.db, payment_id, owner.id).await?;

    let graph = graph(Flow::EditPayment);
    let header = format!(
        "{}\n\n📅 Дата: {}\n💰 Сумма: {}\n🏗️ Объект: {}",
        graph.title,
        format_date(payment.date),
        format_currency(payment.amount),
        object.name
    );

    let answers = Answers {
        payment_id: Some(payment.id),
        ..Answers::default()
    };
    open(turn, graph, answers, &header).await
}

/// Acknowledges cancellation of `conversation`. The caller drops the state.
#[must_use]
pub fn cancel(conversation: &Conversation) -> Outcome {
    tracing::info!("{:?} dialog cancelled", conversation.flow);
    Outcome::finish(Reply::text(graph(conversation.flow).cancelled))
}

/// Feeds one input into the current conversation.
///
/// Without a conversation, text is ignored and buttons get a "start over" notice.
pub async fn advance(
    turn: &Turn<'_>,
    current: Option<Conversation>,
    input: Input,
) -> Result<Outcome> {
    let Some(mut conversation) = current else {
        return Ok(match input {
            Input::Action(Action::Cancel) => Outcome::finish(Reply::text(NOTHING_TO_CANCEL)),
            Input::Action(_) => Outcome::finish(Reply::text(STALE_BUTTON)),
            Input::Text(_) => Outcome::idle(),
        });
    };

    if input == Input::Action(Action::Cancel) {
        return Ok(cancel(&conversation));
    }

    let rule = graph(conversation.flow)
        .rule(conversation.step)
        .ok_or_else(|| rule_missing(&conversation))?;

    let mut scratch = conversation.answers.clone();
    let transition = match (rule.accept)(&mut scratch, &input, &turn.env) {
        Verdict::Accept => rule.then,
        Verdict::Jump(transition) => transition,
        Verdict::Retry(message) => {
            tracing::debug!(
                "Rejected input for {:?}/{:?}",
                conversation.flow,
                conversation.step
            );
            let mut reply = render_step(turn, &conversation).await?;
            reply.text = message;
            return Ok(Outcome::ask(reply, conversation));
        }
        Verdict::Reprompt => {
            let reply = render_step(turn, &conversation).await?;
            return Ok(Outcome::ask(reply, conversation));
        }
    };

    conversation.answers = scratch;
    follow(turn, conversation, transition).await
}

/// Resolves `transition` until the dialog either waits for input or is committed.
async fn follow(
    turn: &Turn<'_>,
    mut conversation: Conversation,
    mut transition: Transition,
) -> Result<Outcome> {
    loop {
        match transition {
            Transition::Goto(step) => {
                conversation.step = step;
                tracing::debug!("{:?} moved to {step:?}", conversation.flow);
                let reply = render_step(turn, &conversation).await?;
                return Ok(Outcome::ask(reply, conversation));
            }
            Transition::AfterObject => transition = graph(conversation.flow).after_object,
            Transition::ChooseObject => {
                if conversation.answers.object_id.is_some() {
                    transition = Transition::AfterObject;
                    continue;
                }

                let owner = require_user(turn.db, turn.user).await?;
                let objects = work_object::list_for_owner(turn.db, owner.id, false).await?;
                conversation.step = if objects.is_empty() {
                    Step::ObjectName
                } else {
                    Step::ObjectChoice
                };
                let reply = prompt_for(turn, &conversation, &objects)?;
                return Ok(Outcome::ask(reply, conversation));
            }
            Transition::Commit => return commit(turn, &conversation.answers, conversation.flow).await,
        }
    }
}

async fn commit(turn: &Turn<'_>, answers: &Answers, flow: Flow) -> Result<Outcome> {
    let reply = match flow {
        Flow::AddTime => commit_time_entry(turn, answers).await?,
        Flow::AddPayment => commit_payment(turn, answers).await?,
        Flow::EditTime => commit_time_entry_update(turn, answers).await?,
        Flow::EditPayment => commit_payment_update(turn, answers).await?,
        Flow::Report => commit_report(turn, answers).await?,
    };
    Ok(Outcome::finish(reply))
}

/// The object an add flow targets: the chosen one (ownership checked) or the typed name,
/// created on first use.
async fn resolve_object<C>(db: &C, owner_id: i64, answers: &Answers) -> Result<work_object_entity::Model>
where
    C: ConnectionTrait,
{
    match (answers.object_id, answers.object_name.as_deref()) {
        (Some(object_id), _) => work_object::require_owned(db, object_id, owner_id).await,
        (None, Some(name)) => work_object::resolve_or_create(db, owner_id, name).await,
        (None, None) => Err(Error::MissingAnswer { field: "object" }),
    }
}

async fn commit_time_entry(turn: &Turn<'_>, answers: &Answers) -> Result<Reply> {
    let date = answers.date.ok_or(Error::MissingAnswer { field: "date" })?;
    let start = answers.start.ok_or(Error::MissingAnswer { field: "start" })?;
    let end = answers.end.ok_or(Error::MissingAnswer { field: "end" })?;
    let hours = answers.hours.ok_or(Error::MissingAnswer { field: "hours" })?;

    let txn = turn.db.begin().await?;
    let owner = require_user(&txn, turn.user).await?;
    let object = resolve_object(&txn, owner.id, answers).await?;
    let entry = time_entry::create_time_entry(
        &txn,
        object.id,
        NewTimeEntry {
            start_time: start,
            end_time: end,
            hours,
            date,
            comment: answers.comment.clone(),
        },
    )
    .await?;
    txn.commit().await?;

    let mut text = format!(
        "✅ **Часы работы добавлены!**\n\n📅 Дата: {}\n🕐 Время: {} - {}\n⏰ Часы: {}\n🏗️ Объект: {}",
        format_date(entry.date),
        format_time(entry.start_time),
        format_time(entry.end_time),
        format_hours(entry.hours),
        object.name
    );
    if let Some(comment) = &entry.comment {
        write!(text, "\n💬 Комментарий: {comment}")?;
    }
    Ok(Reply::text(text))
}

async fn commit_payment(turn: &Turn<'_>, answers: &Answers) -> Result<Reply> {
    let amount = answers
        .amount_kopecks
        .ok_or(Error::MissingAnswer { field: "amount" })?;
    let date = answers.date.ok_or(Error::MissingAnswer { field: "date" })?;

    let txn = turn.db.begin().await?;
    let owner = require_user(&txn, turn.user).await?;
    let object = resolve_object(&txn, owner.id, answers).await?;
    let payment = payment::create_payment(&txn, object.id, amount, date).await?;
    txn.commit().await?;

    Ok(Reply::text(format!(
        "✅ **Оплата добавлена!**\n\n📅 Дата: {}\n💰 Сумма: {}\n🏗️ Объект: {}",
        format_date(payment.date),
        format_currency(payment.amount),
        object.name
    )))
}

async fn commit_time_entry_update(turn: &Turn<'_>, answers: &Answers) -> Result<Reply> {
    let entry_id = answers.entry_id.ok_or(Error::MissingAnswer { field: "entry_id" })?;
    let hours = answers.hours.ok_or(Error::MissingAnswer { field: "hours" })?;
    let date = answers.date.ok_or(Error::MissingAnswer { field: "date" })?;

    let txn = turn.db.begin().await?;
    let owner = require_user(&txn, turn.user).await?;
    let (_, object) = time_entry::get_owned_time_entry(&txn, entry_id, owner.id).await?;
    let entry = time_entry::update_time_entry(
        &txn,
        entry_id,
        TimeEntryUpdate {
            hours,
            date,
            comment: answers.comment.clone(),
        },
    )
    .await?;
    txn.commit().await?;

    let mut text = format!(
        "✅ **Запись обновлена!**\n\n📅 Дата: {}\n⏰ Часы: {}\n🏗️ Объект: {}",
        format_date(entry.date),
        format_hours(entry.hours),
        object.name
    );
    if let Some(comment) = &entry.comment {
        write!(text, "\n💬 Комментарий: {comment}")?;
    }
    Ok(Reply::text(text))
}

async fn commit_payment_update(turn: &Turn<'_>, answers: &Answers) -> Result<Reply> {
    let payment_id = answers
        .payment_id
        .ok_or(Error::MissingAnswer { field: "payment_id" })?;
    let amount = answers
        .amount_kopecks
        .ok_or(Error::MissingAnswer { field: "amount" })?;
    let date = answers.date.ok_or(Error::MissingAnswer { field: "date" })?;

    let txn = turn.db.begin().await?;
    let owner = require_user(&txn, turn.user).await?;
    let (_, object) = payment::get_owned_payment(&txn, payment_id, owner.id).await?;
    let payment = payment::update_payment(&txn, payment_id, amount, date).await?;
    txn.commit().await?;

    Ok(Reply::text(format!(
        "✅ **Запись оплаты обновлена!**\n\n📅 Дата: {}\n💰 Сумма: {}\n🏗️ Объект: {}",
        format_date(payment.date),
        format_currency(payment.amount),
        object.name
    )))
}

async fn commit_report(turn: &Turn<'_>, answers: &Answers) -> Result<Reply> {
    let start = answers
        .range_start
        .ok_or(Error::MissingAnswer { field: "range_start" })?;
    let end = answers
        .range_end
        .ok_or(Error::MissingAnswer { field: "range_end" })?;

    let owner = require_user(turn.db, turn.user).await?;
    let report = report::build_period_report(turn.db, owner.id, start, end).await?;
    tracing::info!("Rendered report for user {} over {start}..={end}", turn.user);
    Ok(Reply::text(report::render_report_message(&report)))
}

/// Turns a failed step into a user-facing message and drops the dialog.
#[must_use]
pub fn recover(turn: &Turn<'_>, result: Result<Outcome>) -> Outcome {
    match result {
        Ok(outcome) => outcome,
        Err(e) => {
            if e.is_lookup() {
                tracing::warn!("Dialog for user {} stopped: {e}", turn.user);
            } else {
                tracing::error!("Dialog for user {} failed: {e}", turn.user);
            }
            Outcome::finish(Reply::text(e.user_message()))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        config::settings::TrackerSettings,
        entities::{Payment, TimeEntry, WorkObject, work_object::ObjectStatus},
        test_utils::*,
        wizard::{StepEnv, action::DateChoice, action::PeriodChoice},
    };
    use sea_orm::{DatabaseConnection, EntityTrait};

    async fn say(turn: &Turn<'_>, conversation: Conversation, text: &str) -> Result<Outcome> {
        advance(turn, Some(conversation), Input::Text(text.to_string())).await
    }

    async fn press(turn: &Turn<'_>, conversation: Conversation, action: Action) -> Result<Outcome> {
        advance(turn, Some(conversation), Input::Action(action)).await
    }

    fn text_of(outcome: &Outcome) -> &str {
        outcome.reply.as_ref().map_or("", |r| r.text.as_str())
    }

    fn other_turn<'a>(db: &'a DatabaseConnection, settings: &'a TrackerSettings) -> Turn<'a> {
        Turn {
            db,
            user: "other",
            env: StepEnv {
                today: date(2024, 8, 15),
                settings,
            },
        }
    }

    #[tokio::test]
    async fn test_add_time_end_to_end() -> Result<()> {
        let (db, owner) = setup_with_user().await?;
        let settings = TrackerSettings::default();
        let turn = test_turn(&db, &settings, date(2024, 8, 15));

        let outcome = start_flow(&turn, Flow::AddTime).await?;
        assert!(text_of(&outcome).starts_with("⏰ **Добавление часов работы**"));
        let conversation = outcome.next.unwrap();
        assert_eq!(conversation.step, Step::Date);

        let outcome = press(&turn, conversation, Action::PickDate(DateChoice::Today)).await?;
        let outcome = say(&turn, outcome.next.unwrap(), "09:00").await?;
        let outcome = say(&turn, outcome.next.unwrap(), "17:30").await?;

        // No objects yet: straight to typing a name
        let conversation = outcome.next.unwrap();
        assert_eq!(conversation.step, Step::ObjectName);

        let outcome = say(&turn, conversation, "Site A").await?;
        assert_eq!(outcome.next.as_ref().map(|c| c.step), Some(Step::Comment));
        let outcome = say(&turn, outcome.next.unwrap(), "no").await?;

        assert!(outcome.next.is_none());
        let text = text_of(&outcome);
        assert!(text.contains("8:30 часов"), "{text}");
        assert!(text.contains("Site A"));
        assert!(text.contains("09:00 - 17:30"));
        assert!(!text.contains("Комментарий"));

        let entries = TimeEntry::find().all(&db).await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].hours, 8.5);
        assert_eq!(entries[0].date, date(2024, 8, 15));
        assert_eq!(entries[0].comment, None);

        let objects = work_object::list_for_owner(&db, owner.id, true).await?;
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].name, "Site A");
        assert_eq!(objects[0].status, ObjectStatus::Active);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_end_time_keeps_state() -> Result<()> {
        let (db, _) = setup_with_user().await?;
        let settings = TrackerSettings::default();
        let turn = test_turn(&db, &settings, date(2024, 8, 15));

        let outcome = start_flow(&turn, Flow::AddTime).await?;
        let outcome = say(&turn, outcome.next.unwrap(), "вчера").await?;
        let outcome = say(&turn, outcome.next.unwrap(), "9").await?;
        let before = outcome.next.unwrap();
        assert_eq!(before.step, Step::EndTime);

        let outcome = say(&turn, before.clone(), "08:00").await?;
        assert!(text_of(&outcome).contains("позже времени начала"));
        assert_eq!(outcome.next.as_ref(), Some(&before));

        let outcome = say(&turn, before.clone(), "25:00").await?;
        assert_eq!(outcome.next.as_ref(), Some(&before));

        // A button that belongs to another step changes nothing either
        let outcome = press(&turn, before.clone(), Action::ManualObject).await?;
        assert_eq!(outcome.next.as_ref(), Some(&before));
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_clears_state_from_any_step() -> Result<()> {
        let (db, _) = setup_with_user().await?;
        let settings = TrackerSettings::default();
        let turn = test_turn(&db, &settings, date(2024, 8, 15));

        let outcome = start_flow(&turn, Flow::AddTime).await?;
        let outcome = say(&turn, outcome.next.unwrap(), "сегодня").await?;
        let outcome = press(&turn, outcome.next.unwrap(), Action::Cancel).await?;
        assert!(outcome.next.is_none());
        assert_eq!(text_of(&outcome), "❌ Добавление часов отменено.");

        let outcome = start_flow(&turn, Flow::Report).await?;
        let outcome = press(&turn, outcome.next.unwrap(), Action::Cancel).await?;
        assert_eq!(text_of(&outcome), "❌ Генерация отчёта отменена.");

        let outcome = advance(&turn, None, Input::Action(Action::Cancel)).await?;
        assert_eq!(text_of(&outcome), NOTHING_TO_CANCEL);
        Ok(())
    }

    #[tokio::test]
    async fn test_text_without_dialog_is_ignored() -> Result<()> {
        let (db, _) = setup_with_user().await?;
        let settings = TrackerSettings::default();
        let turn = test_turn(&db, &settings, date(2024, 8, 15));

        let outcome = advance(&turn, None, Input::Text("hello".to_string())).await?;
        assert!(outcome.reply.is_none());
        assert!(outcome.next.is_none());

        let outcome = advance(&turn, None, Input::Action(Action::SelectObject(1))).await?;
        assert_eq!(text_of(&outcome), STALE_BUTTON);
        Ok(())
    }

    #[tokio::test]
    async fn test_active_objects_are_offered() -> Result<()> {
        let (db, owner) = setup_with_user().await?;
        let settings = TrackerSettings::default();
        let turn = test_turn(&db, &settings, date(2024, 8, 15));
        let object = create_test_object(&db, owner.id, "Дача").await?;
        let finished = create_test_object(&db, owner.id, "Old").await?;
        work_object::set_status(&db, finished.id, owner.id, ObjectStatus::Completed).await?;

        let outcome = start_flow(&turn, Flow::AddTime).await?;
        let outcome = press(&turn, outcome.next.unwrap(), Action::PickDate(DateChoice::Today)).await?;
        let outcome = say(&turn, outcome.next.unwrap(), "10:00").await?;
        let outcome = say(&turn, outcome.next.unwrap(), "12:15").await?;

        assert_eq!(outcome.next.as_ref().map(|c| c.step), Some(Step::ObjectChoice));
        let keyboard = &outcome.reply.as_ref().unwrap().keyboard;
        assert!(keyboard.iter().any(|b| b.action == Action::SelectObject(object.id)));
        assert!(!keyboard.iter().any(|b| b.action == Action::SelectObject(finished.id)));
        assert!(keyboard.iter().any(|b| b.action == Action::ManualObject));

        let outcome = press(&turn, outcome.next.unwrap(), Action::SelectObject(object.id)).await?;
        let outcome = say(&turn, outcome.next.unwrap(), "Покраска стен").await?;
        assert!(text_of(&outcome).contains("💬 Комментарий: Покраска стен"));

        let entries = time_entry::entries_for_object(&db, object.id).await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].hours, 2.25);
        Ok(())
    }

    #[tokio::test]
    async fn test_preset_object_skips_object_step() -> Result<()> {
        let (db, owner) = setup_with_user().await?;
        let settings = TrackerSettings::default();
        let turn = test_turn(&db, &settings, date(2024, 8, 15));
        let object = create_test_object(&db, owner.id, "Site A").await?;
        create_test_object(&db, owner.id, "Site B").await?;

        let outcome = start_flow_for_object(&turn, Flow::AddTime, object.id).await?;
        assert!(text_of(&outcome).contains("Site A"));
        let outcome = press(&turn, outcome.next.unwrap(), Action::PickDate(DateChoice::Today)).await?;
        let outcome = say(&turn, outcome.next.unwrap(), "08:00").await?;
        let outcome = say(&turn, outcome.next.unwrap(), "09:00").await?;
        assert_eq!(outcome.next.as_ref().map(|c| c.step), Some(Step::Comment));

        // Someone else's object cannot be preset
        let foreign = other_turn(&db, &settings);
        create_test_user(&db, "other").await?;
        let result = start_flow_for_object(&foreign, Flow::AddTime, object.id).await;
        assert!(matches!(result, Err(Error::ObjectNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_payment_with_manual_date() -> Result<()> {
        let (db, owner) = setup_with_user().await?;
        let settings = TrackerSettings::default();
        let turn = test_turn(&db, &settings, date(2024, 8, 20));

        let outcome = start_flow(&turn, Flow::AddPayment).await?;
        assert_eq!(outcome.next.as_ref().map(|c| c.step), Some(Step::Amount));

        let outcome = say(&turn, outcome.next.unwrap(), "abc").await?;
        assert!(text_of(&outcome).contains("целое положительное число"));
        let outcome = say(&turn, outcome.next.unwrap(), "1500").await?;
        let outcome = press(&turn, outcome.next.unwrap(), Action::PickDate(DateChoice::Manual)).await?;
        assert_eq!(outcome.next.as_ref().map(|c| c.step), Some(Step::ManualDate));
        let outcome = say(&turn, outcome.next.unwrap(), "15.08.24").await?;
        assert_eq!(outcome.next.as_ref().map(|c| c.step), Some(Step::ObjectName));
        let outcome = say(&turn, outcome.next.unwrap(), "Site B").await?;

        assert!(outcome.next.is_none());
        assert!(text_of(&outcome).contains("💰 Сумма: 1 500 р."));

        let payments = Payment::find().all(&db).await?;
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].amount, 150_000);
        assert_eq!(payments[0].date, date(2024, 8, 15));

        let object = work_object::get_by_name(&db, owner.id, "Site B").await?;
        assert_eq!(object.map(|o| o.id), Some(payments[0].work_object_id));
        Ok(())
    }

    #[tokio::test]
    async fn test_foreign_object_selection_aborts_without_writes() -> Result<()> {
        let (db, _) = setup_with_user().await?;
        let settings = TrackerSettings::default();
        let turn = test_turn(&db, &settings, date(2024, 8, 20));
        let other = create_test_user(&db, "other").await?;
        let theirs = create_test_object(&db, other.id, "Theirs").await?;

        let conversation = Conversation::new(
            Flow::AddPayment,
            Step::ObjectChoice,
            Answers {
                amount_kopecks: Some(10_000),
                date: Some(date(2024, 8, 20)),
                ..Answers::default()
            },
        );
        let result = press(&turn, conversation, Action::SelectObject(theirs.id)).await;
        assert!(matches!(result, Err(Error::ObjectNotFound { .. })));

        let outcome = recover(&turn, result);
        assert!(outcome.next.is_none());
        assert_eq!(text_of(&outcome), "❌ Объект не найден.");
        assert!(Payment::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_commit_rolls_back_created_object() -> Result<()> {
        let (db, _) = setup_with_user().await?;
        let settings = TrackerSettings::default();
        let turn = test_turn(&db, &settings, date(2024, 8, 20));
        let day = date(2024, 8, 20);

        // The object is inserted first, then the zero-length entry is refused
        let conversation = Conversation::new(
            Flow::AddTime,
            Step::Comment,
            Answers {
                date: Some(day),
                start: Some(at(day, 9, 0)),
                end: Some(at(day, 9, 0)),
                hours: Some(0.0),
                object_name: Some("New".to_string()),
                ..Answers::default()
            },
        );
        let result = say(&turn, conversation, "no").await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let outcome = recover(&turn, result);
        assert!(outcome.next.is_none());
        assert!(WorkObject::find().all(&db).await?.is_empty());
        assert!(TimeEntry::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_time_entry() -> Result<()> {
        let (db, owner) = setup_with_user().await?;
        let settings = TrackerSettings::default();
        let turn = test_turn(&db, &settings, date(2024, 8, 20));
        let object = create_test_object(&db, owner.id, "Site A").await?;
        let entry = create_test_entry(&db, object.id, date(2024, 8, 1), 2.0).await?;
        create_test_user(&db, "other").await?;

        let denied = start_edit_time(&other_turn(&db, &settings), entry.id).await;
        assert!(matches!(denied, Err(Error::AccessDenied)));

        let outcome = start_edit_time(&turn, entry.id).await?;
        assert!(text_of(&outcome).contains("⏰ Часы: 2:00 часа"));
        let outcome = say(&turn, outcome.next.unwrap(), "6.5").await?;
        assert_eq!(outcome.next.as_ref().map(|c| c.step), Some(Step::Hours));
        let outcome = say(&turn, outcome.next.unwrap(), "6").await?;
        let outcome = say(&turn, outcome.next.unwrap(), "02.08.24").await?;
        let outcome = say(&turn, outcome.next.unwrap(), "удалить").await?;

        assert!(outcome.next.is_none());
        assert!(text_of(&outcome).starts_with("✅ **Запись обновлена!**"));

        let updated = time_entry::get_time_entry(&db, entry.id).await?.unwrap();
        assert_eq!(updated.hours, 6.0);
        assert_eq!(updated.date, date(2024, 8, 2));
        assert_eq!(updated.comment, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_edit_payment() -> Result<()> {
        let (db, owner) = setup_with_user().await?;
        let settings = TrackerSettings::default();
        let turn = test_turn(&db, &settings, date(2024, 8, 20));
        let object = create_test_object(&db, owner.id, "Site A").await?;
        let payment = create_test_payment(&db, object.id, date(2024, 8, 1), 10_000).await?;

        let missing = start_edit_payment(&turn, 4242).await;
        assert!(matches!(missing, Err(Error::PaymentNotFound { .. })));

        let outcome = start_edit_payment(&turn, payment.id).await?;
        assert!(text_of(&outcome).contains("💰 Сумма: 100 р."));
        let outcome = say(&turn, outcome.next.unwrap(), "2500").await?;
        let outcome = say(&turn, outcome.next.unwrap(), "сегодня").await?;
        // Edit dates are strict DD.MM.YY
        assert_eq!(outcome.next.as_ref().map(|c| c.step), Some(Step::Date));
        let outcome = say(&turn, outcome.next.unwrap(), "03.08.2024").await?;

        assert!(outcome.next.is_none());
        let updated = payment::get_payment(&db, payment.id).await?.unwrap();
        assert_eq!(updated.amount, 250_000);
        assert_eq!(updated.date, date(2024, 8, 3));
        Ok(())
    }

    #[tokio::test]
    async fn test_report_custom_range() -> Result<()> {
        let (db, owner) = setup_with_user().await?;
        let settings = TrackerSettings::default();
        let turn = test_turn(&db, &settings, date(2024, 9, 10));
        let object = create_test_object(&db, owner.id, "A").await?;
        create_test_entry(&db, object.id, date(2024, 8, 12), 4.0).await?;

        let outcome = start_flow(&turn, Flow::Report).await?;
        let at_period = outcome.next.unwrap();

        // Text is not a period choice
        let outcome = say(&turn, at_period.clone(), "август").await?;
        assert_eq!(outcome.next.as_ref(), Some(&at_period));

        let outcome =
            press(&turn, at_period, Action::ReportPeriod(PeriodChoice::Custom)).await?;
        let outcome = say(&turn, outcome.next.unwrap(), "10.08.24").await?;
        let at_end = outcome.next.unwrap();
        assert_eq!(at_end.step, Step::RangeEnd);

        let outcome = say(&turn, at_end.clone(), "01.08.24").await?;
        assert!(text_of(&outcome).contains("не может быть раньше"));
        assert_eq!(outcome.next.as_ref(), Some(&at_end));

        let outcome = say(&turn, at_end, "20.08.24").await?;
        assert!(outcome.next.is_none());
        let text = text_of(&outcome);
        assert!(text.starts_with("📊 **Отчёт за период 10.08.24 - 20.08.24**"), "{text}");
        assert!(text.contains("A — 4:00 часа (1 д. работы)"));
        assert!(text.ends_with("1 день из 11 дней в августе 2024"));
        Ok(())
    }

    #[tokio::test]
    async fn test_report_last_month() -> Result<()> {
        let (db, owner) = setup_with_user().await?;
        let settings = TrackerSettings::default();
        let turn = test_turn(&db, &settings, date(2024, 9, 10));
        create_test_object(&db, owner.id, "A").await?;

        let outcome = start_flow(&turn, Flow::Report).await?;
        let outcome = press(
            &turn,
            outcome.next.unwrap(),
            Action::ReportPeriod(PeriodChoice::LastMonth),
        )
        .await?;
        assert!(outcome.next.is_none());
        assert!(text_of(&outcome).contains("01.08.24 - 31.08.24"));
        assert!(text_of(&outcome).contains("A — 0ч — 0 р."));
        Ok(())
    }
}

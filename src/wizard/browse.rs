//! Object browsing: list, detail view, status toggles and deletion.
//!
//! These screens are single-shot. They never start a dialog, and the caller drops any
//! dialog that was in flight before showing them.

use super::{Turn, action::Action, reply::Reply};
use crate::{
    core::{
        format::{format_currency, format_date, format_hours},
        user::require_user,
        work_object,
    },
    entities::{work_object as work_object_entity, work_object::ObjectStatus},
    errors::{Error, Result},
};
use std::fmt::Write;

const fn status_glyph(status: ObjectStatus) -> &'static str {
    match status {
        ObjectStatus::Active => "🔵",
        ObjectStatus::Completed => "🟢",
    }
}

const fn status_label(status: ObjectStatus) -> &'static str {
    match status {
        ObjectStatus::Active => "Активен",
        ObjectStatus::Completed => "Завершён",
    }
}

/// The caller's objects as buttons, with a filter toggle.
pub async fn list_objects(turn: &Turn<'_>, include_completed: bool) -> Result<Reply> {
    let owner = require_user(turn.db, turn.user).await?;
    let objects = work_object::list_for_owner(turn.db, owner.id, include_completed).await?;

    let mut reply = if objects.is_empty() {
        Reply::text(
            "📝 У вас пока нет объектов.\n\n\
             Создайте первый объект, добавив часы работы или оплату.",
        )
    } else {
        let scope = if include_completed { "всех" } else { "активных" };
        Reply::text(format!("🏗️ Ваши объекты ({scope}):"))
    };

    for object in objects.iter().take(turn.env.settings.max_object_buttons) {
        reply = reply.button(
            format!("{} {}", status_glyph(object.status), object.name),
            Action::ShowObject(object.id),
        );
    }

    Ok(if include_completed {
        reply.button(
            "🔵 Только активные",
            Action::ListObjects {
                include_completed: false,
            },
        )
    } else {
        reply.button(
            "🔵🟢 Все объекты",
            Action::ListObjects {
                include_completed: true,
            },
        )
    })
}

fn detail_text(summary: &work_object::ObjectSummary) -> Result<String> {
    let object = &summary.object;
    let mut text = format!(
        "🏗️ **{}**\nСтатус: {} {}\nВсего часов: {}\nВсего оплат: {}\nДата создания: {}",
        object.name,
        status_glyph(object.status),
        status_label(object.status),
        format_hours(summary.total_hours),
        format_currency(summary.total_payments),
        format_date(object.created_at.date_naive())
    );

    if let Some(first) = summary.first_work_date() {
        write!(text, "\nНачало работ: {}", format_date(first))?;
    }
    if let (ObjectStatus::Completed, Some(last)) = (object.status, summary.last_work_date()) {
        write!(text, "\nЗавершение: {}", format_date(last))?;
    }

    if !summary.entries.is_empty() {
        text.push_str("\n\n🕒 **Записи работ:**");
        for entry in &summary.entries {
            write!(
                text,
                "\n• #{} {} — {}",
                entry.id,
                format_date(entry.date),
                format_hours(entry.hours)
            )?;
            if let Some(comment) = &entry.comment {
                write!(text, " ({comment})")?;
            }
        }
    }
    if !summary.payments.is_empty() {
        text.push_str("\n\n💰 **Записи оплат:**");
        for payment in &summary.payments {
            write!(
                text,
                "\n• #{} {} — {}",
                payment.id,
                format_date(payment.date),
                format_currency(payment.amount)
            )?;
        }
    }
    if !summary.entries.is_empty() || !summary.payments.is_empty() {
        text.push_str("\n\nИзменить запись: `/edit_time <номер>` или `/edit_pay <номер>`");
    }
    Ok(text)
}

fn detail_keyboard(reply: Reply, object: &work_object_entity::Model) -> Reply {
    let reply = reply
        .button("➕ Добавить часы", Action::AddTimeFor(object.id))
        .button("💰 Добавить оплату", Action::AddPaymentFor(object.id));
    let reply = match object.status {
        ObjectStatus::Active => reply.button("✅ Завершить объект", Action::CompleteObject(object.id)),
        ObjectStatus::Completed => reply.button("🔄 Открыть заново", Action::ReopenObject(object.id)),
    };
    reply
        .button("🗑️ Удалить объект", Action::DeleteObject(object.id))
        .button(
            "⬅️ Назад",
            Action::ListObjects {
                include_completed: true,
            },
        )
}

/// Detail view of one of the caller's objects.
pub async fn show_object(turn: &Turn<'_>, object_id: i64) -> Result<Reply> {
    let owner = require_user(turn.db, turn.user).await?;
    let summary = work_object::object_summary(turn.db, object_id, owner.id).await?;
    let reply = Reply::text(detail_text(&summary)?);
    Ok(detail_keyboard(reply, &summary.object))
}

/// Completes or reopens an object, then shows it again under a short notice.
pub async fn change_status(turn: &Turn<'_>, object_id: i64, status: ObjectStatus) -> Result<Reply> {
    let owner = require_user(turn.db, turn.user).await?;
    work_object::set_status(turn.db, object_id, owner.id, status)
        .await?
        .ok_or(Error::ObjectNotFound { id: object_id })?;

    let notice = match status {
        ObjectStatus::Active => "🔄 Объект открыт заново",
        ObjectStatus::Completed => "✅ Объект завершён",
    };
    Ok(show_object(turn, object_id).await?.with_header(notice))
}

/// Asks for confirmation before deleting.
pub async fn ask_delete(turn: &Turn<'_>, object_id: i64) -> Result<Reply> {
    let owner = require_user(turn.db, turn.user).await?;
    let object = work_object::require_owned(turn.db, object_id, owner.id).await?;

    Ok(Reply::text(format!(
        "🗑️ **Удаление объекта**\n\n\
         Вы действительно хотите удалить объект **«{}»**?\n\n\
         ⚠️ Это действие нельзя отменить!",
        object.name
    ))
    .button("🗑️ Да, удалить", Action::ConfirmDelete(object.id))
    .button("❌ Отмена", Action::ShowObject(object.id)))
}

/// Soft-deletes the object and returns to the list.
pub async fn confirm_delete(turn: &Turn<'_>, object_id: i64) -> Result<Reply> {
    let owner = require_user(turn.db, turn.user).await?;
    if !work_object::soft_delete(turn.db, object_id, owner.id).await? {
        return Err(Error::ObjectNotFound { id: object_id });
    }
    Ok(list_objects(turn, true).await?.with_header("🗑️ Объект удалён"))
}

/// Routes a browsing action. Dialog actions are not handled here.
pub async fn handle(turn: &Turn<'_>, action: Action) -> Result<Reply> {
    match action {
        Action::ListObjects { include_completed } => list_objects(turn, include_completed).await,
        Action::ShowObject(id) => show_object(turn, id).await,
        Action::CompleteObject(id) => change_status(turn, id, ObjectStatus::Completed).await,
        Action::ReopenObject(id) => change_status(turn, id, ObjectStatus::Active).await,
        Action::DeleteObject(id) => ask_delete(turn, id).await,
        Action::ConfirmDelete(id) => confirm_delete(turn, id).await,
        other => Err(Error::UnknownAction {
            payload: other.to_string(),
        }),
    }
}

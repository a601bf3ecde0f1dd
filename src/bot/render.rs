//! Turns dialog replies into Discord messages.
//!
//! Discord caps message content at 2000 characters, button labels at 80, and a message
//! at five action rows of five buttons each.

use crate::wizard::{Action, Button, Reply};
use poise::serenity_prelude as serenity;

const MAX_CONTENT_CHARS: usize = 2000;
const MAX_LABEL_CHARS: usize = 80;
const BUTTONS_PER_ROW: usize = 5;
const MAX_ROWS: usize = 5;

/// Cuts `text` to at most `limit` characters, marking the cut with an ellipsis.
#[must_use]
pub fn clamp(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut clamped: String = text.chars().take(limit.saturating_sub(1)).collect();
    clamped.push('…');
    clamped
}

const fn style(action: Action) -> serenity::ButtonStyle {
    match action {
        Action::Cancel | Action::DeleteObject(_) | Action::ConfirmDelete(_) => {
            serenity::ButtonStyle::Danger
        }
        Action::SelectObject(_) | Action::ShowObject(_) => serenity::ButtonStyle::Primary,
        _ => serenity::ButtonStyle::Secondary,
    }
}

fn button(button: &Button) -> serenity::CreateButton {
    serenity::CreateButton::new(button.action.to_string())
        .label(clamp(&button.label, MAX_LABEL_CHARS))
        .style(style(button.action))
}

/// Lays buttons out in rows; anything past the last row is dropped.
#[must_use]
pub fn action_rows(keyboard: &[Button]) -> Vec<serenity::CreateActionRow> {
    if keyboard.len() > BUTTONS_PER_ROW * MAX_ROWS {
        tracing::warn!(
            "Keyboard with {} buttons truncated to {}",
            keyboard.len(),
            BUTTONS_PER_ROW * MAX_ROWS
        );
    }
    keyboard
        .chunks(BUTTONS_PER_ROW)
        .take(MAX_ROWS)
        .map(|row| serenity::CreateActionRow::Buttons(row.iter().map(button).collect()))
        .collect()
}

/// Reply to a slash command.
#[must_use]
pub fn command_reply(reply: &Reply) -> poise::CreateReply {
    poise::CreateReply::default()
        .content(clamp(&reply.text, MAX_CONTENT_CHARS))
        .components(action_rows(&reply.keyboard))
}

/// A new channel message.
#[must_use]
pub fn message(reply: &Reply) -> serenity::CreateMessage {
    serenity::CreateMessage::new()
        .content(clamp(&reply.text, MAX_CONTENT_CHARS))
        .components(action_rows(&reply.keyboard))
}

/// Replacement content for the message whose button was pressed.
#[must_use]
pub fn update(reply: &Reply) -> serenity::CreateInteractionResponseMessage {
    serenity::CreateInteractionResponseMessage::new()
        .content(clamp(&reply.text, MAX_CONTENT_CHARS))
        .components(action_rows(&reply.keyboard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_counts_characters() {
        assert_eq!(clamp("короткий", 20), "короткий");
        let long = "ж".repeat(2500);
        let clamped = clamp(&long, MAX_CONTENT_CHARS);
        assert_eq!(clamped.chars().count(), MAX_CONTENT_CHARS);
        assert!(clamped.ends_with('…'));
    }

    #[test]
    fn test_rows_are_chunked_and_capped() {
        let keyboard: Vec<Button> = (0..7)
            .map(|id| Button::new(format!("#{id}"), Action::ShowObject(id)))
            .collect();
        assert_eq!(action_rows(&keyboard).len(), 2);

        let keyboard: Vec<Button> = (0..40)
            .map(|id| Button::new(format!("#{id}"), Action::ShowObject(id)))
            .collect();
        assert_eq!(action_rows(&keyboard).len(), MAX_ROWS);

        assert!(action_rows(&[]).is_empty());
    }
}

//! Outbound messages: text plus an optional keyboard of action buttons.

use super::action::{Action, DateChoice};

/// A button shown under a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    /// Visible label
    pub label: String,
    /// What pressing it does
    pub action: Action,
}

impl Button {
    /// Creates a button.
    #[must_use]
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// A message for the user. Buttons are listed in display order; the transport decides how
/// to lay them out in rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    /// Message body (Discord markdown)
    pub text: String,
    /// Buttons in display order
    pub keyboard: Vec<Button>,
}

impl Reply {
    /// Plain text without buttons.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Vec::new(),
        }
    }

    /// Appends a button.
    #[must_use]
    pub fn button(mut self, label: impl Into<String>, action: Action) -> Self {
        self.keyboard.push(Button::new(label, action));
        self
    }

    /// Appends the cancel button.
    #[must_use]
    pub fn cancellable(self) -> Self {
        self.button("❌ Отмена", Action::Cancel)
    }

    /// Prefixes the text with `header` and a blank line.
    #[must_use]
    pub fn with_header(mut self, header: &str) -> Self {
        self.text = format!("{header}\n\n{}", self.text);
        self
    }
}

/// Today / yesterday quick choices, optionally with the manual-entry switch, then cancel.
#[must_use]
pub fn date_keyboard(text: impl Into<String>, with_manual: bool) -> Reply {
    let reply = Reply::text(text)
        .button("📅 Сегодня", Action::PickDate(DateChoice::Today))
        .button("📅 Вчера", Action::PickDate(DateChoice::Yesterday));
    let reply = if with_manual {
        reply.button("✏️ Ввести дату вручную", Action::PickDate(DateChoice::Manual))
    } else {
        reply
    };
    reply.cancellable()
}

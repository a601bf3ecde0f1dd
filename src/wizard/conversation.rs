//! Per-user dialog state and the store that serialises access to it.

use chrono::{NaiveDate, NaiveDateTime};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// The dialogs a user can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    /// Log a work interval
    AddTime,
    /// Log a payment
    AddPayment,
    /// Change hours, date and comment of an entry
    EditTime,
    /// Change amount and date of a payment
    EditPayment,
    /// Pick a report period
    Report,
}

/// What the dialog is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Date,
    ManualDate,
    StartTime,
    EndTime,
    /// Pick one of the active objects or switch to typing
    ObjectChoice,
    ObjectName,
    Comment,
    Amount,
    Hours,
    /// Last month or custom range
    Period,
    RangeStart,
    RangeEnd,
}

/// Answers collected so far. Each flow fills only the fields it needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Answers {
    /// Attributed day
    pub date: Option<NaiveDate>,
    /// Interval start
    pub start: Option<NaiveDateTime>,
    /// Interval end
    pub end: Option<NaiveDateTime>,
    /// Duration in hours
    pub hours: Option<f64>,
    /// Chosen or preset object
    pub object_id: Option<i64>,
    /// Typed object name, or the preset object's name for display
    pub object_name: Option<String>,
    /// Amount in kopecks
    pub amount_kopecks: Option<i64>,
    /// Note for a time entry; stays `None` when skipped
    pub comment: Option<String>,
    /// Entry being edited
    pub entry_id: Option<i64>,
    /// Payment being edited
    pub payment_id: Option<i64>,
    /// First day of a custom report range
    pub range_start: Option<NaiveDate>,
    /// Last day of a custom report range
    pub range_end: Option<NaiveDate>,
}

/// One user's in-flight dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    /// Which dialog
    pub flow: Flow,
    /// The step the next input answers
    pub step: Step,
    /// What has been answered so far
    pub answers: Answers,
}

impl Conversation {
    /// A fresh conversation at `step` with the given answers.
    #[must_use]
    pub const fn new(flow: Flow, step: Step, answers: Answers) -> Self {
        Self {
            flow,
            step,
            answers,
        }
    }
}

type Slot = Arc<Mutex<Option<Conversation>>>;

/// Conversation slots keyed by external user id.
///
/// [`ConversationStore::lock`] hands out an owned guard over one user's slot; holding it
/// while a step runs keeps that user's inputs strictly sequential, while other users lock
/// their own slots independently.
#[derive(Debug, Default)]
pub struct ConversationStore {
    slots: Mutex<HashMap<String, Slot>>,
}

impl ConversationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the slot for `key`, creating an empty one on first use.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<Option<Conversation>> {
        let slot = {
            let mut slots = self.slots.lock().await;
            Arc::clone(slots.entry(key.to_string()).or_default())
        };
        slot.lock_owned().await
    }

    /// Drops whatever dialog `key` is in. Returns the discarded conversation.
    pub async fn discard(&self, key: &str) -> Option<Conversation> {
        let mut guard = self.lock(key).await;
        let previous = guard.take();
        if let Some(conversation) = &previous {
            tracing::debug!("Discarded {:?} dialog for user {key}", conversation.flow);
        }
        previous
    }

    /// Whether `key` is in the middle of a dialog.
    pub async fn is_active(&self, key: &str) -> bool {
        self.lock(key).await.is_some()
    }
}

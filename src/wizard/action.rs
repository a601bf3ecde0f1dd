//! Button actions and their compact wire form.
//!
//! Every button the bot renders carries one [`Action`], encoded with [`fmt::Display`] into the
//! component's custom id and decoded with [`FromStr`] when the press comes back. The wire
//! form is colon-separated: `cancel`, `date:today`, `object:select:12`, `report:last_month`.

use crate::errors::Error;
use std::{fmt, str::FromStr};

/// Quick choices on a date step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateChoice {
    /// The current day in the configured timezone
    Today,
    /// The day before
    Yesterday,
    /// Switch to typing a date
    Manual,
}

/// Quick choices on the report period step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodChoice {
    /// The previous full calendar month
    LastMonth,
    /// Type a start and an end date
    Custom,
}

/// Everything a button can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Abandon the current dialog
    Cancel,
    /// Answer a date step
    PickDate(DateChoice),
    /// Use an existing object in the current dialog
    SelectObject(i64),
    /// Type an object name instead of picking one
    ManualObject,
    /// Answer the report period step
    ReportPeriod(PeriodChoice),
    /// Show the object list
    ListObjects {
        /// Also list completed objects
        include_completed: bool,
    },
    /// Open an object's detail view
    ShowObject(i64),
    /// Mark an object completed
    CompleteObject(i64),
    /// Mark a completed object active again
    ReopenObject(i64),
    /// Ask for delete confirmation
    DeleteObject(i64),
    /// Soft-delete the object
    ConfirmDelete(i64),
    /// Start the add-time dialog for this object
    AddTimeFor(i64),
    /// Start the add-payment dialog for this object
    AddPaymentFor(i64),
}

/// One inbound user action: typed text or a pressed button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A chat message
    Text(String),
    /// A button press
    Action(Action),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancel => write!(f, "cancel"),
            Self::PickDate(DateChoice::Today) => write!(f, "date:today"),
            Self::PickDate(DateChoice::Yesterday) => write!(f, "date:yesterday"),
            Self::PickDate(DateChoice::Manual) => write!(f, "date:manual"),
            Self::SelectObject(id) => write!(f, "object:select:{id}"),
            Self::ManualObject => write!(f, "object:manual"),
            Self::ReportPeriod(PeriodChoice::LastMonth) => write!(f, "report:last_month"),
            Self::ReportPeriod(PeriodChoice::Custom) => write!(f, "report:custom"),
            Self::ListObjects {
                include_completed: true,
            } => write!(f, "objects:all"),
            Self::ListObjects {
                include_completed: false,
            } => write!(f, "objects:active"),
            Self::ShowObject(id) => write!(f, "object:show:{id}"),
            Self::CompleteObject(id) => write!(f, "object:complete:{id}"),
            Self::ReopenObject(id) => write!(f, "object:reopen:{id}"),
            Self::DeleteObject(id) => write!(f, "object:delete:{id}"),
            Self::ConfirmDelete(id) => write!(f, "object:confirm_delete:{id}"),
            Self::AddTimeFor(id) => write!(f, "object:add_time:{id}"),
            Self::AddPaymentFor(id) => write!(f, "object:add_payment:{id}"),
        }
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        let unknown = || Error::UnknownAction {
            payload: payload.to_string(),
        };
        let parts: Vec<&str> = payload.split(':').collect();

        let action = match parts.as_slice() {
            ["cancel"] => Self::Cancel,
            ["date", "today"] => Self::PickDate(DateChoice::Today),
            ["date", "yesterday"] => Self::PickDate(DateChoice::Yesterday),
            ["date", "manual"] => Self::PickDate(DateChoice::Manual),
            ["object", "manual"] => Self::ManualObject,
            ["report", "last_month"] => Self::ReportPeriod(PeriodChoice::LastMonth),
            ["report", "custom"] => Self::ReportPeriod(PeriodChoice::Custom),
            ["objects", "all"] => Self::ListObjects {
                include_completed: true,
            },
            ["objects", "active"] => Self::ListObjects {
                include_completed: false,
            },
            ["object", verb, id] => {
                let id: i64 = id.parse().map_err(|_| unknown())?;
                match *verb {
                    "select" => Self::SelectObject(id),
                    "show" => Self::ShowObject(id),
                    "complete" => Self::CompleteObject(id),
                    "reopen" => Self::ReopenObject(id),
                    "delete" => Self::DeleteObject(id),
                    "confirm_delete" => Self::ConfirmDelete(id),
                    "add_time" => Self::AddTimeFor(id),
                    "add_payment" => Self::AddPaymentFor(id),
                    _ => return Err(unknown()),
                }
            }
            _ => return Err(unknown()),
        };
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_form() {
        assert_eq!(Action::Cancel.to_string(), "cancel");
        assert_eq!(Action::SelectObject(12).to_string(), "object:select:12");
        assert_eq!(
            Action::ListObjects {
                include_completed: false
            }
            .to_string(),
            "objects:active"
        );
    }

    #[test]
    fn test_decodes_what_it_encodes() -> crate::errors::Result<()> {
        for action in [
            Action::PickDate(DateChoice::Yesterday),
            Action::ReportPeriod(PeriodChoice::LastMonth),
            Action::ConfirmDelete(7),
            Action::AddPaymentFor(31),
        ] {
            assert_eq!(action.to_string().parse::<Action>()?, action);
        }
        Ok(())
    }

    #[test]
    fn test_rejects_garbage() {
        for payload in ["", "object:select", "object:select:abc", "object:fly:3", "date:tomorrow"] {
            assert!(
                matches!(payload.parse::<Action>(), Err(Error::UnknownAction { .. })),
                "{payload}"
            );
        }
    }
}

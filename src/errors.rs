//! Unified error type for the tracker.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants fall into three
//! groups: lookup/authorization failures (the referenced record is missing or belongs to
//! somebody else), validation failures raised by core functions, and infrastructure
//! failures (database, configuration, transport).

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// No user row exists for the transport identifier.
    #[error("User not found: {external_id}")]
    UserNotFound {
        /// Transport-provided user identifier
        external_id: String,
    },

    /// The work object does not exist, is deleted, or belongs to another user.
    #[error("Work object not found: {id}")]
    ObjectNotFound {
        /// Work object ID
        id: i64,
    },

    /// The time entry does not exist.
    #[error("Time entry not found: {id}")]
    TimeEntryNotFound {
        /// Time entry ID
        id: i64,
    },

    /// The payment does not exist.
    #[error("Payment not found: {id}")]
    PaymentNotFound {
        /// Payment ID
        id: i64,
    },

    /// The record exists but is owned by another user.
    #[error("Access denied")]
    AccessDenied,

    /// Input rejected by a core operation.
    #[error("Validation failed: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// A dialog reached its commit step without a required answer.
    #[error("Missing answer: {field}")]
    MissingAnswer {
        /// Name of the absent field
        field: &'static str,
    },

    /// A button payload that does not decode to a known action.
    #[error("Unknown action: {payload}")]
    UnknownAction {
        /// Raw payload as received from the transport
        payload: String,
    },

    /// Settings file or value rejected.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable reason
        message: String,
    },

    /// Query or connection failure.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing or not unicode.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Writing into a message buffer failed.
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Discord client or framework failure.
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Whether the failure means a referenced record is absent or not owned by the caller.
    #[must_use]
    pub const fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound { .. }
                | Self::ObjectNotFound { .. }
                | Self::TimeEntryNotFound { .. }
                | Self::PaymentNotFound { .. }
                | Self::AccessDenied
        )
    }

    /// Text shown to the chat user when an operation fails.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::UserNotFound { .. } => {
                "❌ Пользователь не найден. Используйте /start для регистрации.".to_string()
            }
            Self::ObjectNotFound { .. } => "❌ Объект не найден.".to_string(),
            Self::TimeEntryNotFound { .. } => "❌ Запись не найдена.".to_string(),
            Self::PaymentNotFound { .. } => "❌ Запись оплаты не найдена.".to_string(),
            Self::AccessDenied => "❌ У вас нет доступа к этой записи.".to_string(),
            Self::Validation { message } => format!("❌ {message}"),
            Self::UnknownAction { .. } => {
                "⌛ Эта кнопка больше не действует. Начните заново.".to_string()
            }
            Self::MissingAnswer { .. }
            | Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::EnvVar(_)
            | Self::Fmt(_)
            | Self::Framework(_) => "❌ Произошла ошибка. Попробуйте ещё раз позже.".to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_classification() {
        assert!(Error::UserNotFound {
            external_id: "1".to_string()
        }
        .is_lookup());
        assert!(Error::AccessDenied.is_lookup());
        assert!(!Error::Validation {
            message: "x".to_string()
        }
        .is_lookup());
        assert!(!Error::Database(sea_orm::DbErr::Custom("boom".to_string())).is_lookup());
    }

    #[test]
    fn test_user_message_hides_internal_details() {
        let err = Error::Database(sea_orm::DbErr::Custom("disk I/O error".to_string()));
        assert!(!err.user_message().contains("disk"));

        let err = Error::UserNotFound {
            external_id: "7".to_string(),
        };
        assert!(err.user_message().contains("/start"));
    }
}

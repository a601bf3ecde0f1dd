//! Framework-agnostic business logic.
//!
//! Nothing in here knows about Discord; the bot layer and the dialog engine call these
//! functions with a database handle (a connection or an open transaction).

pub mod dates;
pub mod format;
pub mod payment;
pub mod report;
pub mod time_entry;
pub mod user;
pub mod work_object;

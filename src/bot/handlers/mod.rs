//! Discord event handlers
//!
//! This module routes non-command events into the dialog engine: plain messages answer
//! the current dialog step and button clicks carry an encoded action.

/// Message and button interaction handlers
pub mod events;

pub use events::event_handler;

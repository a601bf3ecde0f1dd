/// Database configuration and connection management
pub mod database;

/// Tracker settings loading from config.toml
pub mod settings;

/// Database configuration and connection management
pub mod database;

/// Service settings loaded from an optional TOML file and the environment
pub mod settings;

/// Database connection and schema creation
pub mod database;

/// Application settings from config.toml and environment variables
pub mod settings;

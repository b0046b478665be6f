//! Configuration loaded from environment variables.

use std::env;

/// Console bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database URL.
    pub database_url: String,
    /// Stable id recorded against the console user's scores.
    pub user_id: String,
    /// Name used in greetings.
    pub display_name: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:quiz.db?mode=rwc` |
    /// | `QUIZ_USER_ID` | Id the console user's scores are kept under | `console` |
    /// | `QUIZ_DISPLAY_NAME` | Name used in greetings | `$USER`, else `friend` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("SQLITE_PATH").unwrap_or_else(|_| "sqlite:quiz.db?mode=rwc".to_string());

        if !database_url.starts_with("sqlite:") {
            return Err(ConfigError::UnsupportedDatabaseUrl(database_url));
        }

        let user_id = env::var("QUIZ_USER_ID").unwrap_or_else(|_| "console".to_string());

        let display_name = env::var("QUIZ_DISPLAY_NAME")
            .or_else(|_| env::var("USER"))
            .unwrap_or_else(|_| "friend".to_string());

        Ok(Self {
            database_url,
            user_id,
            display_name,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SQLITE_PATH must be a sqlite: URL, got {0}")]
    UnsupportedDatabaseUrl(String),
}

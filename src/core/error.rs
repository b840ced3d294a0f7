use thiserror::Error;

/// Centralized error type for the bot's handlers
///
/// Store and Telegram failures inside a handler are converted into this
/// enum via `?` and surface through the dispatcher's error handler.
/// Uses `thiserror` for automatic error conversion and display formatting.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Telegram API errors
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot

/// Owner account used when OWNER_ID is not set in the environment.
const DEFAULT_OWNER_ID: i64 = 7936569231;

/// Telegram bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_default()
});

/// Path to the SQLite database file
/// Read from DATABASE_PATH environment variable
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "vitrina.sqlite".to_string()));

/// Path to the log file
/// Read from LOG_FILE_PATH environment variable
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "vitrina.log".to_string()));

/// Telegram user ID allowed to run the administrative commands
/// (/stock, /addoperator, /link).
/// Read from OWNER_ID environment variable; falls back to the built-in
/// owner account when unset or unparseable.
pub static OWNER_ID: Lazy<i64> = Lazy::new(|| {
    env::var("OWNER_ID")
        .ok()
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_OWNER_ID)
});

/// Path to the welcome banner photo sent with /start
/// Read from BANNER_PATH environment variable
/// When the file does not exist the welcome is sent as plain text instead.
pub static BANNER_PATH: Lazy<String> =
    Lazy::new(|| env::var("BANNER_PATH").unwrap_or_else(|_| "banner.png".to_string()));

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for HTTP requests to the Bot API (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

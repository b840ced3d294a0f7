//! Vitrina - Telegram storefront bot for a small marketplace directory
//!
//! The bot shows a welcome menu, an editable stock text, an operator
//! directory with location/availability/delivery status, and a link
//! board. An owner-restricted command set edits the stock text and the
//! links; operators self-register their status via commands keyed to
//! their chat handle.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors and logging
//! - `storage`: connection pool, migrations and row queries
//! - `telegram`: bot construction, command handlers, menus and dispatch

pub mod core;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError};
pub use crate::storage::{create_pool, get_connection, DbConnection, DbPool};
pub use crate::telegram::{handle_menu_callback, schema, HandlerDeps};

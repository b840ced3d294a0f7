//! Handler types and dependencies

use std::sync::Arc;

use crate::storage::db::DbPool;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
///
/// The pool is constructed once in main and passed down explicitly;
/// nothing in the crate reaches for a global connection.
#[derive(Clone)]
pub struct HandlerDeps {
    pub db_pool: Arc<DbPool>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }
}

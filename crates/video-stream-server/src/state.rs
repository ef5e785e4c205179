//! Shared application state.

use crate::db::Database;

/// State handed to every request handler.
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

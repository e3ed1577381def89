//! Driven port for prediction history persistence.

use async_trait::async_trait;

use crate::domain::{HistoryEntry, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by history repository adapters.
    pub enum HistoryPersistenceError {
        /// Repository connection could not be established.
        Connection { message } => "history repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message } => "history repository query failed: {message}",
    }
}

/// Append-only store of prediction history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Insert one immutable entry.
    async fn append(&self, entry: &HistoryEntry) -> Result<(), HistoryPersistenceError>;

    /// All entries for `user_id`, newest first with ties broken by id descending.
    async fn list_for(&self, user_id: &UserId)
    -> Result<Vec<HistoryEntry>, HistoryPersistenceError>;
}

//! respond-storage: the key-value "brain" plugins persist their state in.
//!
//! A brain maps string keys to JSON values. Two backends are provided:
//! [`MemoryBrain`] for tests and ephemeral runs, and [`SqliteBrain`] for
//! state that has to survive restarts.

mod memory;
mod sqlite;

pub use memory::MemoryBrain;
pub use sqlite::SqliteBrain;

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Blocking task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Key-value store supplied by the host.
#[async_trait::async_trait]
pub trait Brain: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove `key`. Returns whether it existed.
    async fn remove(&self, key: &str) -> Result<bool>;
}

//! User store module.
//!
//! Durable mapping from chat id to registration state, behind an injected
//! trait so the scheduler and the registration handler never care about the
//! backing technology. Upserts are atomic per record; that atomicity is the
//! only concurrency guarantee callers may rely on.

mod json_file;
mod memory;
mod record;

use async_trait::async_trait;
use thiserror::Error;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use record::{UserPatch, UserRecord};

/// Errors from a user store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("User store encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Durable mapping from chat id to registration state.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns every registered user.
    async fn find_all(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// Returns the record for one chat id, if registered.
    async fn find_one(&self, chat_id: i64) -> Result<Option<UserRecord>, StoreError>;

    /// Creates or updates the record for a chat id, applying only the fields
    /// set in the patch.
    async fn upsert(&self, chat_id: i64, patch: UserPatch) -> Result<(), StoreError>;
}

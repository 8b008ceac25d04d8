//! In-memory user store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StoreError, UserPatch, UserRecord, UserStore};

/// Ephemeral store backed by a `HashMap`.
///
/// Loses all state on restart; meant for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<i64, UserRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        let users = self.users.read().await;
        let mut records: Vec<UserRecord> = users.values().cloned().collect();
        records.sort_by_key(|r| r.chat_id);
        Ok(records)
    }

    async fn find_one(&self, chat_id: i64) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(&chat_id).cloned())
    }

    async fn upsert(&self, chat_id: i64, patch: UserPatch) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        users
            .entry(chat_id)
            .or_insert_with(|| UserRecord::new(chat_id))
            .apply(patch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoryLevel;

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let store = MemoryStore::new();

        store.upsert(7, UserPatch::level(StoryLevel::A2)).await.unwrap();
        store.upsert(7, UserPatch::level(StoryLevel::B2)).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].level, Some(StoryLevel::B2));
    }

    #[tokio::test]
    async fn test_find_one_missing() {
        let store = MemoryStore::new();
        assert!(store.find_one(404).await.unwrap().is_none());
    }
}

//! JSON file store backend.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StoreError, UserPatch, UserRecord, UserStore};

/// Durable store persisting all records to a single JSON file.
///
/// The whole map is rewritten under the write lock after every upsert, which
/// keeps registration and scheduler writes serialized. Fine for this bot's
/// scale of users.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    users: RwLock<HashMap<i64, UserRecord>>,
}

impl JsonFileStore {
    /// Opens the store, loading existing records if the file is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let users = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            users: RwLock::new(users),
        })
    }

    fn persist(&self, users: &HashMap<i64, UserRecord>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(users)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for JsonFileStore {
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
        self.persist(&users)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::config::StoryLevel;

    fn temp_store_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("story_bot_{}_{}.json", name, std::process::id()))
    }

    #[tokio::test]
    async fn test_open_missing_file_starts_empty() {
        let path = temp_store_path("missing");
        let _ = std::fs::remove_file(&path);

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let path = temp_store_path("reopen");
        let _ = std::fs::remove_file(&path);
        let delivered = Utc::now();

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.upsert(1, UserPatch::level(StoryLevel::B1)).await.unwrap();
            store.upsert(1, UserPatch::delivered_at(delivered)).await.unwrap();
            store.upsert(2, UserPatch::level(StoryLevel::A1)).await.unwrap();
        }

        let reopened = JsonFileStore::open(&path).unwrap();
        let record = reopened.find_one(1).await.unwrap().unwrap();
        assert_eq!(record.level, Some(StoryLevel::B1));
        assert_eq!(record.last_delivered_at, Some(delivered));
        assert_eq!(reopened.find_all().await.unwrap().len(), 2);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_open_rejects_corrupt_file() {
        let path = temp_store_path("corrupt");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Encoding(_))
        ));

        let _ = std::fs::remove_file(&path);
    }
}

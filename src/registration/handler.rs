//! Level-selection handling.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::{StoryLevel, UnknownLevel};
use crate::generator::StoryProvider;
use crate::store::{StoreError, UserPatch, UserStore};

/// Errors surfaced by [`RegistrationHandler::register`].
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The selected token is not a recognized tier. User-correctable.
    #[error(transparent)]
    UnknownLevel(#[from] UnknownLevel),

    /// The user store rejected the read or write.
    #[error("Failed to save registration: {0}")]
    Store(#[from] StoreError),
}

/// Result of a successful registration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// A new record was created. The first story is handed to the caller for
    /// immediate delivery; the scheduler's timestamp stays untouched, so the
    /// user is due again on the next tick.
    FirstStory {
        level: StoryLevel,
        story: String,
    },

    /// The record already existed; only its level changed.
    LevelChanged {
        level: StoryLevel,
    },
}

/// Creates and updates user records from level selections.
pub struct RegistrationHandler {
    store: Arc<dyn UserStore>,
    provider: Arc<dyn StoryProvider>,
}

impl RegistrationHandler {
    /// Creates a handler over the given store and provider.
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, provider: Arc<dyn StoryProvider>) -> Self {
        Self { store, provider }
    }

    /// Registers `chat_id` at the level named by `token`.
    ///
    /// Exactly one store upsert per successful call. A repeat registration
    /// only moves the level; the delivery timestamp is owned by the scheduler
    /// and is never written here.
    ///
    /// # Errors
    ///
    /// Returns an error for an unrecognized level token (nothing is written)
    /// or a store failure.
    pub async fn register(
        &self,
        chat_id: i64,
        token: &str,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        let level: StoryLevel = token.parse()?;

        let existing = self.store.find_one(chat_id).await?;
        self.store.upsert(chat_id, UserPatch::level(level)).await?;

        if existing.is_some() {
            info!("Chat {} switched to level {}", chat_id, level);
            return Ok(RegistrationOutcome::LevelChanged { level });
        }

        info!("Chat {} registered at level {}", chat_id, level);
        let story = self.provider.fetch_story(level).await;

        Ok(RegistrationOutcome::FirstStory { level, story })
    }
}

impl std::fmt::Debug for RegistrationHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationHandler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Mutex;

    use super::*;
    use crate::store::MemoryStore;

    #[derive(Default)]
    struct ScriptedProvider {
        calls: Mutex<Vec<StoryLevel>>,
    }

    #[async_trait]
    impl StoryProvider for ScriptedProvider {
        async fn fetch_story(&self, level: StoryLevel) -> String {
            self.calls.lock().await.push(level);
            format!("{level} story")
        }
    }

    fn handler_with(store: Arc<MemoryStore>, provider: Arc<ScriptedProvider>) -> RegistrationHandler {
        RegistrationHandler::new(store, provider)
    }

    #[tokio::test]
    async fn test_first_registration_creates_record_and_story() {
        let store = Arc::new(MemoryStore::new());
        let provider = Arc::new(ScriptedProvider::default());
        let handler = handler_with(Arc::clone(&store), Arc::clone(&provider));

        let outcome = handler.register(10, "B1").await.unwrap();

        assert_eq!(
            outcome,
            RegistrationOutcome::FirstStory {
                level: StoryLevel::B1,
                story: "B1 story".to_owned(),
            }
        );

        let record = store.find_one(10).await.unwrap().unwrap();
        assert_eq!(record.level, Some(StoryLevel::B1));
        assert!(record.last_delivered_at.is_none());
    }

    #[tokio::test]
    async fn test_repeat_registration_only_moves_level() {
        let store = Arc::new(MemoryStore::new());
        let provider = Arc::new(ScriptedProvider::default());
        let handler = handler_with(Arc::clone(&store), Arc::clone(&provider));

        handler.register(10, "A1").await.unwrap();

        // Simulate a scheduled delivery between the two registrations.
        let delivered = Utc::now();
        store.upsert(10, UserPatch::delivered_at(delivered)).await.unwrap();

        let outcome = handler.register(10, "C2").await.unwrap();
        assert_eq!(
            outcome,
            RegistrationOutcome::LevelChanged {
                level: StoryLevel::C2
            }
        );

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].level, Some(StoryLevel::C2));
        assert_eq!(all[0].last_delivered_at, Some(delivered));

        // Only the first registration fetched a story.
        assert_eq!(provider.calls.lock().await.as_slice(), &[StoryLevel::A1]);
    }

    #[tokio::test]
    async fn test_unknown_level_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let provider = Arc::new(ScriptedProvider::default());
        let handler = handler_with(Arc::clone(&store), Arc::clone(&provider));

        let err = handler.register(10, "Z9").await;
        assert!(matches!(err, Err(RegistrationError::UnknownLevel(_))));

        assert!(store.find_all().await.unwrap().is_empty());
        assert!(provider.calls.lock().await.is_empty());
    }
}

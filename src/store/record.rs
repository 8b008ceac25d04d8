//! User registration records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::StoryLevel;

/// One registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Telegram chat id, the primary key.
    pub chat_id: i64,

    /// Selected difficulty tier; unset falls back to the default at read time.
    #[serde(default)]
    pub level: Option<StoryLevel>,

    /// When the scheduler last delivered a story; unset means never.
    #[serde(default)]
    pub last_delivered_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Creates an empty record for a chat id.
    #[must_use]
    pub const fn new(chat_id: i64) -> Self {
        Self {
            chat_id,
            level: None,
            last_delivered_at: None,
        }
    }

    /// The tier stories are generated at, defaulting when unset.
    #[must_use]
    pub fn effective_level(&self) -> StoryLevel {
        self.level.unwrap_or(StoryLevel::DEFAULT)
    }

    /// Whether the user is eligible for their next delivery at `now`.
    ///
    /// A user who has never been delivered to is always due.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>, due_interval: Duration) -> bool {
        self.last_delivered_at
            .is_none_or(|last| now.signed_duration_since(last) >= due_interval)
    }

    /// Applies a partial update.
    ///
    /// `last_delivered_at` never moves backwards; a stale write is dropped.
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(level) = patch.level {
            self.level = Some(level);
        }
        if let Some(delivered) = patch.last_delivered_at
            && self.last_delivered_at.is_none_or(|prev| prev <= delivered)
        {
            self.last_delivered_at = Some(delivered);
        }
    }
}

/// Field subset for an upsert; unset fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserPatch {
    /// New difficulty tier, if changing.
    pub level: Option<StoryLevel>,

    /// New delivery timestamp, if recording a delivery.
    pub last_delivered_at: Option<DateTime<Utc>>,
}

impl UserPatch {
    /// Patch that only sets the level.
    #[must_use]
    pub const fn level(level: StoryLevel) -> Self {
        Self {
            level: Some(level),
            last_delivered_at: None,
        }
    }

    /// Patch that only records a delivery.
    #[must_use]
    pub const fn delivered_at(at: DateTime<Utc>) -> Self {
        Self {
            level: None,
            last_delivered_at: Some(at),
        }
    }
}

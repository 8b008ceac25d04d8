//! Delivery scheduler runner.
//!
//! The scheduler compares elapsed time against the due interval on every
//! tick:
//! 1. Read all user records; a failed read skips the whole tick.
//! 2. A user is due when they have never been delivered to, or when
//!    `now - last_delivered_at >= due_interval`.
//! 3. For each due user, independently: fetch a story at the user's
//!    effective level, send it, and only after a confirmed send persist
//!    `last_delivered_at = now`.
//! 4. A per-user failure leaves that user's timestamp untouched, so the next
//!    tick retries them; it never blocks the other users in the tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::config::ScheduleSettings;
use crate::delivery::{DeliveryChannel, DeliveryError};
use crate::generator::StoryProvider;
use crate::store::{StoreError, UserPatch, UserRecord, UserStore};

/// Messages that can be sent to the scheduler.
#[derive(Debug, Clone)]
pub enum SchedulerMessage {
    /// Stop the scheduler.
    Shutdown,
}

/// Per-user failure inside a tick. Caught by the tick loop, never crossing
/// it.
#[derive(Debug, Error)]
enum DeliveryAttemptError {
    #[error(transparent)]
    Send(#[from] DeliveryError),

    #[error("Failed to record delivery: {0}")]
    Persist(#[from] StoreError),
}

/// Outcome counts for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct TickSummary {
    /// Users considered.
    total: usize,
    /// Users whose due interval had elapsed.
    due: usize,
    /// Due users delivered to (timestamp advanced).
    delivered: usize,
    /// Due users whose delivery or persist failed (retried next tick).
    failed: usize,
}

/// Periodic story delivery scheduler.
pub struct StoryScheduler {
    store: Arc<dyn UserStore>,
    provider: Arc<dyn StoryProvider>,
    channel: Arc<dyn DeliveryChannel>,

    /// Polling cadence.
    tick_interval: Duration,

    /// Per-user minimum time between deliveries.
    due_interval: chrono::Duration,
}

impl StoryScheduler {
    /// Creates a new scheduler over the given collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn UserStore>,
        provider: Arc<dyn StoryProvider>,
        channel: Arc<dyn DeliveryChannel>,
        settings: ScheduleSettings,
    ) -> Self {
        Self {
            store,
            provider,
            channel,
            tick_interval: Duration::from_secs(settings.tick_interval_secs),
            due_interval: chrono::Duration::seconds(
                i64::try_from(settings.due_interval_secs).unwrap_or(i64::MAX),
            ),
        }
    }

    /// Runs the scheduler loop until a shutdown message arrives.
    ///
    /// Each tick is awaited to completion before the timer is polled again,
    /// so ticks never overlap; a tick that outlives the interval delays the
    /// next one instead of stacking.
    pub async fn run(&self, mut rx: mpsc::Receiver<SchedulerMessage>) {
        info!(
            "Story scheduler started (tick every {}s, stories due after {}s)",
            self.tick_interval.as_secs(),
            self.due_interval.num_seconds()
        );

        let mut tick_timer = interval(self.tick_interval);
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tick_timer.tick() => {
                    let summary = self.tick().await;
                    if summary.due > 0 {
                        info!(
                            "Tick complete: {}/{} users due, {} delivered, {} failed",
                            summary.due, summary.total, summary.delivered, summary.failed
                        );
                    } else {
                        debug!("Tick complete: no users due ({} registered)", summary.total);
                    }
                }
                msg = rx.recv() => {
                    match msg {
                        Some(SchedulerMessage::Shutdown) | None => {
                            info!("Scheduler shutting down");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Single tick: deliver to every due user.
    async fn tick(&self) -> TickSummary {
        let records = match self.store.find_all().await {
            Ok(records) => records,
            Err(e) => {
                warn!("User store read failed, skipping tick: {}", e);
                return TickSummary::default();
            }
        };

        let now = Utc::now();
        let mut summary = TickSummary {
            total: records.len(),
            ..TickSummary::default()
        };

        for record in &records {
            if !record.is_due(now, self.due_interval) {
                continue;
            }
            summary.due += 1;

            match self.deliver_to(record, now).await {
                Ok(()) => summary.delivered += 1,
                Err(e) => {
                    warn!("Delivery to chat {} failed: {}", record.chat_id, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Fetch, send, persist for one user, in that order.
    ///
    /// The timestamp is written only after the channel confirms the send. A
    /// generator outage is absorbed upstream: the fallback text still counts
    /// as a delivery.
    async fn deliver_to(
        &self,
        record: &UserRecord,
        now: DateTime<Utc>,
    ) -> Result<(), DeliveryAttemptError> {
        let level = record.effective_level();
        let story = self.provider.fetch_story(level).await;

        self.channel.send(record.chat_id, &story).await?;
        self.store
            .upsert(record.chat_id, UserPatch::delivered_at(now))
            .await?;

        debug!("Delivered {} story to chat {}", level, record.chat_id);
        Ok(())
    }
}

impl std::fmt::Debug for StoryScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryScheduler")
            .field("tick_interval", &self.tick_interval)
            .field("due_interval", &self.due_interval)
            .finish_non_exhaustive()
    }
}

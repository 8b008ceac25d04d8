//! Story generation module.
//!
//! Adapts an OpenAI-compatible chat-completions API to the scheduler's
//! "always returns text" contract: generator outages surface to users as a
//! fixed fallback message, never as an error.

mod client;

use async_trait::async_trait;

pub use client::{GeneratorError, StoryGenerator};

use crate::config::StoryLevel;

/// Fallback text delivered when the generator cannot produce a story.
pub const FALLBACK_STORY: &str =
    "Sorry, I couldn't fetch a story at the moment. Please try again later.";

/// Produces one story for a difficulty tier.
///
/// Implementations must not fail: any underlying error is replaced by
/// [`FALLBACK_STORY`], so the per-user delivery loop is never interrupted by
/// generator trouble.
#[async_trait]
pub trait StoryProvider: Send + Sync {
    /// Returns a story at the given level, or the fallback text.
    async fn fetch_story(&self, level: StoryLevel) -> String;
}

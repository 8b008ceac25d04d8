//! Story delivery scheduler module.
//!
//! Polls registered users on a fixed cadence and delivers a story to every
//! user whose due interval has elapsed.

mod runner;

pub use runner::{SchedulerMessage, StoryScheduler};

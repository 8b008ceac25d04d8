//! Telegram front-end module.
//!
//! Wires the `/start` command, the level-selection keyboard, and the static
//! fallback reply into a teloxide dispatcher. No scheduling state lives
//! here; level selections are routed straight to the registration handler.

mod handlers;

pub use handlers::{BotContext, Command, build_schema};

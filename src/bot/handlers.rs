//! Update handlers for the bot front-end.

use std::sync::Arc;

use teloxide::dispatching::UpdateHandler;
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::command::BotCommands;
use tracing::{debug, warn};

use crate::config::StoryLevel;
use crate::registration::{RegistrationError, RegistrationHandler, RegistrationOutcome};

/// Shared handler dependencies injected into the dispatcher.
#[derive(Clone)]
pub struct BotContext {
    /// Handles level selections.
    pub registration: Arc<RegistrationHandler>,

    /// Delivery cadence, quoted back to users when they register.
    pub due_interval_secs: u64,
}

/// Commands understood by the bot.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    /// Pick a story level and register for deliveries.
    Start,
}

/// Builds the dispatcher handler tree.
#[must_use]
pub fn build_schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(Update::filter_callback_query().endpoint(handle_level_selection))
        .branch(Update::filter_message().endpoint(handle_other_message))
}

async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Start => {
            bot.send_message(msg.chat.id, "Welcome! Please choose your story level:")
                .reply_markup(level_keyboard())
                .await?;
        }
    }
    Ok(())
}

async fn handle_level_selection(bot: Bot, q: CallbackQuery, ctx: BotContext) -> anyhow::Result<()> {
    // Clear the client's pending-query spinner whatever happens below.
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) else {
        warn!("Callback query {} has no originating message", q.id);
        return Ok(());
    };

    let Some(token) = q.data.as_deref() else {
        debug!("Callback query {} carried no data", q.id);
        return Ok(());
    };

    match ctx.registration.register(chat_id.0, token).await {
        Ok(RegistrationOutcome::FirstStory { level, story }) => {
            bot.send_message(
                chat_id,
                format!(
                    "You selected the {level} level. I will send you a new story every {}. \
                     This is your first story:",
                    format_interval(ctx.due_interval_secs)
                ),
            )
            .await?;
            bot.send_message(chat_id, story).await?;
        }
        Ok(RegistrationOutcome::LevelChanged { level }) => {
            bot.send_message(
                chat_id,
                format!(
                    "You are now on the {level} level. \
                     Your next story arrives on the usual schedule."
                ),
            )
            .await?;
        }
        Err(RegistrationError::UnknownLevel(_)) => {
            bot.send_message(chat_id, "Please pick one of the offered levels:")
                .reply_markup(level_keyboard())
                .await?;
        }
        Err(RegistrationError::Store(e)) => {
            warn!("Registration for chat {} failed: {}", chat_id, e);
            bot.send_message(
                chat_id,
                "Something went wrong saving your selection. Please try again.",
            )
            .await?;
        }
    }

    Ok(())
}

async fn handle_other_message(bot: Bot, msg: Message) -> anyhow::Result<()> {
    bot.send_message(msg.chat.id, "Use the command /start to choose your story level!")
        .await?;
    Ok(())
}

/// One button per recognized tier, one tier per row.
fn level_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        StoryLevel::all()
            .into_iter()
            .map(|level| vec![InlineKeyboardButton::callback(level.as_str(), level.as_str())]),
    )
}

/// Formats a second count the way users read it ("6 hours").
fn format_interval(secs: u64) -> String {
    if secs < 60 {
        format!("{secs} seconds")
    } else if secs < 3600 {
        let mins = secs / 60;
        if mins == 1 {
            "minute".to_owned()
        } else {
            format!("{mins} minutes")
        }
    } else {
        let hours = secs / 3600;
        if hours == 1 {
            "hour".to_owned()
        } else {
            format!("{hours} hours")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_offers_every_tier() {
        let keyboard = level_keyboard();

        assert_eq!(keyboard.inline_keyboard.len(), StoryLevel::all().len());
        for (row, level) in keyboard.inline_keyboard.iter().zip(StoryLevel::all()) {
            assert_eq!(row.len(), 1);
            assert_eq!(row[0].text, level.as_str());
        }
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(30), "30 seconds");
        assert_eq!(format_interval(60), "minute");
        assert_eq!(format_interval(1800), "30 minutes");
        assert_eq!(format_interval(3600), "hour");
        assert_eq!(format_interval(21_600), "6 hours");
    }

    #[test]
    fn test_start_command_parses() {
        assert!(matches!(
            Command::parse("/start", "story_bot"),
            Ok(Command::Start)
        ));
    }
}

//! Story Delivery Bot - Main Entry Point
//!
//! A Telegram bot that sends German learner stories to registered users on a
//! fixed schedule, at each user's chosen difficulty level.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use teloxide::Bot;
use teloxide::dispatching::Dispatcher;
use teloxide::dptree;
use teloxide::error_handlers::LoggingErrorHandler;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use story_delivery_bot::bot::{BotContext, build_schema};
use story_delivery_bot::config::Settings;
use story_delivery_bot::delivery::{DeliveryChannel, TelegramChannel};
use story_delivery_bot::generator::{StoryGenerator, StoryProvider};
use story_delivery_bot::health;
use story_delivery_bot::registration::RegistrationHandler;
use story_delivery_bot::scheduler::{SchedulerMessage, StoryScheduler};
use story_delivery_bot::store::{JsonFileStore, UserStore};

/// Telegram bot delivering scheduled stories to registered users.
#[derive(Parser, Debug)]
#[command(name = "story_bot")]
#[command(about = "Deliver level-matched stories to Telegram users on a schedule")]
#[command(version)]
struct Args {
    /// Path to the JSON file holding user registrations.
    #[arg(short, long, default_value = "users.json")]
    users: String,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    let settings =
        Settings::from_env().context("Failed to load configuration from environment")?;

    let store: Arc<dyn UserStore> = Arc::new(
        JsonFileStore::open(&args.users)
            .with_context(|| format!("Failed to open user store at {}", args.users))?,
    );

    let provider: Arc<dyn StoryProvider> = Arc::new(
        StoryGenerator::new(&settings.generator)
            .context("Failed to build story generator client")?,
    );

    let bot = Bot::new(settings.telegram.bot_token.clone());
    let channel: Arc<dyn DeliveryChannel> = Arc::new(TelegramChannel::new(bot.clone()));

    let registration = Arc::new(RegistrationHandler::new(
        Arc::clone(&store),
        Arc::clone(&provider),
    ));

    let scheduler = StoryScheduler::new(
        Arc::clone(&store),
        Arc::clone(&provider),
        Arc::clone(&channel),
        settings.schedule,
    );

    info!("Starting story bot...");
    info!(
        "Tick every {}s, stories due every {}s",
        settings.schedule.tick_interval_secs, settings.schedule.due_interval_secs
    );

    // Liveness endpoint for keep-alive probes
    let port = settings.port;
    tokio::spawn(async move {
        if let Err(e) = health::serve(port).await {
            warn!("Liveness endpoint failed: {}", e);
        }
    });

    // Spawn scheduler task
    let (scheduler_tx, scheduler_rx) = mpsc::channel::<SchedulerMessage>(8);
    let scheduler_handle = tokio::spawn(async move {
        scheduler.run(scheduler_rx).await;
    });

    let ctx = BotContext {
        registration,
        due_interval_secs: settings.schedule.due_interval_secs,
    };

    info!("Bot is running. Use Ctrl+C to stop.");

    Dispatcher::builder(bot, build_schema())
        .dependencies(dptree::deps![ctx])
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("Update handler error"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    // Cleanup
    info!("Shutting down...");
    let _ = scheduler_tx.send(SchedulerMessage::Shutdown).await;
    let _ = scheduler_handle.await;

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

//! Application settings and environment configuration.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
}

/// Telegram Bot API configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token (obtain from <https://t.me/BotFather>).
    pub bot_token: String,
}

impl TelegramConfig {
    /// Creates configuration from environment variables.
    ///
    /// Expects `TELEGRAM_BOT_TOKEN` to be set.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN"))?;

        Ok(Self { bot_token })
    }
}

/// Story generator API configuration (OpenAI-compatible).
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// API key for the generator service.
    pub api_key: String,

    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,

    /// Model used for story generation.
    pub model: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_owned()
}

fn default_model() -> String {
    "llama3-8b-8192".to_owned()
}

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

impl GeneratorConfig {
    /// Creates configuration from environment variables.
    ///
    /// Expects `GROQ_API_KEY` to be set; `GROQ_BASE_URL`, `GROQ_MODEL` and
    /// `GROQ_TIMEOUT_SECS` are optional overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("GROQ_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("GROQ_API_KEY"))?;

        Ok(Self {
            api_key,
            base_url: std::env::var("GROQ_BASE_URL").unwrap_or_else(|_| default_base_url()),
            model: std::env::var("GROQ_MODEL").unwrap_or_else(|_| default_model()),
            request_timeout_secs: env_u64("GROQ_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }
}

/// Scheduling cadence settings.
///
/// The tick interval is the polling granularity; the due interval is the
/// per-user delivery deadline. The two are independent: a shorter tick only
/// reduces delivery jitter, it never delivers more often than the due
/// interval allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSettings {
    /// How often the scheduler wakes up, in seconds.
    pub tick_interval_secs: u64,

    /// Minimum elapsed time between deliveries to one user, in seconds.
    pub due_interval_secs: u64,
}

const DEFAULT_TICK_INTERVAL_SECS: u64 = 60 * 60; // 1 hour
const DEFAULT_DUE_INTERVAL_SECS: u64 = 6 * 60 * 60; // 6 hours

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            due_interval_secs: DEFAULT_DUE_INTERVAL_SECS,
        }
    }
}

impl ScheduleSettings {
    /// Creates schedule settings from environment variables with defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self {
            tick_interval_secs: env_u64("TICK_INTERVAL_SECS", DEFAULT_TICK_INTERVAL_SECS),
            due_interval_secs: env_u64("DUE_INTERVAL_SECS", DEFAULT_DUE_INTERVAL_SECS),
        }
    }
}

/// Complete runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Telegram Bot API settings.
    pub telegram: TelegramConfig,

    /// Story generator settings.
    pub generator: GeneratorConfig,

    /// Scheduler cadence settings.
    pub schedule: ScheduleSettings,

    /// Port for the liveness endpoint.
    pub port: u16,
}

const DEFAULT_PORT: u16 = 8080;

impl Settings {
    /// Loads all settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            telegram: TelegramConfig::from_env()?,
            generator: GeneratorConfig::from_env()?,
            schedule: ScheduleSettings::from_env_with_defaults(),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        })
    }
}

fn env_u64(var: &str, default: u64) -> u64 {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

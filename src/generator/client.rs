//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::{FALLBACK_STORY, StoryProvider};
use crate::config::{GeneratorConfig, StoryLevel};

/// Errors from the underlying generator API.
///
/// These never cross the [`StoryProvider`] boundary; they exist for logging
/// and for callers that want the raw result.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Generator request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generator returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Generator returned no usable choices")]
    EmptyResponse,
}

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat-completions response body, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Client for an OpenAI-compatible story generator (Groq by default).
pub struct StoryGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl StoryGenerator {
    /// Creates a generator client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn prompt(level: StoryLevel) -> String {
        format!("Tell me a German story for a {level} level learner.")
    }

    /// Requests one story, surfacing API failures to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or a response
    /// without usable text.
    pub async fn request_story(&self, level: StoryLevel) -> Result<String, GeneratorError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_owned(),
                content: Self::prompt(level),
            }],
        };

        debug!("Requesting {} story from {}", level, self.chat_completions_url());

        let response = self
            .client
            .post(self.chat_completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(GeneratorError::EmptyResponse)
    }
}

#[async_trait]
impl StoryProvider for StoryGenerator {
    async fn fetch_story(&self, level: StoryLevel) -> String {
        match self.request_story(level).await {
            Ok(story) => story,
            Err(e) => {
                warn!("Story generation failed for level {}: {}", level, e);
                FALLBACK_STORY.to_owned()
            }
        }
    }
}

impl std::fmt::Debug for StoryGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryGenerator")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

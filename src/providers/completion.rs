//! LLM chat-completion client with a canned empathetic fallback.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::ProviderError;
use crate::metrics;
use crate::providers::emotion::EmotionReading;

/// Reply served when no completion provider is available.
pub const FALLBACK_REPLY: &str = "I'm here for you.";

/// How many upcoming events are woven into the system instruction.
const MAX_PROMPT_EVENTS: usize = 3;

/// One message in a conversation, OpenAI-compatible wire shape.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    /// "system", "user", or "assistant".
    pub role: &'static str,
    /// Message text.
    pub content: String,
}

impl ChatTurn {
    /// A user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }

    /// An assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant",
            content: content.into(),
        }
    }

    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }
}

/// An upcoming calendar event supplied by the client as chat context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingEvent {
    /// Event title.
    pub title: String,
    /// Display date, free text.
    pub date: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: String,
}

/// Client for the chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct CompletionProvider {
    http: reqwest::Client,
    url: String,
    model: String,
    max_tokens: u32,
    api_key: Option<String>,
}

impl CompletionProvider {
    /// Build from configuration.
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.completion_timeout_secs))
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            url: config.openrouter_url.clone(),
            model: config.openrouter_model.clone(),
            max_tokens: config.completion_max_tokens,
            api_key: config.openrouter_api_key.clone(),
        }
    }

    /// Whether a real provider is behind this client.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// System instruction embedding the detected tone and upcoming events.
    pub fn system_prompt(emotion: &EmotionReading, events: &[UpcomingEvent]) -> String {
        let mut calendar_context = String::new();
        if !events.is_empty() {
            calendar_context.push_str("\n\nUpcoming events:\n");
            let lines: Vec<String> = events
                .iter()
                .take(MAX_PROMPT_EVENTS)
                .map(|event| format!("- {} on {}", event.title, event.date))
                .collect();
            calendar_context.push_str(&lines.join("\n"));
        }

        format!(
            "You are UniMind, a compassionate AI wellness companion for college students.\n\
             Current emotional tone: {} (intensity: {}/1.0).{}\n\
             Be warm, empathetic, concise (2-3 sentences).",
            emotion.emotion, emotion.intensity, calendar_context
        )
    }

    /// Generate a reply to the conversation.
    ///
    /// Never fails: an unconfigured or failing provider yields the canned
    /// empathetic reply.
    #[instrument(skip_all)]
    pub async fn complete(&self, system_prompt: &str, history: &[ChatTurn]) -> String {
        let Some(api_key) = self.api_key.clone() else {
            debug!("completion provider not configured, serving canned reply");
            return FALLBACK_REPLY.to_string();
        };

        let start = Instant::now();
        match self.request(&api_key, system_prompt, history).await {
            Ok(reply) => {
                metrics::record_provider_latency("completion", start);
                reply
            }
            Err(e) => {
                warn!(error = %e, "completion failed, serving canned reply");
                metrics::inc_completion_fallbacks();
                FALLBACK_REPLY.to_string()
            }
        }
    }

    async fn request(
        &self,
        api_key: &str,
        system_prompt: &str,
        history: &[ChatTurn],
    ) -> Result<String, ProviderError> {
        let mut messages = vec![ChatTurn::system(system_prompt)];
        messages.extend_from_slice(history);

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&json!({
                "model": self.model,
                "messages": messages,
                "max_tokens": self.max_tokens,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ProviderError::Parse("no completion choices returned".to_string()))
    }
}

//! Emotion analysis client with a deterministic neutral fallback.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::ProviderError;
use crate::metrics;

/// Intensity reported when the provider cannot be reached.
const FALLBACK_INTENSITY: f64 = 0.5;
/// Confidence reported when the provider cannot be reached.
const FALLBACK_CONFIDENCE: f64 = 0.7;

/// Classified emotional tone of a piece of text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionReading {
    /// Emotion label, e.g. "neutral", "joy", "sadness".
    #[serde(default = "default_emotion")]
    pub emotion: String,
    /// Strength of the emotion in [0, 1].
    #[serde(default = "default_intensity")]
    pub intensity: f64,
    /// Classifier confidence in [0, 1].
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Present when the reading is a fallback rather than a real analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn default_emotion() -> String {
    "neutral".to_string()
}

fn default_intensity() -> f64 {
    FALLBACK_INTENSITY
}

fn default_confidence() -> f64 {
    FALLBACK_CONFIDENCE
}

impl EmotionReading {
    /// The neutral reading served when analysis is unavailable.
    pub fn fallback(note: impl Into<String>) -> Self {
        Self {
            emotion: default_emotion(),
            intensity: FALLBACK_INTENSITY,
            confidence: FALLBACK_CONFIDENCE,
            note: Some(note.into()),
        }
    }
}

/// Client for the emotion analysis endpoint.
#[derive(Debug, Clone)]
pub struct EmotionProvider {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl EmotionProvider {
    /// Build from configuration.
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.emotion_timeout_secs))
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            url: config.blossoms_url.clone(),
            api_key: config.blossoms_api_key.clone(),
        }
    }

    /// Whether a real provider is behind this client.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Classify the emotional tone of `text`.
    ///
    /// Never fails: an unconfigured or failing provider yields the neutral
    /// fallback reading.
    #[instrument(skip(self, text))]
    pub async fn detect(&self, text: &str) -> EmotionReading {
        let Some(api_key) = self.api_key.clone() else {
            debug!("emotion provider not configured, serving neutral reading");
            return EmotionReading::fallback(
                "Using mock data - add BLOSSOMS_API_KEY to environment",
            );
        };

        let start = Instant::now();
        match self.request(&api_key, text).await {
            Ok(reading) => {
                metrics::record_provider_latency("emotion", start);
                reading
            }
            Err(e) => {
                warn!(error = %e, "emotion analysis failed, serving neutral reading");
                metrics::inc_emotion_fallbacks();
                EmotionReading::fallback(format!("Error: {e}"))
            }
        }
    }

    async fn request(&self, api_key: &str, text: &str) -> Result<EmotionReading, ProviderError> {
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&json!({ "text": text }))
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

        response
            .json::<EmotionReading>()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn unconfigured_provider() -> EmotionProvider {
        let config: Config = envy::from_iter::<_, Config>(std::iter::empty::<(String, String)>())
            .expect("empty env yields default config");
        EmotionProvider::new(&config)
    }

    #[tokio::test]
    async fn unconfigured_provider_is_deterministically_neutral() {
        let provider = unconfigured_provider();
        assert!(!provider.is_configured());

        for text in ["I am thrilled!", "everything is terrible", ""] {
            let reading = provider.detect(text).await;
            assert_eq!(reading.emotion, "neutral");
            assert_eq!(reading.intensity, 0.5);
            assert_eq!(reading.confidence, 0.7);
            assert!(reading.note.is_some());
        }
    }

    #[test]
    fn partial_provider_payload_gets_defaults() {
        let reading: EmotionReading = serde_json::from_str(r#"{"emotion":"joy"}"#).unwrap();
        assert_eq!(reading.emotion, "joy");
        assert_eq!(reading.intensity, 0.5);
        assert_eq!(reading.confidence, 0.7);
        assert!(reading.note.is_none());
    }
}

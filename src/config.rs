//! Application configuration loaded from environment variables.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// Presence or absence of each provider key is resolved here, once, at
/// startup. Handlers never consult the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Provider Credentials ===
    /// Emotion analysis API key. Absent means the neutral fallback is served.
    #[serde(default)]
    pub blossoms_api_key: Option<String>,

    /// LLM completion API key. Absent means the canned reply is served.
    #[serde(default)]
    pub openrouter_api_key: Option<String>,

    /// Geocoding/places API key. Absent disables school-local lookups.
    #[serde(default)]
    pub google_places_api_key: Option<String>,

    // === Persistence ===
    /// Firestore project id. Must be set together with the API key.
    #[serde(default)]
    pub firestore_project_id: Option<String>,

    /// Firestore API key.
    #[serde(default)]
    pub firestore_api_key: Option<String>,

    /// Firestore REST base URL.
    #[serde(default = "default_firestore_url")]
    pub firestore_url: String,

    // === Provider Endpoints ===
    /// Emotion analysis endpoint.
    #[serde(default = "default_blossoms_url")]
    pub blossoms_url: String,

    /// Chat completion endpoint.
    #[serde(default = "default_openrouter_url")]
    pub openrouter_url: String,

    /// Completion model identifier.
    #[serde(default = "default_openrouter_model")]
    pub openrouter_model: String,

    /// Geocoding endpoint.
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,

    /// Places nearby-search endpoint.
    #[serde(default = "default_places_nearby_url")]
    pub places_nearby_url: String,

    /// Places text-search endpoint.
    #[serde(default = "default_places_text_url")]
    pub places_text_url: String,

    // === Request Tuning ===
    /// Emotion analysis timeout in seconds.
    #[serde(default = "default_emotion_timeout")]
    pub emotion_timeout_secs: u64,

    /// Completion timeout in seconds.
    #[serde(default = "default_completion_timeout")]
    pub completion_timeout_secs: u64,

    /// Geocoding/places timeout in seconds.
    #[serde(default = "default_places_timeout")]
    pub places_timeout_secs: u64,

    /// Document store timeout in seconds.
    #[serde(default = "default_store_timeout")]
    pub store_timeout_secs: u64,

    /// Token cap per completion request.
    #[serde(default = "default_completion_max_tokens")]
    pub completion_max_tokens: u32,

    /// Prior exchanges replayed as chat context.
    #[serde(default = "default_chat_history_limit")]
    pub chat_history_limit: usize,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed browser origin for CORS.
    #[serde(default = "default_frontend_origin")]
    pub frontend_origin: String,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,

    /// Enable the Prometheus exporter.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Prometheus exporter port.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

fn default_firestore_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_blossoms_url() -> String {
    "https://api.blossoms.ai/v1/analyze".to_string()
}

fn default_openrouter_url() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_openrouter_model() -> String {
    "anthropic/claude-3.5-sonnet".to_string()
}

fn default_geocode_url() -> String {
    "https://maps.googleapis.com/maps/api/geocode/json".to_string()
}

fn default_places_nearby_url() -> String {
    "https://places.googleapis.com/v1/places:searchNearby".to_string()
}

fn default_places_text_url() -> String {
    "https://places.googleapis.com/v1/places:searchText".to_string()
}

fn default_emotion_timeout() -> u64 {
    10
}

fn default_completion_timeout() -> u64 {
    25
}

fn default_places_timeout() -> u64 {
    12
}

fn default_store_timeout() -> u64 {
    10
}

fn default_completion_max_tokens() -> u32 {
    200
}

fn default_chat_history_limit() -> usize {
    8
}

fn default_port() -> u16 {
    8000
}

fn default_frontend_origin() -> String {
    "http://localhost:5001".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_port() -> u16 {
    9090
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.firestore_project_id.is_some() != self.firestore_api_key.is_some() {
            return Err(
                "FIRESTORE_PROJECT_ID and FIRESTORE_API_KEY must be set together".to_string(),
            );
        }

        if self.emotion_timeout_secs == 0
            || self.completion_timeout_secs == 0
            || self.places_timeout_secs == 0
            || self.store_timeout_secs == 0
        {
            return Err("timeouts must be greater than zero".to_string());
        }

        if self.chat_history_limit == 0 {
            return Err("CHAT_HISTORY_LIMIT must be greater than zero".to_string());
        }

        Ok(())
    }

    /// Whether Firestore persistence is configured.
    pub fn has_firestore(&self) -> bool {
        self.firestore_project_id.is_some() && self.firestore_api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_config() -> Config {
        Config {
            blossoms_api_key: None,
            openrouter_api_key: None,
            google_places_api_key: None,
            firestore_project_id: None,
            firestore_api_key: None,
            firestore_url: default_firestore_url(),
            blossoms_url: default_blossoms_url(),
            openrouter_url: default_openrouter_url(),
            openrouter_model: default_openrouter_model(),
            geocode_url: default_geocode_url(),
            places_nearby_url: default_places_nearby_url(),
            places_text_url: default_places_text_url(),
            emotion_timeout_secs: default_emotion_timeout(),
            completion_timeout_secs: default_completion_timeout(),
            places_timeout_secs: default_places_timeout(),
            store_timeout_secs: default_store_timeout(),
            completion_max_tokens: default_completion_max_tokens(),
            chat_history_limit: default_chat_history_limit(),
            port: default_port(),
            frontend_origin: default_frontend_origin(),
            rust_log: default_log_level(),
            verbose: false,
            metrics_enabled: true,
            metrics_port: default_metrics_port(),
        }
    }

    #[test]
    fn default_values_are_sensible() {
        assert_eq!(default_emotion_timeout(), 10);
        assert_eq!(default_completion_timeout(), 25);
        assert_eq!(default_chat_history_limit(), 8);
        assert_eq!(default_completion_max_tokens(), 200);
        assert_eq!(default_port(), 8000);
    }

    #[test]
    fn bare_config_is_valid() {
        let config = bare_config();
        assert!(config.validate().is_ok());
        assert!(!config.has_firestore());
    }

    #[test]
    fn validate_rejects_partial_firestore_credentials() {
        let mut config = bare_config();
        config.firestore_project_id = Some("unimind-test".to_string());
        assert!(config.validate().is_err());

        config.firestore_api_key = Some("key".to_string());
        assert!(config.validate().is_ok());
        assert!(config.has_firestore());
    }

    #[test]
    fn validate_rejects_zero_timeouts() {
        let mut config = bare_config();
        config.completion_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}

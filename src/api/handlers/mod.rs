//! HTTP API handlers, one module per resource.

pub mod board;
pub mod calendar;
pub mod chat;
pub mod health;
pub mod journal;
pub mod profile;
pub mod resources;

use std::sync::Arc;

use crate::config::Config;
use crate::providers::{CompletionProvider, EmotionProvider, PlacesProvider};
use crate::store::{self, Store};

/// User id assumed when the caller does not supply one.
pub const DEFAULT_USER_ID: &str = "demo_user";

pub(crate) fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

/// Application state shared with handlers.
///
/// Built once at startup; every provider has already resolved whether it
/// talks to a real endpoint or serves its fallback.
#[derive(Clone)]
pub struct AppState {
    /// Selected storage backend.
    pub store: Arc<dyn Store>,
    /// Emotion analysis client.
    pub emotion: EmotionProvider,
    /// Chat completion client.
    pub completion: CompletionProvider,
    /// Geocoding/places client.
    pub places: PlacesProvider,
    /// Prior exchanges replayed as chat context.
    pub chat_history_limit: usize,
}

impl AppState {
    /// Build state from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            store: store::from_config(config),
            emotion: EmotionProvider::new(config),
            completion: CompletionProvider::new(config),
            places: PlacesProvider::new(config),
            chat_history_limit: config.chat_history_limit,
        }
    }

    /// Build state over an explicit store, for tests and tooling.
    pub fn with_store(config: &Config, store: Arc<dyn Store>) -> Self {
        Self {
            store,
            emotion: EmotionProvider::new(config),
            completion: CompletionProvider::new(config),
            places: PlacesProvider::new(config),
            chat_history_limit: config.chat_history_limit,
        }
    }
}

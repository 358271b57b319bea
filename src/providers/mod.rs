//! Third-party API clients.
//!
//! Each provider is resolved once at startup from configuration. A missing
//! API key turns the provider into a fallback strategy rather than an error
//! source: the client keeps working with documented canned values.

pub mod completion;
pub mod emotion;
pub mod places;

pub use completion::CompletionProvider;
pub use emotion::EmotionProvider;
pub use places::PlacesProvider;

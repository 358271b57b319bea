//! HTTP API module: routes, handlers, and shared application state.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::{cors_layer, create_router};

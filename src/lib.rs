pub mod client;
pub mod config;
pub mod content;
pub mod explorer;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use state::AppState;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// `GET /` serves the article, `POST /` issues payment hashes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::get_article).post(handlers::request_hash))
        .layer(axum::middleware::from_fn(middleware::reader_identity_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

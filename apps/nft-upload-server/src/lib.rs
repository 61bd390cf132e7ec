//! NFT Upload Server Library
//!
//! Accepts base64-encoded PNG images over HTTP, stores them on Arweave and
//! returns the URI they are served from.
//!
//! # Modules
//!
//! - `arweave`: Wallets, transactions and gateway access
//! - `upload`: The submission flow behind the upload endpoint
//! - `trigger`: Client that posts a sample image for smoke testing

pub mod arweave;
pub mod config;
pub mod routes;
pub mod state;
pub mod trigger;
pub mod upload;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/health", routes::health::router())
        .merge(routes::upload::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

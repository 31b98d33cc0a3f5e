//! # Mostrador API
//!
//! JSON HTTP server for the register SPA.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          API Server                                     │
//! │                                                                         │
//! │  SPA ───► axum Router ───► handlers (routes/) ───► mostrador-db        │
//! │                │                    │                    │              │
//! │           TraceLayer           ApiError            ShiftReconciler     │
//! │           CorsLayer          (status + JSON)       Repositories        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (or the same keys in `mostrador.toml`):
//! - `MOSTRADOR_BIND_ADDR` - Listen address (default: 0.0.0.0:8080)
//! - `MOSTRADOR_DATABASE_PATH` - SQLite file (default: ./mostrador.db)
//! - `MOSTRADOR_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `MOSTRADOR_UTC_OFFSET_HOURS` - Business timezone (default: -4)
//! - `MOSTRADOR_LOG_JSON` - JSON log lines (default: false)
//! - `MOSTRADOR_CORS_ALLOW_ANY` - Permissive CORS (default: false)
//!
//! Authentication and permission checks happen upstream of this server.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ErrorCode};
pub use state::AppState;

/// Builds the full application: routes plus HTTP layers.
pub fn app(state: AppState, config: &ApiConfig) -> Router {
    let router = routes::router(state).layer(TraceLayer::new_for_http());

    if config.cors_allow_any {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

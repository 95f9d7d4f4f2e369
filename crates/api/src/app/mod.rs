//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage and resolver wiring
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: response DTOs and query shapes
//! - `errors.rs`: the response envelope and error mapping

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/", get(routes::system::root))
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .fallback(errors::route_not_found)
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(CatchPanicLayer::custom(errors::panic_to_response)),
        )
}

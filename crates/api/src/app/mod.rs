//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the injected user store
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use axum::{http::StatusCode, Extension, Router};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: AppServices) -> Router {
    with_middleware(routes::router().layer(Extension(services)))
}

/// Wrap a router with request logging and panic recovery.
///
/// Logging is the outer layer so that responses produced by panic recovery
/// are logged too.
pub fn with_middleware(router: Router) -> Router {
    router
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::log_requests))
                .layer(CatchPanicLayer::custom(middleware::recover_panic)),
        )
}

async fn not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "Not Found")
}

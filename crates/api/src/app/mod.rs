//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the domain collaborators handlers call into
//! - `routes/`: one router per service (decoders, validators, handlers)
//! - `dto/`: request/response shapes and their validation rules

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use crate::config::TransportConfig;

pub mod dto;
pub mod routes;
pub mod services;

pub use services::{AppServices, build_in_memory_services};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: TransportConfig, services: AppServices) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(Arc::new(services)))
        .layer(Extension(Arc::new(config)))
}

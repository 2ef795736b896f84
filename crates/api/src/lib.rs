//! HTTP API: request transport pipeline, service routers and configuration.

pub mod app;
pub mod config;
pub mod transport;

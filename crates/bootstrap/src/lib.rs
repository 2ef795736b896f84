//! `thingmesh-bootstrap`: per-device bootstrap configuration.
//!
//! A config binds an external device identity (`external_id`/`external_key`)
//! to a platform thing and the channels it should use on first boot.

pub mod config;
pub mod service;

pub use config::{
    BootstrapConfig, BootstrapPayload, Certs, Config, ConfigChannel, ConfigUpdate, NewConfig, State,
};
pub use service::{BootstrapService, ConfigReader};

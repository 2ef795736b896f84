//! `thingmesh-auth`: key issuing boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod key;
pub mod service;

pub use key::{IssuedKey, Key, KeyType};
pub use service::AuthService;

//! Infrastructure layer: in-memory implementations of the service traits.
//!
//! These back the dev binary and the API tests. Every record is scoped by the
//! caller's bearer token, which plays the role of the owner identity.

pub mod auth;
pub mod bootstrap;
pub mod provision;
pub mod store;
pub mod things;

pub use auth::InMemoryAuth;
pub use bootstrap::{InMemoryBootstrap, JsonConfigReader};
pub use provision::InMemoryProvision;
pub use store::OwnerStore;
pub use things::InMemoryThings;

/// Fresh random secret for generated thing keys and auth key values.
pub(crate) fn new_secret() -> String {
    uuid::Uuid::new_v4().to_string()
}

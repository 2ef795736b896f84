use chrono::Duration;

use thingmesh_core::DomainResult;

use crate::{IssuedKey, Key, KeyType};

/// Key management operations exposed over HTTP.
///
/// `token` is the caller's bearer credential; implementations decide what it
/// identifies.
pub trait AuthService: Send + Sync {
    fn issue(
        &self,
        token: &str,
        key_type: KeyType,
        ttl: Option<Duration>,
    ) -> DomainResult<IssuedKey>;

    fn retrieve(&self, token: &str, id: &str) -> DomainResult<Key>;

    fn revoke(&self, token: &str, id: &str) -> DomainResult<()>;
}

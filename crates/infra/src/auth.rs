use chrono::{Duration, Utc};

use thingmesh_auth::{AuthService, IssuedKey, Key, KeyType};
use thingmesh_core::{DomainError, DomainResult, EntityId};

use crate::store::OwnerStore;

/// Keys indexed by issuer.
#[derive(Debug, Default)]
pub struct InMemoryAuth {
    keys: OwnerStore<EntityId, Key>,
}

impl InMemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuthService for InMemoryAuth {
    fn issue(
        &self,
        token: &str,
        key_type: KeyType,
        ttl: Option<Duration>,
    ) -> DomainResult<IssuedKey> {
        let key = Key::new(key_type, token, Utc::now(), ttl);
        self.keys.upsert(token, key.id, key.clone());
        tracing::debug!(key_id = %key.id, "key issued");
        Ok(IssuedKey {
            key,
            value: crate::new_secret(),
        })
    }

    /// Expired keys are reported as missing.
    fn retrieve(&self, token: &str, id: &str) -> DomainResult<Key> {
        let id = EntityId::parse_canonical(id).map_err(|_| DomainError::not_found())?;
        self.keys
            .get(token, &id)
            .filter(|key| !key.is_expired(Utc::now()))
            .ok_or_else(DomainError::not_found)
    }

    fn revoke(&self, token: &str, id: &str) -> DomainResult<()> {
        if let Ok(id) = EntityId::parse_canonical(id) {
            self.keys.remove(token, &id);
        }
        Ok(())
    }
}

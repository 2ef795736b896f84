//! Entity identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Identifier of a thing, channel, config or key.
///
/// Identifiers may be assigned by the client, in which case they must be in
/// canonical form (lower-case, hyphenated).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse an identifier, accepting only the canonical hyphenated
    /// lower-case rendering.
    pub fn parse_canonical(s: &str) -> DomainResult<Self> {
        let uuid = Uuid::parse_str(s)
            .map_err(|e| DomainError::wrap(crate::ErrorKind::MalformedEntity, e))?;
        if uuid.hyphenated().to_string() != s {
            return Err(DomainError::malformed());
        }
        Ok(Self(uuid))
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl From<Uuid> for EntityId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<EntityId> for Uuid {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

impl FromStr for EntityId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_canonical(s)
    }
}

/// Returns `true` when `s` is a UUID in canonical form.
pub fn is_canonical_uuid(s: &str) -> bool {
    EntityId::parse_canonical(s).is_ok()
}

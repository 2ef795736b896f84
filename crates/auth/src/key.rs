use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use thingmesh_core::{DomainError, EntityId};

/// Kind of key the auth service issues.
///
/// The wire representation is the numeric code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum KeyType {
    Login,
    Recovery,
    Api,
}

impl KeyType {
    pub fn code(self) -> u32 {
        match self {
            KeyType::Login => 0,
            KeyType::Recovery => 1,
            KeyType::Api => 2,
        }
    }
}

impl TryFrom<u32> for KeyType {
    type Error = DomainError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(KeyType::Login),
            1 => Ok(KeyType::Recovery),
            2 => Ok(KeyType::Api),
            _ => Err(DomainError::malformed()),
        }
    }
}

impl Serialize for KeyType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.code())
    }
}

impl<'de> Deserialize<'de> for KeyType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u32::deserialize(deserializer)?;
        KeyType::try_from(code).map_err(serde::de::Error::custom)
    }
}

/// Stored key metadata (never carries the secret).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub issuer: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Key {
    pub fn new(
        key_type: KeyType,
        issuer: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            id: EntityId::new(),
            key_type,
            issuer: issuer.into(),
            issued_at,
            expires_at: ttl.map(|d| issued_at + d),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// A freshly issued key together with its secret value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedKey {
    pub key: Key,
    pub value: String,
}

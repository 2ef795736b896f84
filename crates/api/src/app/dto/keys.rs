use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use thingmesh_auth::{IssuedKey, Key, KeyType};
use thingmesh_core::{DomainError, DomainResult, EntityId};

use crate::transport::{
    Validate,
    validate::{ensure, require_token},
};

/// `POST /keys` body. `duration` is in seconds; absent means no expiry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IssueKeyBody {
    #[serde(rename = "type")]
    pub key_type: Option<u32>,
    pub duration: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct IssueKeyRequest {
    pub token: String,
    pub body: IssueKeyBody,
}

impl IssueKeyRequest {
    pub fn key_type(&self) -> DomainResult<KeyType> {
        self.body
            .key_type
            .ok_or_else(DomainError::malformed)
            .and_then(KeyType::try_from)
    }

    pub fn ttl(&self) -> DomainResult<Option<Duration>> {
        self.body
            .duration
            .map(|secs| {
                i64::try_from(secs)
                    .ok()
                    .and_then(Duration::try_seconds)
                    .ok_or_else(DomainError::malformed)
            })
            .transpose()
    }
}

impl Validate for IssueKeyRequest {
    fn validate(&self) -> DomainResult<()> {
        require_token(&self.token)?;
        self.key_type()?;
        ensure(self.ttl()?.is_none_or(|ttl| ttl > Duration::zero()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedKeyView {
    pub id: EntityId,
    pub value: String,
    pub issued_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<IssuedKey> for IssuedKeyView {
    fn from(issued: IssuedKey) -> Self {
        Self {
            id: issued.key.id,
            value: issued.value,
            issued_at: issued.key.issued_at,
            expires_at: issued.key.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyView {
    pub id: EntityId,
    pub issuer_id: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub issued_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Key> for KeyView {
    fn from(key: Key) -> Self {
        Self {
            id: key.id,
            issuer_id: key.issuer,
            key_type: key.key_type,
            issued_at: key.issued_at,
            expires_at: key.expires_at,
        }
    }
}

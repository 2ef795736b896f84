use core::str::FromStr;

use serde::{Deserialize, Serialize};

use thingmesh_core::DomainError;

/// Free-form JSON object attached to things and channels.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A device or application that talks to the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thing {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub key: String,
    pub metadata: Option<Metadata>,
}

/// Thing to be created; `id` and `key` are assigned when absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewThing {
    pub id: Option<String>,
    pub name: String,
    pub key: Option<String>,
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThingUpdate {
    pub id: String,
    pub name: String,
    pub metadata: Option<Metadata>,
}

/// Message topic things publish to and subscribe from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewChannel {
    pub id: Option<String>,
    pub name: String,
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelUpdate {
    pub id: String,
    pub name: String,
    pub metadata: Option<Metadata>,
}

/// Access a thing is shared with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    Read,
    Write,
    Delete,
}

impl Policy {
    pub const VALUES: [&'static str; 3] = ["read", "write", "delete"];
}

impl FromStr for Policy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Policy::Read),
            "write" => Ok(Policy::Write),
            "delete" => Ok(Policy::Delete),
            _ => Err(DomainError::malformed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_values_all_parse() {
        for v in Policy::VALUES {
            assert!(v.parse::<Policy>().is_ok());
        }
        assert!("admin".parse::<Policy>().is_err());
    }
}

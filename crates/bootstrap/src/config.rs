use serde::{Deserialize, Serialize};

use thingmesh_core::DomainError;

/// Whether a config's thing is allowed to exchange messages.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum State {
    #[default]
    Inactive,
    Active,
}

impl State {
    pub fn code(self) -> i64 {
        match self {
            State::Inactive => 0,
            State::Active => 1,
        }
    }
}

impl TryFrom<i64> for State {
    type Error = DomainError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(State::Inactive),
            1 => Ok(State::Active),
            _ => Err(DomainError::malformed()),
        }
    }
}

impl Serialize for State {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for State {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(deserializer)?;
        State::try_from(code).map_err(serde::de::Error::custom)
    }
}

/// Channel as seen from a bootstrap config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigChannel {
    pub id: String,
    pub name: String,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Stored bootstrap configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub thing_id: String,
    pub thing_key: String,
    pub owner: String,
    pub name: String,
    pub external_id: String,
    pub external_key: String,
    pub channels: Vec<ConfigChannel>,
    pub content: String,
    pub client_cert: String,
    pub client_key: String,
    pub ca_cert: String,
    pub state: State,
}

impl Config {
    /// Field lookup by the names list filters use.
    pub fn field(&self, key: &str) -> Option<String> {
        match key {
            "state" => Some(self.state.code().to_string()),
            "external_id" => Some(self.external_id.clone()),
            "mainflux_id" => Some(self.thing_id.clone()),
            "mainflux_key" => Some(self.thing_key.clone()),
            "name" => Some(self.name.clone()),
            _ => None,
        }
    }
}

/// Config to be registered; `thing_id` is assigned when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewConfig {
    pub thing_id: Option<String>,
    pub external_id: String,
    pub external_key: String,
    pub channels: Vec<String>,
    pub name: String,
    pub content: String,
    pub client_cert: String,
    pub client_key: String,
    pub ca_cert: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub thing_id: String,
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Certs {
    pub client_cert: String,
    pub client_key: String,
    pub ca_cert: String,
}

/// What a device receives when it bootstraps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub mainflux_id: String,
    pub mainflux_key: String,
    pub mainflux_channels: Vec<ConfigChannel>,
    pub content: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub client_cert: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub client_key: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub ca_cert: String,
}

impl From<&Config> for BootstrapConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            mainflux_id: cfg.thing_id.clone(),
            mainflux_key: cfg.thing_key.clone(),
            mainflux_channels: cfg.channels.clone(),
            content: cfg.content.clone(),
            client_cert: cfg.client_cert.clone(),
            client_key: cfg.client_key.clone(),
            ca_cert: cfg.ca_cert.clone(),
        }
    }
}

/// Output of a [`crate::ConfigReader`].
#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapPayload {
    /// Structured config, returned as JSON.
    Plain(BootstrapConfig),
    /// Opaque bytes (e.g. encrypted config), returned verbatim.
    Sealed(Vec<u8>),
}

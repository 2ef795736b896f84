//! `thingmesh-provision`: one-shot device provisioning.

use serde::{Deserialize, Serialize};

use thingmesh_core::DomainResult;
use thingmesh_things::{Channel, Thing};

/// Everything created for a provisioned device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provisioned {
    pub things: Vec<Thing>,
    pub channels: Vec<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_cert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<String>,
    pub whitelisted: bool,
}

/// Provisioning operations.
pub trait ProvisionService: Send + Sync {
    /// Create the thing, channels and bootstrap config for an external device.
    fn provision(
        &self,
        token: &str,
        name: &str,
        external_id: &str,
        external_key: &str,
    ) -> DomainResult<Provisioned>;

    /// Describe the template provisioning applies.
    fn mapping(&self, token: &str) -> DomainResult<serde_json::Value>;
}

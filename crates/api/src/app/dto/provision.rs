use serde::Deserialize;

use thingmesh_core::DomainResult;

use crate::transport::{
    Validate,
    validate::{ensure, name_len, require_token},
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProvisionBody {
    pub external_id: String,
    pub external_key: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub token: String,
    pub body: ProvisionBody,
}

impl Validate for ProvisionRequest {
    fn validate(&self) -> DomainResult<()> {
        require_token(&self.token)?;
        ensure(!self.body.external_id.is_empty() && !self.body.external_key.is_empty())?;
        name_len(&self.body.name)
    }
}

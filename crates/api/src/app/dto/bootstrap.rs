use serde::{Deserialize, Serialize};

use thingmesh_bootstrap::{Certs, Config, ConfigChannel, ConfigUpdate, NewConfig, State};
use thingmesh_core::{DomainError, DomainResult, Filter, Page};

use crate::app::dto::PageView;
use crate::transport::{
    FilterKeys, Pagination, Validate,
    validate::{ensure, name_len, optional_uuid, require_id, require_token},
};

/// Query keys `GET /things/configs` filters on.
pub const CONFIG_FILTER_KEYS: FilterKeys = FilterKeys {
    full_match: &["state", "external_id", "mainflux_id", "mainflux_key"],
    partial_match: &["name"],
};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddConfigBody {
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

#[derive(Debug, Clone)]
pub struct AddConfigRequest {
    pub token: String,
    pub body: AddConfigBody,
}

impl Validate for AddConfigRequest {
    fn validate(&self) -> DomainResult<()> {
        require_token(&self.token)?;
        ensure(!self.body.external_id.is_empty() && !self.body.external_key.is_empty())?;
        optional_uuid(self.body.thing_id.as_deref())?;
        name_len(&self.body.name)
    }
}

impl From<AddConfigBody> for NewConfig {
    fn from(body: AddConfigBody) -> Self {
        Self {
            thing_id: body.thing_id.filter(|id| !id.is_empty()),
            external_id: body.external_id,
            external_key: body.external_key,
            channels: body.channels,
            name: body.name,
            content: body.content,
            client_cert: body.client_cert,
            client_key: body.client_key,
            ca_cert: body.ca_cert,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateConfigBody {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct UpdateConfigRequest {
    pub token: String,
    pub id: String,
    pub body: UpdateConfigBody,
}

impl Validate for UpdateConfigRequest {
    fn validate(&self) -> DomainResult<()> {
        require_token(&self.token)?;
        require_id(&self.id)?;
        name_len(&self.body.name)
    }
}

impl UpdateConfigRequest {
    pub fn into_update(self) -> ConfigUpdate {
        ConfigUpdate {
            thing_id: self.id,
            name: self.body.name,
            content: self.body.content,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateCertsBody {
    pub client_cert: String,
    pub client_key: String,
    pub ca_cert: String,
}

impl From<UpdateCertsBody> for Certs {
    fn from(body: UpdateCertsBody) -> Self {
        Self {
            client_cert: body.client_cert,
            client_key: body.client_key,
            ca_cert: body.ca_cert,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateConnectionsBody {
    pub channels: Vec<String>,
}

/// Path-addressed update whose body needs no checks beyond well-formed JSON.
#[derive(Debug, Clone)]
pub struct ConfigBodyRequest<B> {
    pub token: String,
    pub id: String,
    pub body: B,
}

impl<B> Validate for ConfigBodyRequest<B> {
    fn validate(&self) -> DomainResult<()> {
        require_token(&self.token)?;
        require_id(&self.id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChangeStateBody {
    pub state: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ChangeStateRequest {
    pub token: String,
    pub id: String,
    pub state: Option<i64>,
}

impl ChangeStateRequest {
    pub fn state(&self) -> DomainResult<State> {
        self.state.ok_or_else(DomainError::malformed).and_then(State::try_from)
    }
}

impl Validate for ChangeStateRequest {
    fn validate(&self) -> DomainResult<()> {
        require_token(&self.token)?;
        require_id(&self.id)?;
        self.state().map(|_| ())
    }
}

#[derive(Debug, Clone)]
pub struct ListConfigsRequest {
    pub token: String,
    pub filter: Filter,
    pub pagination: Pagination,
}

impl Validate for ListConfigsRequest {
    fn validate(&self) -> DomainResult<()> {
        require_token(&self.token)?;
        ensure(self.pagination.limit > 0)
    }
}

/// Device-side fetch; the device authenticates with its external key.
#[derive(Debug, Clone)]
pub struct BootstrapRequest {
    pub external_key: String,
    pub external_id: String,
    pub secure: bool,
}

impl Validate for BootstrapRequest {
    fn validate(&self) -> DomainResult<()> {
        require_token(&self.external_key)?;
        require_id(&self.external_id)
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ChannelView {
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl From<ConfigChannel> for ChannelView {
    fn from(c: ConfigChannel) -> Self {
        Self {
            id: c.id,
            name: c.name,
            metadata: c.metadata,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigView {
    pub mainflux_id: String,
    pub mainflux_key: String,
    pub channels: Vec<ChannelView>,
    pub external_id: String,
    pub external_key: String,
    pub content: String,
    pub name: String,
    pub state: State,
}

impl From<Config> for ConfigView {
    fn from(c: Config) -> Self {
        Self {
            mainflux_id: c.thing_id,
            mainflux_key: c.thing_key,
            channels: c.channels.into_iter().map(ChannelView::from).collect(),
            external_id: c.external_id,
            external_key: c.external_key,
            content: c.content,
            name: c.name,
            state: c.state,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigPageView {
    #[serde(flatten)]
    pub page: PageView,
    pub configs: Vec<ConfigView>,
}

impl From<Page<Config>> for ConfigPageView {
    fn from(page: Page<Config>) -> Self {
        Self {
            page: PageView::of(&page),
            configs: page.items.into_iter().map(ConfigView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use thingmesh_core::ErrorKind;

    use super::*;

    fn add(token: &str, body: AddConfigBody) -> AddConfigRequest {
        AddConfigRequest {
            token: token.into(),
            body,
        }
    }

    fn valid_body() -> AddConfigBody {
        AddConfigBody {
            external_id: "ext".into(),
            external_key: "key".into(),
            ..AddConfigBody::default()
        }
    }

    #[test]
    fn add_rules_in_order() {
        assert!(add("t", valid_body()).validate().is_ok());
        assert_eq!(
            add("", AddConfigBody::default()).validate().unwrap_err().kind(),
            ErrorKind::AuthenticationFailed
        );

        let missing_key = AddConfigBody {
            external_key: String::new(),
            ..valid_body()
        };
        assert_eq!(
            add("t", missing_key).validate().unwrap_err().kind(),
            ErrorKind::MalformedEntity
        );

        let bad_id = AddConfigBody {
            thing_id: Some("THING".into()),
            ..valid_body()
        };
        assert!(add("t", bad_id).validate().is_err());

        let empty_id = AddConfigBody {
            thing_id: Some(String::new()),
            ..valid_body()
        };
        let req = add("t", empty_id);
        assert!(req.validate().is_ok());
        assert_eq!(NewConfig::from(req.body).thing_id, None);
    }

    #[test]
    fn state_must_be_known() {
        let req = |state| ChangeStateRequest {
            token: "t".into(),
            id: "id".into(),
            state,
        };
        assert_eq!(req(Some(1)).state().unwrap(), State::Active);
        assert!(req(Some(0)).validate().is_ok());
        assert!(req(Some(2)).validate().is_err());
        assert!(req(None).validate().is_err());
    }

    #[test]
    fn bootstrap_without_external_key_is_unauthenticated() {
        let req = BootstrapRequest {
            external_key: String::new(),
            external_id: String::new(),
            secure: false,
        };
        assert_eq!(req.validate().unwrap_err().kind(), ErrorKind::AuthenticationFailed);
    }

    #[test]
    fn page_view_flattens_counters() {
        let view = ConfigPageView::from(Page::<Config>::empty(5, 10));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["total"], 0);
        assert_eq!(json["offset"], 5);
        assert_eq!(json["limit"], 10);
        assert!(json["configs"].as_array().unwrap().is_empty());
    }
}

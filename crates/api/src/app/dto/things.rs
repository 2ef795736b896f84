use serde::{Deserialize, Serialize};

use thingmesh_core::{DomainResult, Page};
use thingmesh_things::{
    Channel, ChannelUpdate, Metadata, NewChannel, NewThing, Policy, Thing, ThingUpdate,
};

use crate::app::dto::PageView;
use crate::transport::{
    Validate,
    validate::{ensure, name_len, one_of, optional_uuid, require_id, require_token},
};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThingBody {
    pub id: Option<String>,
    pub name: String,
    pub key: Option<String>,
    pub metadata: Option<Metadata>,
}

impl From<ThingBody> for NewThing {
    fn from(body: ThingBody) -> Self {
        Self {
            id: body.id.filter(|id| !id.is_empty()),
            name: body.name,
            key: body.key.filter(|key| !key.is_empty()),
            metadata: body.metadata,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChannelBody {
    pub id: Option<String>,
    pub name: String,
    pub metadata: Option<Metadata>,
}

impl From<ChannelBody> for NewChannel {
    fn from(body: ChannelBody) -> Self {
        Self {
            id: body.id.filter(|id| !id.is_empty()),
            name: body.name,
            metadata: body.metadata,
        }
    }
}

/// Fields every created entity body shares.
pub trait NewEntity {
    fn id(&self) -> Option<&str>;
    fn name(&self) -> &str;
}

impl NewEntity for ThingBody {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl NewEntity for ChannelBody {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Single or bulk creation; single creation carries exactly one entity.
#[derive(Debug, Clone)]
pub struct CreateRequest<B> {
    pub token: String,
    pub entities: Vec<B>,
}

impl<B: NewEntity> Validate for CreateRequest<B> {
    fn validate(&self) -> DomainResult<()> {
        require_token(&self.token)?;
        ensure(!self.entities.is_empty())?;
        for entity in &self.entities {
            optional_uuid(entity.id())?;
            name_len(entity.name())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShareThingBody {
    pub user_ids: Vec<String>,
    pub policies: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ShareThingRequest {
    pub token: String,
    pub thing_id: String,
    pub body: ShareThingBody,
}

impl ShareThingRequest {
    pub fn policies(&self) -> DomainResult<Vec<Policy>> {
        self.body.policies.iter().map(|p| p.parse::<Policy>()).collect()
    }
}

impl Validate for ShareThingRequest {
    fn validate(&self) -> DomainResult<()> {
        require_token(&self.token)?;
        ensure(
            !self.thing_id.is_empty()
                && !self.body.user_ids.is_empty()
                && !self.body.policies.is_empty(),
        )?;
        for policy in &self.body.policies {
            one_of(policy, &Policy::VALUES)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateBody {
    pub name: String,
    pub metadata: Option<Metadata>,
}

/// Rename/re-tag a thing or channel.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub token: String,
    pub id: String,
    pub body: UpdateBody,
}

impl Validate for UpdateRequest {
    fn validate(&self) -> DomainResult<()> {
        require_token(&self.token)?;
        require_id(&self.id)?;
        name_len(&self.body.name)
    }
}

impl UpdateRequest {
    pub fn into_thing_update(self) -> ThingUpdate {
        ThingUpdate {
            id: self.id,
            name: self.body.name,
            metadata: self.body.metadata,
        }
    }

    pub fn into_channel_update(self) -> ChannelUpdate {
        ChannelUpdate {
            id: self.id,
            name: self.body.name,
            metadata: self.body.metadata,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateKeyBody {
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct UpdateKeyRequest {
    pub token: String,
    pub id: String,
    pub key: String,
}

impl Validate for UpdateKeyRequest {
    fn validate(&self) -> DomainResult<()> {
        require_token(&self.token)?;
        ensure(!self.id.is_empty() && !self.key.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConnectBody {
    pub channel_ids: Vec<String>,
    pub thing_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ConnectRequest {
    pub token: String,
    pub body: ConnectBody,
}

impl Validate for ConnectRequest {
    fn validate(&self) -> DomainResult<()> {
        require_token(&self.token)?;
        let ConnectBody { channel_ids, thing_ids } = &self.body;
        ensure(!channel_ids.is_empty() && !thing_ids.is_empty())?;
        ensure(channel_ids.iter().chain(thing_ids).all(|id| !id.is_empty()))
    }
}

/// One channel/thing pair.
#[derive(Debug, Clone)]
pub struct ConnectionRequest {
    pub token: String,
    pub channel_id: String,
    pub thing_id: String,
}

impl Validate for ConnectionRequest {
    fn validate(&self) -> DomainResult<()> {
        require_token(&self.token)?;
        ensure(!self.channel_id.is_empty() && !self.thing_id.is_empty())
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ThingView {
    pub id: String,
    pub owner: String,
    pub name: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl From<Thing> for ThingView {
    fn from(t: Thing) -> Self {
        Self {
            id: t.id,
            owner: t.owner,
            name: t.name,
            key: t.key,
            metadata: t.metadata,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelView {
    pub id: String,
    pub owner: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl From<Channel> for ChannelView {
    fn from(c: Channel) -> Self {
        Self {
            id: c.id,
            owner: c.owner,
            name: c.name,
            metadata: c.metadata,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ThingsView {
    pub things: Vec<ThingView>,
}

impl From<Vec<Thing>> for ThingsView {
    fn from(things: Vec<Thing>) -> Self {
        Self {
            things: things.into_iter().map(ThingView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelsView {
    pub channels: Vec<ChannelView>,
}

impl From<Vec<Channel>> for ChannelsView {
    fn from(channels: Vec<Channel>) -> Self {
        Self {
            channels: channels.into_iter().map(ChannelView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ThingPageView {
    #[serde(flatten)]
    pub page: PageView,
    #[serde(flatten)]
    pub things: ThingsView,
}

impl From<Page<Thing>> for ThingPageView {
    fn from(page: Page<Thing>) -> Self {
        Self {
            page: PageView::of(&page),
            things: page.items.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelPageView {
    #[serde(flatten)]
    pub page: PageView,
    #[serde(flatten)]
    pub channels: ChannelsView,
}

impl From<Page<Channel>> for ChannelPageView {
    fn from(page: Page<Channel>) -> Self {
        Self {
            page: PageView::of(&page),
            channels: page.items.into(),
        }
    }
}

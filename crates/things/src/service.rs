use thingmesh_core::{DomainResult, Page, PageMetadata};

use crate::{Channel, ChannelUpdate, NewChannel, NewThing, Policy, Thing, ThingUpdate};

/// Thing and channel management.
///
/// Arguments arrive already validated; implementations own authorization and
/// persistence.
pub trait ThingsService: Send + Sync {
    fn create_things(&self, token: &str, things: Vec<NewThing>) -> DomainResult<Vec<Thing>>;

    fn share_thing(
        &self,
        token: &str,
        thing_id: &str,
        policies: Vec<Policy>,
        user_ids: Vec<String>,
    ) -> DomainResult<()>;

    fn update_thing(&self, token: &str, update: ThingUpdate) -> DomainResult<()>;

    fn update_key(&self, token: &str, id: &str, key: &str) -> DomainResult<()>;

    fn view_thing(&self, token: &str, id: &str) -> DomainResult<Thing>;

    fn list_things(&self, token: &str, page: PageMetadata) -> DomainResult<Page<Thing>>;

    fn list_things_by_channel(
        &self,
        token: &str,
        channel_id: &str,
        page: PageMetadata,
    ) -> DomainResult<Page<Thing>>;

    fn list_things_by_group(
        &self,
        token: &str,
        group_id: &str,
        page: PageMetadata,
    ) -> DomainResult<Page<Thing>>;

    fn remove_thing(&self, token: &str, id: &str) -> DomainResult<()>;

    fn create_channels(&self, token: &str, channels: Vec<NewChannel>) -> DomainResult<Vec<Channel>>;

    fn update_channel(&self, token: &str, update: ChannelUpdate) -> DomainResult<()>;

    fn view_channel(&self, token: &str, id: &str) -> DomainResult<Channel>;

    fn list_channels(&self, token: &str, page: PageMetadata) -> DomainResult<Page<Channel>>;

    fn list_channels_by_thing(
        &self,
        token: &str,
        thing_id: &str,
        page: PageMetadata,
    ) -> DomainResult<Page<Channel>>;

    fn remove_channel(&self, token: &str, id: &str) -> DomainResult<()>;

    /// Connect every listed thing to every listed channel.
    fn connect(
        &self,
        token: &str,
        channel_ids: &[String],
        thing_ids: &[String],
    ) -> DomainResult<()>;

    fn disconnect(&self, token: &str, channel_id: &str, thing_id: &str) -> DomainResult<()>;
}

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};

use thingmesh_core::{Direction, DomainError, DomainResult, EntityId, Order, Page, PageMetadata};
use thingmesh_things::{
    Channel, ChannelUpdate, NewChannel, NewThing, Policy, Thing, ThingUpdate, ThingsService,
};

use crate::store::OwnerStore;

/// Name filter, sort and slice shared by every listing.
fn paginate<T>(
    mut items: Vec<T>,
    page: &PageMetadata,
    name: impl Fn(&T) -> &str,
    id: impl Fn(&T) -> &str,
) -> Page<T> {
    if let Some(fragment) = page.name.as_deref().map(str::to_lowercase) {
        items.retain(|item| name(item).to_lowercase().contains(&fragment));
    }
    let by = |a: &T, b: &T| -> Ordering {
        match page.order {
            Some(Order::Name) => name(a).cmp(name(b)).then_with(|| id(a).cmp(id(b))),
            Some(Order::Id) | None => id(a).cmp(id(b)),
        }
    };
    match page.dir.unwrap_or_default() {
        Direction::Asc => items.sort_by(by),
        Direction::Desc => items.sort_by(|a, b| by(b, a)),
    }
    Page::from_all(items, page.offset, page.limit)
}

fn assign_id(id: Option<String>) -> String {
    id.filter(|id| !id.is_empty())
        .unwrap_or_else(|| EntityId::new().to_string())
}

/// Things, channels and their connections.
#[derive(Debug, Default)]
pub struct InMemoryThings {
    things: OwnerStore<String, Thing>,
    channels: OwnerStore<String, Channel>,
    /// `(owner, channel_id, thing_id)`
    connections: RwLock<BTreeSet<(String, String, String)>>,
    /// thing id → `(user, policy)` grants
    shares: RwLock<HashMap<String, Vec<(String, Policy)>>>,
}

impl InMemoryThings {
    pub fn new() -> Self {
        Self::default()
    }

    fn owned_thing(&self, owner: &str, id: &str) -> DomainResult<Thing> {
        self.things
            .get(owner, &id.to_string())
            .ok_or_else(DomainError::not_found)
    }

    fn owned_channel(&self, owner: &str, id: &str) -> DomainResult<Channel> {
        self.channels
            .get(owner, &id.to_string())
            .ok_or_else(DomainError::not_found)
    }

    fn shared_with(&self, user: &str, thing_id: &str, policy: Policy) -> bool {
        self.shares
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(thing_id)
            .is_some_and(|grants| grants.iter().any(|(u, p)| u == user && *p == policy))
    }

    fn connected(&self, owner: &str, pick: impl Fn(&str, &str) -> Option<String>) -> Vec<String> {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(o, _, _)| o == owner)
            .filter_map(|(_, channel, thing)| pick(channel, thing))
            .collect()
    }

    fn drop_connections(&self, owner: &str, matches: impl Fn(&str, &str) -> bool) {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(o, channel, thing)| !(o == owner && matches(channel, thing)));
    }
}

impl ThingsService for InMemoryThings {
    fn create_things(&self, token: &str, things: Vec<NewThing>) -> DomainResult<Vec<Thing>> {
        let created: Vec<Thing> = things
            .into_iter()
            .map(|t| Thing {
                id: assign_id(t.id),
                owner: token.to_string(),
                name: t.name,
                key: t.key.filter(|k| !k.is_empty()).unwrap_or_else(crate::new_secret),
                metadata: t.metadata,
            })
            .collect();

        let entries = created.iter().map(|t| (t.id.clone(), t.clone())).collect();
        self.things.insert_all_unless(token, entries, |new, other| {
            new.id == other.id || new.key == other.key
        })?;
        tracing::debug!(count = created.len(), "things created");
        Ok(created)
    }

    fn share_thing(
        &self,
        token: &str,
        thing_id: &str,
        policies: Vec<Policy>,
        user_ids: Vec<String>,
    ) -> DomainResult<()> {
        // Lock order: shares, then things (same as remove_thing).
        let mut shares = self.shares.write().unwrap_or_else(PoisonError::into_inner);
        self.owned_thing(token, thing_id)?;
        let grants = shares.entry(thing_id.to_string()).or_default();
        for user in &user_ids {
            for policy in &policies {
                if !grants.iter().any(|(u, p)| u == user && p == policy) {
                    grants.push((user.clone(), *policy));
                }
            }
        }
        Ok(())
    }

    fn update_thing(&self, token: &str, update: ThingUpdate) -> DomainResult<()> {
        let ThingUpdate { id, name, metadata } = update;
        if self.things.update(token, &id, |t| {
            t.name = name;
            t.metadata = metadata;
        }) {
            Ok(())
        } else {
            Err(DomainError::not_found())
        }
    }

    fn update_key(&self, token: &str, id: &str, key: &str) -> DomainResult<()> {
        self.things
            .update_unless(token, &id.to_string(), |t| t.key == key, |t| t.key = key.to_string())
    }

    fn view_thing(&self, token: &str, id: &str) -> DomainResult<Thing> {
        if let Ok(thing) = self.owned_thing(token, id) {
            return Ok(thing);
        }
        match self.things.find(|t| t.id == id) {
            Some((_, thing)) if self.shared_with(token, id, Policy::Read) => Ok(thing),
            _ => Err(DomainError::not_found()),
        }
    }

    fn list_things(&self, token: &str, page: PageMetadata) -> DomainResult<Page<Thing>> {
        Ok(paginate(self.things.list(token), &page, |t| t.name.as_str(), |t| t.id.as_str()))
    }

    fn list_things_by_channel(
        &self,
        token: &str,
        channel_id: &str,
        page: PageMetadata,
    ) -> DomainResult<Page<Thing>> {
        self.owned_channel(token, channel_id)?;
        let things = self
            .connected(token, |channel, thing| (channel == channel_id).then(|| thing.to_string()))
            .into_iter()
            .filter_map(|id| self.things.get(token, &id))
            .collect();
        Ok(paginate(things, &page, |t| t.name.as_str(), |t| t.id.as_str()))
    }

    fn list_things_by_group(
        &self,
        _token: &str,
        _group_id: &str,
        page: PageMetadata,
    ) -> DomainResult<Page<Thing>> {
        Ok(Page::empty(page.offset, page.limit))
    }

    fn remove_thing(&self, token: &str, id: &str) -> DomainResult<()> {
        let mut shares = self.shares.write().unwrap_or_else(PoisonError::into_inner);
        if self.things.remove(token, &id.to_string()).is_some() {
            shares.remove(id);
            drop(shares);
            self.drop_connections(token, |_, thing| thing == id);
        }
        Ok(())
    }

    fn create_channels(
        &self,
        token: &str,
        channels: Vec<NewChannel>,
    ) -> DomainResult<Vec<Channel>> {
        let created: Vec<Channel> = channels
            .into_iter()
            .map(|c| Channel {
                id: assign_id(c.id),
                owner: token.to_string(),
                name: c.name,
                metadata: c.metadata,
            })
            .collect();

        let entries = created.iter().map(|c| (c.id.clone(), c.clone())).collect();
        self.channels
            .insert_all_unless(token, entries, |new, other| new.id == other.id)?;
        tracing::debug!(count = created.len(), "channels created");
        Ok(created)
    }

    fn update_channel(&self, token: &str, update: ChannelUpdate) -> DomainResult<()> {
        let ChannelUpdate { id, name, metadata } = update;
        if self.channels.update(token, &id, |c| {
            c.name = name;
            c.metadata = metadata;
        }) {
            Ok(())
        } else {
            Err(DomainError::not_found())
        }
    }

    fn view_channel(&self, token: &str, id: &str) -> DomainResult<Channel> {
        self.owned_channel(token, id)
    }

    fn list_channels(&self, token: &str, page: PageMetadata) -> DomainResult<Page<Channel>> {
        Ok(paginate(self.channels.list(token), &page, |c| c.name.as_str(), |c| c.id.as_str()))
    }

    fn list_channels_by_thing(
        &self,
        token: &str,
        thing_id: &str,
        page: PageMetadata,
    ) -> DomainResult<Page<Channel>> {
        self.owned_thing(token, thing_id)?;
        let channels = self
            .connected(token, |channel, thing| (thing == thing_id).then(|| channel.to_string()))
            .into_iter()
            .filter_map(|id| self.channels.get(token, &id))
            .collect();
        Ok(paginate(channels, &page, |c| c.name.as_str(), |c| c.id.as_str()))
    }

    fn remove_channel(&self, token: &str, id: &str) -> DomainResult<()> {
        if self.channels.remove(token, &id.to_string()).is_some() {
            self.drop_connections(token, |channel, _| channel == id);
        }
        Ok(())
    }

    fn connect(
        &self,
        token: &str,
        channel_ids: &[String],
        thing_ids: &[String],
    ) -> DomainResult<()> {
        for id in channel_ids {
            self.owned_channel(token, id)?;
        }
        for id in thing_ids {
            self.owned_thing(token, id)?;
        }
        let mut connections = self.connections.write().unwrap_or_else(PoisonError::into_inner);
        for channel in channel_ids {
            for thing in thing_ids {
                connections.insert((token.to_string(), channel.clone(), thing.clone()));
            }
        }
        Ok(())
    }

    fn disconnect(&self, token: &str, channel_id: &str, thing_id: &str) -> DomainResult<()> {
        let removed = self
            .connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(token.to_string(), channel_id.to_string(), thing_id.to_string()));
        if removed { Ok(()) } else { Err(DomainError::not_found()) }
    }
}

#[cfg(test)]
mod tests {
    use thingmesh_core::ErrorKind;

    use super::*;

    fn named(name: &str) -> NewThing {
        NewThing {
            name: name.into(),
            ..NewThing::default()
        }
    }

    fn channel(name: &str) -> NewChannel {
        NewChannel {
            name: name.into(),
            ..NewChannel::default()
        }
    }

    #[test]
    fn create_assigns_ids_and_keys() {
        let svc = InMemoryThings::new();
        let things = svc.create_things("owner", vec![named("a"), named("b")]).unwrap();
        assert_eq!(things.len(), 2);
        assert_ne!(things[0].id, things[1].id);
        assert_ne!(things[0].key, things[1].key);
        assert!(things.iter().all(|t| t.owner == "owner"));
    }

    #[test]
    fn client_ids_must_be_unique() {
        let svc = InMemoryThings::new();
        let id = EntityId::new().to_string();
        let with_id = NewThing {
            id: Some(id.clone()),
            ..named("a")
        };
        svc.create_things("owner", vec![with_id.clone()]).unwrap();
        let err = svc.create_things("owner", vec![with_id]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn list_filters_sorts_and_pages() {
        let svc = InMemoryThings::new();
        let names = ["Beta", "alpha", "gamma", "Alpine"];
        svc.create_things("owner", names.into_iter().map(named).collect())
            .unwrap();

        let page = PageMetadata {
            name: Some("AL".into()),
            order: Some(Order::Name),
            dir: Some(Direction::Desc),
            ..PageMetadata::default()
        };
        let listed = svc.list_things("owner", page).unwrap();
        let names: Vec<String> = listed.items.into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["alpha", "Alpine"]);

        let page = PageMetadata {
            offset: 1,
            limit: 2,
            order: Some(Order::Name),
            ..PageMetadata::default()
        };
        let listed = svc.list_things("owner", page).unwrap();
        assert_eq!(listed.total, 4);
        assert_eq!(listed.items.len(), 2);
        assert_eq!(listed.items[0].name, "Beta");
    }

    #[test]
    fn connections_drive_cross_listings() {
        let svc = InMemoryThings::new();
        let things = svc.create_things("owner", vec![named("t1"), named("t2")]).unwrap();
        let channels = svc.create_channels("owner", vec![channel("c1")]).unwrap();
        let thing_ids: Vec<String> = things.iter().map(|t| t.id.clone()).collect();
        svc.connect("owner", &[channels[0].id.clone()], &thing_ids).unwrap();

        let page = svc
            .list_things_by_channel("owner", &channels[0].id, PageMetadata::default())
            .unwrap();
        assert_eq!(page.total, 2);

        svc.disconnect("owner", &channels[0].id, &things[0].id).unwrap();
        let page = svc
            .list_channels_by_thing("owner", &things[0].id, PageMetadata::default())
            .unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(
            svc.disconnect("owner", &channels[0].id, &things[0].id).unwrap_err().kind(),
            ErrorKind::NotFound
        );

        svc.remove_channel("owner", &channels[0].id).unwrap();
        let page = svc
            .list_channels_by_thing("owner", &things[1].id, PageMetadata::default())
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[test]
    fn connect_requires_owned_entities() {
        let svc = InMemoryThings::new();
        let things = svc.create_things("owner", vec![named("t")]).unwrap();
        let err = svc
            .connect("owner", &["missing".to_string()], &[things[0].id.clone()])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn sharing_grants_read_access() {
        let svc = InMemoryThings::new();
        let thing = svc.create_things("owner", vec![named("t")]).unwrap().remove(0);
        assert!(svc.view_thing("friend", &thing.id).is_err());

        svc.share_thing("owner", &thing.id, vec![Policy::Read], vec!["friend".into()])
            .unwrap();
        assert_eq!(svc.view_thing("friend", &thing.id).unwrap().id, thing.id);
    }

    #[test]
    fn removing_a_thing_revokes_its_grants() {
        let svc = InMemoryThings::new();
        let id = EntityId::new().to_string();
        let with_id = |name: &str| NewThing {
            id: Some(id.clone()),
            ..named(name)
        };

        svc.create_things("alice", vec![with_id("mine")]).unwrap();
        svc.share_thing("alice", &id, vec![Policy::Read], vec!["bob".into()])
            .unwrap();
        svc.remove_thing("alice", &id).unwrap();

        svc.create_things("carol", vec![with_id("theirs")]).unwrap();
        assert_eq!(svc.view_thing("bob", &id).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(svc.view_thing("carol", &id).unwrap().owner, "carol");
    }

    #[test]
    fn bulk_create_with_duplicate_ids_inserts_nothing() {
        let svc = InMemoryThings::new();
        let id = EntityId::new().to_string();
        let with_id = NewThing {
            id: Some(id.clone()),
            ..named("a")
        };
        let err = svc
            .create_things("owner", vec![named("b"), with_id.clone(), with_id])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(svc.list_things("owner", PageMetadata::default()).unwrap().total, 0);
    }

    #[test]
    fn key_update_rejects_taken_keys() {
        let svc = InMemoryThings::new();
        let things = svc.create_things("owner", vec![named("a"), named("b")]).unwrap();
        let err = svc.update_key("owner", &things[0].id, &things[1].key).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        svc.update_key("owner", &things[0].id, "fresh").unwrap();
        assert_eq!(svc.view_thing("owner", &things[0].id).unwrap().key, "fresh");
        svc.update_key("owner", &things[0].id, "fresh").unwrap();
        let err = svc.update_key("other", &things[0].id, "x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

use thingmesh_bootstrap::{
    BootstrapConfig, BootstrapPayload, BootstrapService, Certs, Config, ConfigChannel, ConfigReader,
    ConfigUpdate, NewConfig, State,
};
use thingmesh_core::{DomainError, DomainResult, EntityId, ErrorKind, Filter, Page};

use crate::store::OwnerStore;

fn channels(ids: Vec<String>) -> Vec<ConfigChannel> {
    ids.into_iter()
        .map(|id| ConfigChannel {
            id,
            name: String::new(),
            metadata: None,
        })
        .collect()
}

/// Bootstrap configs keyed by thing id.
#[derive(Debug, Default)]
pub struct InMemoryBootstrap {
    configs: OwnerStore<String, Config>,
}

impl InMemoryBootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    fn modify(&self, owner: &str, id: &str, f: impl FnOnce(&mut Config)) -> DomainResult<()> {
        if self.configs.update(owner, &id.to_string(), f) {
            Ok(())
        } else {
            Err(DomainError::not_found())
        }
    }
}

impl BootstrapService for InMemoryBootstrap {
    fn add(&self, token: &str, config: NewConfig) -> DomainResult<Config> {
        let thing_id = config
            .thing_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| EntityId::new().to_string());
        let saved = Config {
            thing_id: thing_id.clone(),
            thing_key: crate::new_secret(),
            owner: token.to_string(),
            name: config.name,
            external_id: config.external_id,
            external_key: config.external_key,
            channels: channels(config.channels),
            content: config.content,
            client_cert: config.client_cert,
            client_key: config.client_key,
            ca_cert: config.ca_cert,
            state: State::Inactive,
        };
        self.configs.insert_unless(token, thing_id, saved.clone(), |c| {
            c.thing_id == saved.thing_id || c.external_id == saved.external_id
        })?;
        tracing::debug!(thing_id = %saved.thing_id, "bootstrap config added");
        Ok(saved)
    }

    fn view(&self, token: &str, id: &str) -> DomainResult<Config> {
        self.configs
            .get(token, &id.to_string())
            .ok_or_else(DomainError::not_found)
    }

    fn update(&self, token: &str, update: ConfigUpdate) -> DomainResult<()> {
        self.modify(token, &update.thing_id, |c| {
            c.name = update.name;
            c.content = update.content;
        })
    }

    fn update_certs(&self, token: &str, thing_id: &str, certs: Certs) -> DomainResult<()> {
        self.modify(token, thing_id, |c| {
            c.client_cert = certs.client_cert;
            c.client_key = certs.client_key;
            c.ca_cert = certs.ca_cert;
        })
    }

    fn update_connections(&self, token: &str, id: &str, ids: Vec<String>) -> DomainResult<()> {
        self.modify(token, id, |c| c.channels = channels(ids))
    }

    fn list(
        &self,
        token: &str,
        filter: Filter,
        offset: u64,
        limit: u64,
    ) -> DomainResult<Page<Config>> {
        let mut matching: Vec<Config> = self
            .configs
            .list(token)
            .into_iter()
            .filter(|c| filter.matches(|key| c.field(key)))
            .collect();
        matching.sort_by(|a, b| a.thing_id.cmp(&b.thing_id));
        Ok(Page::from_all(matching, offset, limit))
    }

    fn bootstrap(
        &self,
        external_key: &str,
        external_id: &str,
        secure: bool,
    ) -> DomainResult<Config> {
        let (_, config) = self
            .configs
            .find(|c| c.external_id == external_id)
            .ok_or_else(DomainError::not_found)?;
        if config.external_key != external_key {
            let kind = if secure {
                ErrorKind::ExternalKeySecureRejected
            } else {
                ErrorKind::ExternalKeyRejected
            };
            return Err(DomainError::new(kind));
        }
        Ok(config)
    }

    fn change_state(&self, token: &str, id: &str, state: State) -> DomainResult<()> {
        self.modify(token, id, |c| c.state = state)
    }

    fn remove(&self, token: &str, id: &str) -> DomainResult<()> {
        self.configs.remove(token, &id.to_string());
        Ok(())
    }
}

/// Renders configs as their JSON bootstrap view.
///
/// Secure mode returns the serialized view as bytes; it does not encrypt.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonConfigReader;

impl ConfigReader for JsonConfigReader {
    fn read(&self, config: &Config, secure: bool) -> DomainResult<BootstrapPayload> {
        let view = BootstrapConfig::from(config);
        if !secure {
            return Ok(BootstrapPayload::Plain(view));
        }
        serde_json::to_vec(&view)
            .map(BootstrapPayload::Sealed)
            .map_err(|e| DomainError::wrap(ErrorKind::Internal, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_config(external_id: &str) -> NewConfig {
        NewConfig {
            external_id: external_id.into(),
            external_key: "ext-key".into(),
            channels: vec!["ch-1".into()],
            name: format!("Gateway {external_id}"),
            ..NewConfig::default()
        }
    }

    #[test]
    fn add_generates_ids_and_rejects_duplicates() {
        let svc = InMemoryBootstrap::new();
        let cfg = svc.add("owner", new_config("ext-1")).unwrap();
        assert!(thingmesh_core::id::is_canonical_uuid(&cfg.thing_id));
        assert_eq!(cfg.state, State::Inactive);
        assert_eq!(cfg.channels[0].id, "ch-1");

        let err = svc.add("other", new_config("ext-1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn concurrent_adds_of_one_external_id_admit_one() {
        use std::sync::Barrier;

        const WRITERS: usize = 8;
        for _ in 0..200 {
            let svc = InMemoryBootstrap::new();
            let barrier = Barrier::new(WRITERS);
            let added = std::thread::scope(|s| {
                let handles: Vec<_> = (0..WRITERS)
                    .map(|i| {
                        let (svc, barrier) = (&svc, &barrier);
                        s.spawn(move || {
                            barrier.wait();
                            svc.add(&format!("owner-{i}"), new_config("ext")).is_ok()
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|h| h.join().unwrap())
                    .filter(|ok| *ok)
                    .count()
            });
            assert_eq!(added, 1);
        }
    }

    #[test]
    fn views_are_owner_scoped() {
        let svc = InMemoryBootstrap::new();
        let cfg = svc.add("owner", new_config("ext-1")).unwrap();
        assert_eq!(svc.view("owner", &cfg.thing_id).unwrap(), cfg);
        assert_eq!(svc.view("intruder", &cfg.thing_id).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn list_applies_filter_and_paging() {
        let svc = InMemoryBootstrap::new();
        for i in 0..5 {
            svc.add("owner", new_config(&format!("ext-{i}"))).unwrap();
        }
        let mut filter = Filter::default();
        filter.partial_match.insert("name".into(), "gateway ext-3".into());
        let page = svc.list("owner", filter, 0, 10).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].external_id, "ext-3");

        let page = svc.list("owner", Filter::default(), 3, 10).unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
    }

    #[test]
    fn bootstrap_checks_external_key() {
        let svc = InMemoryBootstrap::new();
        svc.add("owner", new_config("ext-1")).unwrap();
        assert!(svc.bootstrap("ext-key", "ext-1", false).is_ok());
        assert_eq!(
            svc.bootstrap("wrong", "ext-1", false).unwrap_err().kind(),
            ErrorKind::ExternalKeyRejected
        );
        assert_eq!(
            svc.bootstrap("wrong", "ext-1", true).unwrap_err().kind(),
            ErrorKind::ExternalKeySecureRejected
        );
        let err = svc.bootstrap("ext-key", "ext-9", false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn secure_reader_returns_serialized_view() {
        let svc = InMemoryBootstrap::new();
        let cfg = svc.add("owner", new_config("ext-1")).unwrap();
        let BootstrapPayload::Sealed(bytes) = JsonConfigReader.read(&cfg, true).unwrap() else {
            panic!("expected sealed payload");
        };
        let view: BootstrapConfig = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(view.mainflux_id, cfg.thing_id);
    }
}

use std::sync::Arc;

use serde_json::{Value, json};

use thingmesh_bootstrap::{BootstrapService, NewConfig, State};
use thingmesh_core::DomainResult;
use thingmesh_provision::{ProvisionService, Provisioned};
use thingmesh_things::{Metadata, NewChannel, NewThing, ThingsService};

fn typed(kind: &str) -> Option<Metadata> {
    let mut metadata = Metadata::new();
    metadata.insert("type".into(), Value::String(kind.into()));
    Some(metadata)
}

/// Provisions one thing with a control and a data channel, then registers
/// and whitelists its bootstrap config.
pub struct InMemoryProvision {
    things: Arc<dyn ThingsService>,
    bootstrap: Arc<dyn BootstrapService>,
}

impl InMemoryProvision {
    pub fn new(things: Arc<dyn ThingsService>, bootstrap: Arc<dyn BootstrapService>) -> Self {
        Self { things, bootstrap }
    }

    fn rollback(&self, token: &str, thing_ids: &[String], channel_ids: &[String]) {
        for id in thing_ids {
            if let Err(e) = self.things.remove_thing(token, id) {
                tracing::warn!(thing_id = %id, error = %e, "provision rollback failed");
            }
        }
        for id in channel_ids {
            if let Err(e) = self.things.remove_channel(token, id) {
                tracing::warn!(channel_id = %id, error = %e, "provision rollback failed");
            }
        }
    }
}

impl ProvisionService for InMemoryProvision {
    fn provision(
        &self,
        token: &str,
        name: &str,
        external_id: &str,
        external_key: &str,
    ) -> DomainResult<Provisioned> {
        let things = self.things.create_things(
            token,
            vec![NewThing {
                name: name.to_string(),
                metadata: typed("device"),
                ..NewThing::default()
            }],
        )?;
        let thing_ids: Vec<String> = things.iter().map(|t| t.id.clone()).collect();

        let channels = match self.things.create_channels(
            token,
            vec![
                NewChannel {
                    name: format!("{name}-control"),
                    metadata: typed("control"),
                    ..NewChannel::default()
                },
                NewChannel {
                    name: format!("{name}-data"),
                    metadata: typed("data"),
                    ..NewChannel::default()
                },
            ],
        ) {
            Ok(channels) => channels,
            Err(e) => {
                self.rollback(token, &thing_ids, &[]);
                return Err(e);
            }
        };
        let channel_ids: Vec<String> = channels.iter().map(|c| c.id.clone()).collect();

        let registered = self
            .things
            .connect(token, &channel_ids, &thing_ids)
            .and_then(|()| {
                self.bootstrap.add(
                    token,
                    NewConfig {
                        thing_id: thing_ids.first().cloned(),
                        external_id: external_id.to_string(),
                        external_key: external_key.to_string(),
                        channels: channel_ids.clone(),
                        name: name.to_string(),
                        ..NewConfig::default()
                    },
                )
            });
        let config = match registered {
            Ok(config) => config,
            Err(e) => {
                self.rollback(token, &thing_ids, &channel_ids);
                return Err(e);
            }
        };

        let activated = self
            .bootstrap
            .change_state(token, &config.thing_id, State::Active);
        let whitelisted = match activated {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    thing_id = %config.thing_id,
                    error = %e,
                    "provisioned config left inactive"
                );
                false
            }
        };

        Ok(Provisioned {
            things,
            channels,
            client_cert: None,
            client_key: None,
            ca_cert: None,
            whitelisted,
        })
    }

    fn mapping(&self, _token: &str) -> DomainResult<Value> {
        Ok(json!({
            "things": [{ "name": "<name>", "metadata": { "type": "device" } }],
            "channels": [
                { "name": "<name>-control", "metadata": { "type": "control" } },
                { "name": "<name>-data", "metadata": { "type": "data" } },
            ],
            "bootstrap": { "state": State::Active.code() },
        }))
    }
}

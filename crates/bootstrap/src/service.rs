use thingmesh_core::{DomainResult, Filter, Page};

use crate::{BootstrapPayload, Certs, Config, ConfigUpdate, NewConfig, State};

/// Bootstrap configuration management.
pub trait BootstrapService: Send + Sync {
    fn add(&self, token: &str, config: NewConfig) -> DomainResult<Config>;

    fn view(&self, token: &str, id: &str) -> DomainResult<Config>;

    fn update(&self, token: &str, update: ConfigUpdate) -> DomainResult<()>;

    fn update_certs(&self, token: &str, thing_id: &str, certs: Certs) -> DomainResult<()>;

    fn update_connections(&self, token: &str, id: &str, channels: Vec<String>) -> DomainResult<()>;

    fn list(
        &self,
        token: &str,
        filter: Filter,
        offset: u64,
        limit: u64,
    ) -> DomainResult<Page<Config>>;

    /// Look up a config by the device's external identity.
    ///
    /// With `secure`, `external_key` is expected in its encrypted form.
    fn bootstrap(
        &self,
        external_key: &str,
        external_id: &str,
        secure: bool,
    ) -> DomainResult<Config>;

    fn change_state(&self, token: &str, id: &str, state: State) -> DomainResult<()>;

    fn remove(&self, token: &str, id: &str) -> DomainResult<()>;
}

/// Renders a config into what the device receives.
pub trait ConfigReader: Send + Sync {
    fn read(&self, config: &Config, secure: bool) -> DomainResult<BootstrapPayload>;
}

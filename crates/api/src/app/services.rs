//! Service wiring: the domain collaborators every router calls into.

use std::sync::Arc;

use thingmesh_auth::AuthService;
use thingmesh_bootstrap::{BootstrapService, ConfigReader};
use thingmesh_infra::{
    InMemoryAuth, InMemoryBootstrap, InMemoryProvision, InMemoryThings, JsonConfigReader,
};
use thingmesh_provision::ProvisionService;
use thingmesh_things::ThingsService;

/// Domain services shared by all handlers.
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<dyn AuthService>,
    pub things: Arc<dyn ThingsService>,
    pub bootstrap: Arc<dyn BootstrapService>,
    pub reader: Arc<dyn ConfigReader>,
    pub provision: Arc<dyn ProvisionService>,
}

/// In-memory wiring (dev/test).
pub fn build_in_memory_services() -> AppServices {
    let things: Arc<dyn ThingsService> = Arc::new(InMemoryThings::new());
    let bootstrap: Arc<dyn BootstrapService> = Arc::new(InMemoryBootstrap::new());
    let provision = Arc::new(InMemoryProvision::new(things.clone(), bootstrap.clone()));

    AppServices {
        auth: Arc::new(InMemoryAuth::new()),
        things,
        bootstrap,
        reader: Arc::new(JsonConfigReader),
        provision,
    }
}

//! `thingmesh-things`: things, channels and the connections between them.

pub mod model;
pub mod service;

pub use model::{Channel, ChannelUpdate, Metadata, NewChannel, NewThing, Policy, Thing, ThingUpdate};
pub use service::ThingsService;

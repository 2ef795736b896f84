use axum::Router;

use thingmesh_core::DomainResult;

use crate::app::dto::{EntityRequest, ListRequest, TokenRequest};
use crate::transport::Decoder;

pub mod bootstrap;
pub mod channels;
pub mod keys;
pub mod provision;
pub mod system;
pub mod things;

/// Router for all token-authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .merge(bootstrap::router())
        .merge(things::router())
        .merge(channels::router())
        .merge(provision::router())
        .merge(keys::router())
}

// Decoders shared by several services.

pub(crate) fn decode_entity(d: Decoder<'_>) -> DomainResult<EntityRequest> {
    Ok(EntityRequest {
        token: d.token()?,
        id: d.path("id"),
    })
}

pub(crate) fn decode_token(d: Decoder<'_>) -> DomainResult<TokenRequest> {
    Ok(TokenRequest { token: d.token()? })
}

pub(crate) fn decode_list(d: Decoder<'_>) -> DomainResult<ListRequest> {
    let token = d.token()?;
    Ok(ListRequest {
        token,
        id: None,
        page: d.page()?,
    })
}

/// Listing scoped to the entity named by the `:id` path parameter.
pub(crate) fn decode_scoped_list(d: Decoder<'_>) -> DomainResult<ListRequest> {
    let token = d.token()?;
    Ok(ListRequest {
        token,
        id: Some(d.path("id")),
        page: d.page()?,
    })
}

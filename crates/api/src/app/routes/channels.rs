//! Channels and thing/channel connections.

use std::sync::Arc;

use axum::{
    Router,
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::{get, post, put},
};

use thingmesh_core::{DomainError, DomainResult};

use crate::app::dto::things::{
    ChannelBody, ChannelPageView, ChannelView, ChannelsView, ConnectRequest, ConnectionRequest,
    CreateRequest, ThingPageView,
};
use crate::app::routes::{decode_entity, decode_list, decode_scoped_list, things::decode_update};
use crate::app::services::AppServices;
use crate::config::TransportConfig;
use crate::transport::{Decoder, Inbound, Pipeline, Reply};

pub fn router() -> Router {
    Router::new()
        .route("/channels", post(create_channel).get(list_channels))
        .route("/channels/bulk", post(create_channels))
        .route(
            "/channels/:id",
            get(view_channel).put(update_channel).delete(remove_channel),
        )
        .route("/channels/:id/things", get(list_things_by_channel))
        .route("/channels/:id/things/:thing_id", put(connect_thing).delete(disconnect_thing))
        .route("/connect", post(connect))
}

// -------------------------
// Decoders
// -------------------------

fn decode_create(d: Decoder<'_>) -> DomainResult<CreateRequest<ChannelBody>> {
    let d = d.json()?;
    let token = d.token()?;
    Ok(CreateRequest {
        token,
        entities: vec![d.body()?],
    })
}

fn decode_create_bulk(d: Decoder<'_>) -> DomainResult<CreateRequest<ChannelBody>> {
    let d = d.json()?;
    let token = d.token()?;
    Ok(CreateRequest {
        token,
        entities: d.body()?,
    })
}

fn decode_connection(d: Decoder<'_>) -> DomainResult<ConnectionRequest> {
    Ok(ConnectionRequest {
        token: d.token()?,
        channel_id: d.path("id"),
        thing_id: d.path("thing_id"),
    })
}

fn decode_connect(d: Decoder<'_>) -> DomainResult<ConnectRequest> {
    let d = d.json()?;
    Ok(ConnectRequest {
        token: d.token()?,
        body: d.body()?,
    })
}

// -------------------------
// Handlers
// -------------------------

pub async fn create_channel(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("channels.create", &config).run(&inbound, decode_create, |req| {
        let CreateRequest { token, entities } = req.into_inner();
        let created = services
            .things
            .create_channels(&token, entities.into_iter().map(Into::into).collect())?;
        let channel = created
            .first()
            .ok_or_else(|| DomainError::internal("no channel returned from create"))?;
        Reply::created(&format!("/channels/{}", channel.id))
    })
}

pub async fn create_channels(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("channels.create_bulk", &config).run(&inbound, decode_create_bulk, |req| {
        let CreateRequest { token, entities } = req.into_inner();
        let created = services
            .things
            .create_channels(&token, entities.into_iter().map(Into::into).collect())?;
        Ok(Reply::with_status(StatusCode::CREATED, ChannelsView::from(created)))
    })
}

pub async fn view_channel(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("channels.view", &config).run(&inbound, decode_entity, |req| {
        let channel = services.things.view_channel(&req.token, &req.id)?;
        Ok(Reply::Json(ChannelView::from(channel)))
    })
}

pub async fn list_channels(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("channels.list", &config).run(&inbound, decode_list, |req| {
        let page = services.things.list_channels(&req.token, req.page.to_metadata()?)?;
        Ok(Reply::Json(ChannelPageView::from(page)))
    })
}

pub async fn update_channel(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("channels.update", &config).run(&inbound, decode_update, |req| {
        let req = req.into_inner();
        let token = req.token.clone();
        services.things.update_channel(&token, req.into_channel_update())?;
        Ok(Reply::empty())
    })
}

pub async fn remove_channel(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("channels.remove", &config).run(&inbound, decode_entity, |req| {
        services.things.remove_channel(&req.token, &req.id)?;
        Ok(Reply::no_content())
    })
}

pub async fn list_things_by_channel(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("channels.list_things", &config).run(&inbound, decode_scoped_list, |req| {
        let page = services
            .things
            .list_things_by_channel(&req.token, req.parent(), req.page.to_metadata()?)?;
        Ok(Reply::Json(ThingPageView::from(page)))
    })
}

pub async fn connect_thing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("channels.connect_thing", &config).run(&inbound, decode_connection, |req| {
        services.things.connect(
            &req.token,
            std::slice::from_ref(&req.channel_id),
            std::slice::from_ref(&req.thing_id),
        )?;
        Ok(Reply::empty())
    })
}

pub async fn disconnect_thing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("channels.disconnect_thing", &config).run(&inbound, decode_connection, |req| {
        services.things.disconnect(&req.token, &req.channel_id, &req.thing_id)?;
        Ok(Reply::no_content())
    })
}

pub async fn connect(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("channels.connect", &config).run(&inbound, decode_connect, |req| {
        services
            .things
            .connect(&req.token, &req.body.channel_ids, &req.body.thing_ids)?;
        Ok(Reply::empty())
    })
}

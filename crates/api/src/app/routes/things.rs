use std::sync::Arc;

use axum::{
    Router,
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::{get, patch, post},
};

use thingmesh_core::{DomainError, DomainResult};

use crate::app::dto::things::{
    ChannelPageView, CreateRequest, ShareThingRequest, ThingBody, ThingPageView, ThingView,
    ThingsView, UpdateKeyBody, UpdateKeyRequest, UpdateRequest,
};
use crate::app::routes::{decode_entity, decode_list, decode_scoped_list};
use crate::app::services::AppServices;
use crate::config::TransportConfig;
use crate::transport::{Decoder, Inbound, Pipeline, Reply};

pub fn router() -> Router {
    Router::new()
        .route("/things", post(create_thing).get(list_things))
        .route("/things/bulk", post(create_things))
        .route(
            "/things/:id",
            get(view_thing).put(update_thing).delete(remove_thing),
        )
        .route("/things/:id/share", post(share_thing))
        .route("/things/:id/key", patch(update_key))
        .route("/things/:id/channels", get(list_channels_by_thing))
        .route("/groups/:id/things", get(list_things_by_group))
}

// -------------------------
// Decoders
// -------------------------

fn decode_create(d: Decoder<'_>) -> DomainResult<CreateRequest<ThingBody>> {
    let d = d.json()?;
    let token = d.token()?;
    Ok(CreateRequest {
        token,
        entities: vec![d.body()?],
    })
}

fn decode_create_bulk(d: Decoder<'_>) -> DomainResult<CreateRequest<ThingBody>> {
    let d = d.json()?;
    let token = d.token()?;
    Ok(CreateRequest {
        token,
        entities: d.body()?,
    })
}

pub(crate) fn decode_update(d: Decoder<'_>) -> DomainResult<UpdateRequest> {
    let d = d.json()?;
    Ok(UpdateRequest {
        token: d.token()?,
        id: d.path("id"),
        body: d.body()?,
    })
}

fn decode_share(d: Decoder<'_>) -> DomainResult<ShareThingRequest> {
    let d = d.json()?;
    Ok(ShareThingRequest {
        token: d.token()?,
        thing_id: d.path("id"),
        body: d.body()?,
    })
}

fn decode_update_key(d: Decoder<'_>) -> DomainResult<UpdateKeyRequest> {
    let d = d.json()?;
    let token = d.token()?;
    let body: UpdateKeyBody = d.body()?;
    Ok(UpdateKeyRequest {
        token,
        id: d.path("id"),
        key: body.key,
    })
}

// -------------------------
// Handlers
// -------------------------

pub async fn create_thing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("things.create", &config).run(&inbound, decode_create, |req| {
        let CreateRequest { token, entities } = req.into_inner();
        let created = services
            .things
            .create_things(&token, entities.into_iter().map(Into::into).collect())?;
        let thing = created
            .first()
            .ok_or_else(|| DomainError::internal("no thing returned from create"))?;
        Reply::created(&format!("/things/{}", thing.id))
    })
}

pub async fn create_things(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("things.create_bulk", &config).run(&inbound, decode_create_bulk, |req| {
        let CreateRequest { token, entities } = req.into_inner();
        let created = services
            .things
            .create_things(&token, entities.into_iter().map(Into::into).collect())?;
        Ok(Reply::with_status(StatusCode::CREATED, ThingsView::from(created)))
    })
}

pub async fn share_thing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("things.share", &config).run(&inbound, decode_share, |req| {
        let policies = req.policies()?;
        let req = req.into_inner();
        services
            .things
            .share_thing(&req.token, &req.thing_id, policies, req.body.user_ids)?;
        Ok(Reply::empty())
    })
}

pub async fn view_thing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("things.view", &config).run(&inbound, decode_entity, |req| {
        let thing = services.things.view_thing(&req.token, &req.id)?;
        Ok(Reply::Json(ThingView::from(thing)))
    })
}

pub async fn list_things(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("things.list", &config).run(&inbound, decode_list, |req| {
        let page = services.things.list_things(&req.token, req.page.to_metadata()?)?;
        Ok(Reply::Json(ThingPageView::from(page)))
    })
}

pub async fn update_thing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("things.update", &config).run(&inbound, decode_update, |req| {
        let req = req.into_inner();
        let token = req.token.clone();
        services.things.update_thing(&token, req.into_thing_update())?;
        Ok(Reply::empty())
    })
}

pub async fn update_key(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("things.update_key", &config).run(&inbound, decode_update_key, |req| {
        services.things.update_key(&req.token, &req.id, &req.key)?;
        Ok(Reply::empty())
    })
}

pub async fn remove_thing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("things.remove", &config).run(&inbound, decode_entity, |req| {
        services.things.remove_thing(&req.token, &req.id)?;
        Ok(Reply::no_content())
    })
}

pub async fn list_channels_by_thing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("things.list_channels", &config).run(&inbound, decode_scoped_list, |req| {
        let page = services
            .things
            .list_channels_by_thing(&req.token, req.parent(), req.page.to_metadata()?)?;
        Ok(Reply::Json(ChannelPageView::from(page)))
    })
}

pub async fn list_things_by_group(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("groups.list_things", &config).run(&inbound, decode_scoped_list, |req| {
        let page = services
            .things
            .list_things_by_group(&req.token, req.parent(), req.page.to_metadata()?)?;
        Ok(Reply::Json(ThingPageView::from(page)))
    })
}

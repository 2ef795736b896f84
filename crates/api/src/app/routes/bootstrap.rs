//! Bootstrap config management and the device-facing bootstrap fetch.

use std::sync::Arc;

use axum::{
    Router,
    extract::Extension,
    response::Response,
    routing::{get, patch, post, put},
};

use thingmesh_bootstrap::BootstrapPayload;
use thingmesh_core::DomainResult;

use crate::app::dto::{
    bootstrap::{
        AddConfigRequest, BootstrapRequest, CONFIG_FILTER_KEYS, ChangeStateBody, ChangeStateRequest,
        ConfigBodyRequest, ConfigPageView, ConfigView, ListConfigsRequest, UpdateCertsBody,
        UpdateConfigRequest, UpdateConnectionsBody,
    },
};
use crate::app::routes::decode_entity;
use crate::app::services::AppServices;
use crate::config::TransportConfig;
use crate::transport::{Decoder, Inbound, Pipeline, Reply};

pub fn router() -> Router {
    Router::new()
        .route("/things/configs", post(add_config).get(list_configs))
        .route(
            "/things/configs/:id",
            get(view_config).put(update_config).delete(remove_config),
        )
        .route("/things/configs/certs/:id", patch(update_certs))
        .route("/things/configs/connections/:id", put(update_connections))
        .route("/things/bootstrap/:external_id", get(bootstrap))
        .route("/things/bootstrap/secure/:external_id", get(bootstrap_secure))
        .route("/things/state/:id", put(change_state))
}

// -------------------------
// Decoders
// -------------------------

fn decode_add(d: Decoder<'_>) -> DomainResult<AddConfigRequest> {
    let d = d.json()?;
    Ok(AddConfigRequest {
        token: d.token()?,
        body: d.body()?,
    })
}

fn decode_update(d: Decoder<'_>) -> DomainResult<UpdateConfigRequest> {
    let d = d.json()?;
    Ok(UpdateConfigRequest {
        token: d.token()?,
        id: d.path("id"),
        body: d.body()?,
    })
}

fn decode_with_body<B: serde::de::DeserializeOwned>(
    d: Decoder<'_>,
) -> DomainResult<ConfigBodyRequest<B>> {
    let d = d.json()?;
    Ok(ConfigBodyRequest {
        token: d.token()?,
        id: d.path("id"),
        body: d.body()?,
    })
}

fn decode_state(d: Decoder<'_>) -> DomainResult<ChangeStateRequest> {
    let d = d.json()?;
    let token = d.token()?;
    let body: ChangeStateBody = d.body()?;
    Ok(ChangeStateRequest {
        token,
        id: d.path("id"),
        state: body.state,
    })
}

fn decode_list(d: Decoder<'_>) -> DomainResult<ListConfigsRequest> {
    let token = d.token()?;
    Ok(ListConfigsRequest {
        token,
        pagination: d.pagination()?,
        filter: d.filter(&CONFIG_FILTER_KEYS),
    })
}

fn decode_bootstrap(secure: bool) -> impl FnOnce(Decoder<'_>) -> DomainResult<BootstrapRequest> {
    move |d: Decoder<'_>| {
        Ok(BootstrapRequest {
            external_key: d.token()?,
            external_id: d.path("external_id"),
            secure,
        })
    }
}

// -------------------------
// Handlers
// -------------------------

pub async fn add_config(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("bootstrap.add", &config).run(&inbound, decode_add, |req| {
        let AddConfigRequest { token, body } = req.into_inner();
        let saved = services.bootstrap.add(&token, body.into())?;
        Reply::created(&format!("/things/configs/{}", saved.thing_id))
    })
}

pub async fn view_config(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("bootstrap.view", &config).run(&inbound, decode_entity, |req| {
        let found = services.bootstrap.view(&req.token, &req.id)?;
        Ok(Reply::Json(ConfigView::from(found)))
    })
}

pub async fn update_config(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("bootstrap.update", &config).run(&inbound, decode_update, |req| {
        let req = req.into_inner();
        let token = req.token.clone();
        services.bootstrap.update(&token, req.into_update())?;
        Ok(Reply::empty())
    })
}

pub async fn update_certs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("bootstrap.update_certs", &config).run(
        &inbound,
        decode_with_body::<UpdateCertsBody>,
        |req| {
            let ConfigBodyRequest { token, id, body } = req.into_inner();
            services.bootstrap.update_certs(&token, &id, body.into())?;
            Ok(Reply::empty())
        },
    )
}

pub async fn update_connections(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("bootstrap.update_connections", &config).run(
        &inbound,
        decode_with_body::<UpdateConnectionsBody>,
        |req| {
            let ConfigBodyRequest { token, id, body } = req.into_inner();
            services.bootstrap.update_connections(&token, &id, body.channels)?;
            Ok(Reply::empty())
        },
    )
}

pub async fn list_configs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("bootstrap.list", &config).run(&inbound, decode_list, |req| {
        let ListConfigsRequest { token, filter, pagination } = req.into_inner();
        let page = services
            .bootstrap
            .list(&token, filter, pagination.offset, pagination.limit)?;
        Ok(Reply::Json(ConfigPageView::from(page)))
    })
}

pub async fn bootstrap(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    fetch(&services, &config, &inbound, false)
}

pub async fn bootstrap_secure(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    fetch(&services, &config, &inbound, true)
}

fn fetch(
    services: &AppServices,
    config: &TransportConfig,
    inbound: &Inbound,
    secure: bool,
) -> Response {
    let endpoint = if secure { "bootstrap.fetch_secure" } else { "bootstrap.fetch" };
    Pipeline::new(endpoint, config).run(inbound, decode_bootstrap(secure), |req| {
        let found = services
            .bootstrap
            .bootstrap(&req.external_key, &req.external_id, req.secure)?;
        Ok(match services.reader.read(&found, req.secure)? {
            BootstrapPayload::Plain(view) => Reply::Json(view),
            BootstrapPayload::Sealed(bytes) => Reply::Raw(bytes.into()),
        })
    })
}

pub async fn change_state(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("bootstrap.change_state", &config).run(&inbound, decode_state, |req| {
        let state = req.state()?;
        services.bootstrap.change_state(&req.token, &req.id, state)?;
        Ok(Reply::empty())
    })
}

pub async fn remove_config(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("bootstrap.remove", &config).run(&inbound, decode_entity, |req| {
        services.bootstrap.remove(&req.token, &req.id)?;
        Ok(Reply::no_content())
    })
}

use std::sync::Arc;

use axum::{
    Router,
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::{get, post},
};

use thingmesh_core::DomainResult;

use crate::app::dto::keys::{IssueKeyRequest, IssuedKeyView, KeyView};
use crate::app::routes::decode_entity;
use crate::app::services::AppServices;
use crate::config::TransportConfig;
use crate::transport::{Decoder, Inbound, Pipeline, Reply};

pub fn router() -> Router {
    Router::new()
        .route("/keys", post(issue_key))
        .route("/keys/:id", get(retrieve_key).delete(revoke_key))
}

fn decode_issue(d: Decoder<'_>) -> DomainResult<IssueKeyRequest> {
    let d = d.json()?;
    Ok(IssueKeyRequest {
        token: d.token()?,
        body: d.body()?,
    })
}

pub async fn issue_key(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("keys.issue", &config).run(&inbound, decode_issue, |req| {
        let issued = services.auth.issue(&req.token, req.key_type()?, req.ttl()?)?;
        Ok(Reply::with_status(StatusCode::CREATED, IssuedKeyView::from(issued)))
    })
}

pub async fn retrieve_key(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("keys.retrieve", &config).run(&inbound, decode_entity, |req| {
        let key = services.auth.retrieve(&req.token, &req.id)?;
        Ok(Reply::Json(KeyView::from(key)))
    })
}

pub async fn revoke_key(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("keys.revoke", &config).run(&inbound, decode_entity, |req| {
        services.auth.revoke(&req.token, &req.id)?;
        Ok(Reply::no_content())
    })
}

use std::sync::Arc;

use axum::{Router, extract::Extension, http::StatusCode, response::Response, routing::post};

use thingmesh_core::DomainResult;

use crate::app::dto::provision::ProvisionRequest;
use crate::app::routes::decode_token;
use crate::app::services::AppServices;
use crate::config::TransportConfig;
use crate::transport::{Decoder, Inbound, Pipeline, Reply};

pub fn router() -> Router {
    Router::new().route("/mapping", post(provision).get(mapping))
}

fn decode_provision(d: Decoder<'_>) -> DomainResult<ProvisionRequest> {
    let d = d.json()?;
    Ok(ProvisionRequest {
        token: d.token()?,
        body: d.body()?,
    })
}

pub async fn provision(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("provision.provision", &config).run(&inbound, decode_provision, |req| {
        let body = &req.body;
        let provisioned = services
            .provision
            .provision(&req.token, &body.name, &body.external_id, &body.external_key)?;
        Ok(Reply::with_status(StatusCode::CREATED, provisioned))
    })
}

pub async fn mapping(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(config): Extension<Arc<TransportConfig>>,
    inbound: Inbound,
) -> Response {
    Pipeline::new("provision.mapping", &config).run(&inbound, decode_token, |req| {
        Ok(Reply::Json(services.provision.mapping(&req.token)?))
    })
}

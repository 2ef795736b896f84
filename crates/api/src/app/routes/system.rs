use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::transport::Reply;

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub description: &'static str,
}

pub async fn health() -> Response {
    Reply::Json(Health {
        status: "pass",
        version: env!("CARGO_PKG_VERSION"),
        description: "thingmesh api",
    })
    .into_response()
}

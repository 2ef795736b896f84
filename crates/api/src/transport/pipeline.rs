use axum::response::{IntoResponse, Response};
use serde::Serialize;

use thingmesh_core::DomainResult;

use crate::config::TransportConfig;
use crate::transport::{
    decode::Decoder,
    errors::ApiError,
    inbound::Inbound,
    reply::Reply,
    validate::{Validate, Validated},
};

/// decode → validate → invoke → encode, with any failure sent to the error mapper.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a> {
    endpoint: &'static str,
    config: &'a TransportConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(endpoint: &'static str, config: &'a TransportConfig) -> Self {
        Self { endpoint, config }
    }

    pub fn run<R, O>(
        &self,
        inbound: &Inbound,
        decode: impl FnOnce(Decoder<'_>) -> DomainResult<R>,
        invoke: impl FnOnce(Validated<R>) -> DomainResult<Reply<O>>,
    ) -> Response
    where
        R: Validate,
        O: Serialize,
    {
        let span = tracing::debug_span!("endpoint", name = self.endpoint);
        let _guard = span.enter();

        let outcome = decode(Decoder::new(inbound, self.config))
            .and_then(Validated::new)
            .and_then(invoke)
            .and_then(Reply::encode);

        match outcome {
            Ok(response) => {
                tracing::debug!(
                    endpoint = self.endpoint,
                    status = response.status().as_u16(),
                    "request served"
                );
                response
            }
            Err(err) => {
                tracing::debug!(endpoint = self.endpoint, kind = %err.kind(), "request failed");
                ApiError(err).into_response()
            }
        }
    }
}

use std::collections::HashMap;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{HeaderMap, HeaderName, HeaderValue},
};

use thingmesh_core::{DomainError, ErrorKind};

use crate::transport::errors::ApiError;

/// Everything the decoders need from an HTTP request, detached from axum.
#[derive(Debug, Clone, Default)]
pub struct Inbound {
    headers: HeaderMap,
    path: HashMap<String, String>,
    query: String,
    body: Bytes,
}

impl Inbound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: HeaderName, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }

    pub fn with_path_param(mut self, name: &str, value: &str) -> Self {
        self.path.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = query.to_string();
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path.get(name).map(String::as_str)
    }

    pub fn raw_query(&self) -> &str {
        &self.query
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[async_trait]
impl<S> FromRequest<S> for Inbound
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        // Routes without parameters reject `Path`; that is just "no parameters".
        let path = Path::<HashMap<String, String>>::from_request_parts(&mut parts, state)
            .await
            .map(|Path(params)| params)
            .unwrap_or_default();
        let query = parts.uri.query().unwrap_or_default().to_string();
        let headers = parts.headers.clone();

        let body = Bytes::from_request(Request::from_parts(parts, body), state)
            .await
            .map_err(|e| DomainError::wrap(ErrorKind::MalformedEntity, e))?;

        Ok(Self {
            headers,
            path,
            query,
            body,
        })
    }
}

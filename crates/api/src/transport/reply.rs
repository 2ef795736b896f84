//! Success encoding.

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, HeaderValue, StatusCode, header::{CONTENT_TYPE, LOCATION}},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use thingmesh_core::{DomainError, DomainResult, ErrorKind};

use crate::transport::{JSON_CONTENT_TYPE, errors::ApiError};

/// What an endpoint answers with on success.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    /// 200 with `T` as the JSON body.
    Json(T),
    /// Custom status and headers; `body: None` writes no body.
    Meta {
        status: StatusCode,
        headers: HeaderMap,
        body: Option<T>,
    },
    /// 200 with the bytes written verbatim.
    Raw(Bytes),
}

impl Reply<()> {
    /// 201 pointing at the new resource, no body.
    pub fn created(location: &str) -> DomainResult<Self> {
        let value = HeaderValue::from_str(location)
            .map_err(|e| DomainError::wrap(ErrorKind::Internal, e))?;
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, value);
        Ok(Reply::Meta {
            status: StatusCode::CREATED,
            headers,
            body: None,
        })
    }

    pub fn no_content() -> Self {
        Reply::Meta {
            status: StatusCode::NO_CONTENT,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// 200 without a body.
    pub fn empty() -> Self {
        Reply::Meta {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl<T> Reply<T> {
    pub fn with_status(status: StatusCode, body: T) -> Self {
        Reply::Meta {
            status,
            headers: HeaderMap::new(),
            body: Some(body),
        }
    }
}

impl<T: Serialize> Reply<T> {
    pub fn encode(self) -> DomainResult<Response> {
        let (status, headers, body) = match self {
            Reply::Json(body) => (StatusCode::OK, HeaderMap::new(), Some(to_json(&body)?)),
            Reply::Meta {
                status,
                headers,
                body,
            } => (status, headers, body.as_ref().map(to_json).transpose()?),
            Reply::Raw(bytes) => (StatusCode::OK, HeaderMap::new(), Some(bytes)),
        };

        let mut response = Response::new(body.map(Body::from).unwrap_or_else(Body::empty));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        response.headers_mut().extend(headers);
        Ok(response)
    }
}

fn to_json<T: Serialize>(body: &T) -> DomainResult<Bytes> {
    serde_json::to_vec(body)
        .map(Bytes::from)
        .map_err(|e| DomainError::wrap(ErrorKind::Internal, e))
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        match self.encode() {
            Ok(response) => response,
            Err(err) => ApiError(err).into_response(),
        }
    }
}

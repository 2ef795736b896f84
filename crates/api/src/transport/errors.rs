//! Error mapping: one total table from [`ErrorKind`] to HTTP status.

use axum::{
    http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use thingmesh_core::{DomainError, ErrorKind};

use crate::transport::JSON_CONTENT_TYPE;

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::UnsupportedContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        ErrorKind::MalformedEntity | ErrorKind::InvalidQueryParams => StatusCode::BAD_REQUEST,
        ErrorKind::AuthenticationFailed => StatusCode::UNAUTHORIZED,
        ErrorKind::AuthorizationFailed
        | ErrorKind::ExternalKeyRejected
        | ErrorKind::ExternalKeySecureRejected => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::CreateEntity
        | ErrorKind::UpdateEntity
        | ErrorKind::ViewEntity
        | ErrorKind::RemoveEntity
        | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error envelope: `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A [`DomainError`] on its way out as an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError(pub DomainError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        status_for(self.0.kind())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl From<ErrorKind> for ApiError {
    fn from(kind: ErrorKind) -> Self {
        Self(DomainError::new(kind))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let err = self.0;
        if status.is_server_error() {
            tracing::error!(kind = %err.kind(), cause = err.cause(), "{err}");
        } else {
            tracing::debug!(kind = %err.kind(), cause = err.cause(), "{err}");
        }

        if err.message().is_empty() {
            let content_type = [(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))];
            return (status, content_type).into_response();
        }
        render(
            status,
            &ErrorBody {
                error: err.message().to_string(),
            },
        )
    }
}

/// Serialize an error body; if that fails the client gets a bare 500.
pub(crate) fn render<B: Serialize>(status: StatusCode, body: &B) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (
            status,
            [(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode error body");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

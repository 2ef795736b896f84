//! Classified error model shared by transport and domain layers.

use core::fmt;

use thiserror::Error;

/// Result type used across service boundaries.
pub type DomainResult<T> = Result<T, DomainError>;

/// Classification tag of a [`DomainError`].
///
/// The transport layer never inspects anything but this tag when choosing a
/// status code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Request body carried a media type other than JSON.
    UnsupportedContentType,
    /// Request could not be parsed or violates a field constraint.
    MalformedEntity,
    /// Query string is unreadable or carries out-of-range values.
    InvalidQueryParams,
    /// Credentials are missing or were rejected.
    AuthenticationFailed,
    /// Caller is known but not allowed to perform the operation.
    AuthorizationFailed,
    /// Requested entity does not exist.
    NotFound,
    /// Entity already exists or is in a conflicting state.
    Conflict,
    /// External key does not match the stored bootstrap config.
    ExternalKeyRejected,
    /// Encrypted external key could not be opened.
    ExternalKeySecureRejected,
    /// A dependency the service talks to is not reachable.
    UpstreamUnavailable,
    CreateEntity,
    UpdateEntity,
    ViewEntity,
    RemoveEntity,
    /// Anything not classified above.
    Internal,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [ErrorKind; 15] = [
        ErrorKind::UnsupportedContentType,
        ErrorKind::MalformedEntity,
        ErrorKind::InvalidQueryParams,
        ErrorKind::AuthenticationFailed,
        ErrorKind::AuthorizationFailed,
        ErrorKind::NotFound,
        ErrorKind::Conflict,
        ErrorKind::ExternalKeyRejected,
        ErrorKind::ExternalKeySecureRejected,
        ErrorKind::UpstreamUnavailable,
        ErrorKind::CreateEntity,
        ErrorKind::UpdateEntity,
        ErrorKind::ViewEntity,
        ErrorKind::RemoveEntity,
        ErrorKind::Internal,
    ];

    /// Default human-readable message for the kind.
    pub const fn message(self) -> &'static str {
        match self {
            ErrorKind::UnsupportedContentType => "unsupported content type",
            ErrorKind::MalformedEntity => "malformed entity specification",
            ErrorKind::InvalidQueryParams => "invalid query parameters",
            ErrorKind::AuthenticationFailed => "failed to perform authentication over the entity",
            ErrorKind::AuthorizationFailed => "failed to perform authorization over the entity",
            ErrorKind::NotFound => "entity not found",
            ErrorKind::Conflict => "entity already exists",
            ErrorKind::ExternalKeyRejected => {
                "failed to get bootstrap configuration for given external key"
            }
            ErrorKind::ExternalKeySecureRejected => {
                "failed to get bootstrap configuration for given encrypted external key"
            }
            ErrorKind::UpstreamUnavailable => "failed to receive response from upstream service",
            ErrorKind::CreateEntity => "failed to create entity",
            ErrorKind::UpdateEntity => "failed to update entity",
            ErrorKind::ViewEntity => "failed to view entity",
            ErrorKind::RemoveEntity => "failed to remove entity",
            ErrorKind::Internal => "internal server error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A classified error: immutable kind tag, client-facing message and an
/// optional cause kept for logs only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DomainError {
    kind: ErrorKind,
    message: String,
    cause: Option<String>,
}

impl DomainError {
    /// Error of `kind` carrying the kind's default message.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
            cause: None,
        }
    }

    /// Error of `kind` with a custom client-facing message.
    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    /// Classify a lower-level failure as `kind`.
    ///
    /// The cause is retained for diagnostics but never becomes the message.
    pub fn wrap(kind: ErrorKind, cause: impl fmt::Display) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
            cause: Some(cause.to_string()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }

    pub fn malformed() -> Self {
        Self::new(ErrorKind::MalformedEntity)
    }

    pub fn invalid_query() -> Self {
        Self::new(ErrorKind::InvalidQueryParams)
    }

    pub fn authentication() -> Self {
        Self::new(ErrorKind::AuthenticationFailed)
    }

    pub fn authorization() -> Self {
        Self::new(ErrorKind::AuthorizationFailed)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    pub fn conflict() -> Self {
        Self::new(ErrorKind::Conflict)
    }

    pub fn internal(cause: impl fmt::Display) -> Self {
        Self::wrap(ErrorKind::Internal, cause)
    }
}

impl From<ErrorKind> for DomainError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

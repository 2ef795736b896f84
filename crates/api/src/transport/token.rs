use axum::http::{HeaderMap, header::AUTHORIZATION};

use thingmesh_core::{DomainError, DomainResult, ErrorKind};

pub const BEARER_PREFIX: &str = "Bearer ";

/// Pull the bearer credential out of the `Authorization` header.
pub fn extract_bearer(headers: &HeaderMap) -> DomainResult<String> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(DomainError::authentication)?;

    let header = header
        .to_str()
        .map_err(|e| DomainError::wrap(ErrorKind::AuthenticationFailed, e))?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(DomainError::authentication)?
        .trim();
    if token.is_empty() {
        return Err(DomainError::authentication());
    }

    Ok(token.to_string())
}

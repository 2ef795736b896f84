//! Per-endpoint decoding steps.
//!
//! Decoding only answers "is this syntactically usable": it checks the media
//! type, reads the credential, path parameters, query and body. Whether the
//! values are acceptable is left to [`crate::transport::validate`].

use axum::http::{HeaderMap, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;

use thingmesh_core::{DomainError, DomainResult, ErrorKind, Filter};

use crate::config::TransportConfig;
use crate::transport::{
    JSON_CONTENT_TYPE,
    inbound::Inbound,
    query::{self, FilterKeys, PageQuery, Pagination, QueryParams},
    token,
};

/// Returns `true` when the request declares a JSON body.
///
/// Only the media-type essence is compared (case-insensitively); parameters
/// such as `charset` are ignored.
pub fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(JSON_CONTENT_TYPE))
}

/// Ordered decode steps over one inbound request; each step exits early.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'a> {
    inbound: &'a Inbound,
    config: &'a TransportConfig,
}

impl<'a> Decoder<'a> {
    pub fn new(inbound: &'a Inbound, config: &'a TransportConfig) -> Self {
        Self { inbound, config }
    }

    /// Content-type gate for endpoints that carry a body.
    pub fn json(self) -> DomainResult<Self> {
        if is_json(self.inbound.headers()) {
            Ok(self)
        } else {
            Err(DomainError::new(ErrorKind::UnsupportedContentType))
        }
    }

    pub fn token(&self) -> DomainResult<String> {
        token::extract_bearer(self.inbound.headers())
    }

    /// Named path parameter; absent parameters decode as empty.
    pub fn path(&self, name: &str) -> String {
        self.inbound.path_param(name).unwrap_or_default().to_string()
    }

    pub fn body<T: DeserializeOwned>(&self) -> DomainResult<T> {
        serde_json::from_slice(self.inbound.body())
            .map_err(|e| DomainError::wrap(ErrorKind::MalformedEntity, e))
    }

    pub fn query(&self) -> QueryParams {
        QueryParams::parse(self.inbound.raw_query())
    }

    pub fn pagination(&self) -> DomainResult<Pagination> {
        query::parse_pagination(&self.query(), &self.config.pagination)
    }

    pub fn page(&self) -> DomainResult<PageQuery> {
        PageQuery::parse(&self.query(), &self.config.pagination)
    }

    pub fn filter(&self, keys: &FilterKeys) -> Filter {
        query::parse_filter(&self.query(), keys)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::header::AUTHORIZATION;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Body {
        name: String,
    }

    fn decode<T>(
        inbound: &Inbound,
        f: impl FnOnce(Decoder<'_>) -> DomainResult<T>,
    ) -> DomainResult<T> {
        let config = TransportConfig::default();
        f(Decoder::new(inbound, &config))
    }

    #[test]
    fn json_media_type_policy() {
        for accepted in [
            "application/json",
            "application/json; charset=utf-8",
            "Application/JSON",
            " application/json ;charset=utf-8",
        ] {
            let inbound = Inbound::new().with_header(CONTENT_TYPE, accepted);
            assert!(is_json(inbound.headers()), "{accepted} should be accepted");
        }
        for rejected in ["text/plain", "application/jsonp", "text/plain; application/json", ""] {
            let inbound = Inbound::new().with_header(CONTENT_TYPE, rejected);
            assert!(!is_json(inbound.headers()), "{rejected} should be rejected");
        }
        assert!(!is_json(Inbound::new().headers()));
    }

    #[test]
    fn content_type_is_checked_before_token() {
        let inbound = Inbound::new().with_header(CONTENT_TYPE, "text/plain");
        let err = decode(&inbound, |d| d.json()?.token()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedContentType);
        assert_eq!(err.message(), "unsupported content type");
    }

    #[test]
    fn body_syntax_errors_are_malformed() {
        let inbound = Inbound::new()
            .with_header(CONTENT_TYPE, "application/json")
            .with_header(AUTHORIZATION, "Bearer t")
            .with_body(&b"{\"name\":"[..]);
        let err = decode(&inbound, |d| d.json()?.body::<Body>()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEntity);
        assert!(err.cause().is_some());
    }

    #[test]
    fn decodes_token_path_and_body() {
        let inbound = Inbound::new()
            .with_header(CONTENT_TYPE, "application/json")
            .with_header(AUTHORIZATION, "Bearer t")
            .with_path_param("id", "42")
            .with_body(&b"{\"name\":\"gw\"}"[..]);
        let (token, id, body) = decode(&inbound, |d| {
            let d = d.json()?;
            Ok((d.token()?, d.path("id"), d.body::<Body>()?))
        })
        .unwrap();
        assert_eq!(token, "t");
        assert_eq!(id, "42");
        assert_eq!(body, Body { name: "gw".into() });
    }

    #[test]
    fn missing_path_param_decodes_empty() {
        let inbound = Inbound::new();
        assert_eq!(decode(&inbound, |d| Ok(d.path("id"))).unwrap(), "");
    }
}

//! Request validation.
//!
//! Rules are checked in a fixed order and the first violation is returned.
//! Every authenticated request checks its token first, so a missing credential
//! is reported as such even when the rest of the request is also invalid.

use std::ops::Deref;

use thingmesh_core::{DomainError, DomainResult, id::is_canonical_uuid};

/// Longest accepted entity name, in characters.
pub const MAX_NAME_SIZE: usize = 1024;

pub trait Validate {
    fn validate(&self) -> DomainResult<()>;
}

/// A request that passed [`Validate::validate`].
///
/// Invokers only accept this wrapper, so an unchecked request cannot reach a
/// domain service.
#[derive(Debug, Clone)]
pub struct Validated<R>(R);

impl<R: Validate> Validated<R> {
    pub fn new(request: R) -> DomainResult<Self> {
        request.validate()?;
        Ok(Self(request))
    }
}

impl<R> Validated<R> {
    pub fn into_inner(self) -> R {
        self.0
    }
}

impl<R> Deref for Validated<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.0
    }
}

pub fn require_token(token: &str) -> DomainResult<()> {
    if token.is_empty() {
        return Err(DomainError::authentication());
    }
    Ok(())
}

pub fn ensure(condition: bool) -> DomainResult<()> {
    if condition { Ok(()) } else { Err(DomainError::malformed()) }
}

/// Path or body identifier that must be present.
pub fn require_id(id: &str) -> DomainResult<()> {
    ensure(!id.is_empty())
}

/// Client-supplied id: absent (or empty) is fine, otherwise canonical UUID text.
pub fn optional_uuid(id: Option<&str>) -> DomainResult<()> {
    match id {
        None | Some("") => Ok(()),
        Some(id) => ensure(is_canonical_uuid(id)),
    }
}

pub fn max_len(value: &str, max: usize) -> DomainResult<()> {
    ensure(value.chars().count() <= max)
}

pub fn name_len(name: &str) -> DomainResult<()> {
    max_len(name, MAX_NAME_SIZE)
}

pub fn one_of(value: &str, allowed: &[&str]) -> DomainResult<()> {
    ensure(allowed.contains(&value))
}

//! Request/response shapes.
//!
//! Request structs hold everything a decoder extracted (token, path ids, body)
//! and implement [`Validate`]; response structs are the JSON views handlers
//! reply with.

use serde::Serialize;

use thingmesh_core::{DomainResult, Page};

use crate::transport::{
    PageQuery, Validate,
    validate::{require_id, require_token},
};

pub mod bootstrap;
pub mod keys;
pub mod provision;
pub mod things;

/// One entity addressed by its path id.
#[derive(Debug, Clone)]
pub struct EntityRequest {
    pub token: String,
    pub id: String,
}

impl Validate for EntityRequest {
    fn validate(&self) -> DomainResult<()> {
        require_token(&self.token)?;
        require_id(&self.id)
    }
}

/// Paged listing, optionally scoped to a parent entity (`id`).
#[derive(Debug, Clone)]
pub struct ListRequest {
    pub token: String,
    pub id: Option<String>,
    pub page: PageQuery,
}

impl ListRequest {
    /// The parent id, empty for unscoped listings.
    pub fn parent(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}

impl Validate for ListRequest {
    fn validate(&self) -> DomainResult<()> {
        require_token(&self.token)?;
        if let Some(id) = &self.id {
            require_id(id)?;
        }
        self.page.validate()
    }
}

/// Request carrying nothing but the caller's credential.
#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub token: String,
}

impl Validate for TokenRequest {
    fn validate(&self) -> DomainResult<()> {
        require_token(&self.token)
    }
}

/// Paging counters, flattened into each resource's list view.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

impl PageView {
    pub fn of<T>(page: &Page<T>) -> Self {
        Self {
            total: page.total,
            offset: page.offset,
            limit: page.limit,
        }
    }
}

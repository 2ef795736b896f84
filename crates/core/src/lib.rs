//! `thingmesh-core`: shared building blocks for every service boundary.
//!
//! This crate contains **pure** primitives (no transport or storage concerns):
//! the classified error taxonomy, identifier rules, list filters and paging.

pub mod error;
pub mod filter;
pub mod id;
pub mod page;

pub use error::{DomainError, DomainResult, ErrorKind};
pub use filter::Filter;
pub use id::EntityId;
pub use page::{Direction, Order, Page, PageMetadata};

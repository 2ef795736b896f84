//! Request transport pipeline shared by every service router.
//!
//! Each endpoint runs the same ordered steps:
//! - `decode`: content-type gate, bearer token, path parameters, JSON body
//! - `validate`: first violated rule wins, authentication first
//! - invoke: a call into the domain service with de-sugared arguments
//! - `reply`: success encoding, or `errors` for the status mapping

pub mod decode;
pub mod errors;
pub mod inbound;
pub mod pipeline;
pub mod query;
pub mod reply;
pub mod token;
pub mod validate;

pub use decode::Decoder;
pub use errors::{ApiError, ErrorBody, status_for};
pub use inbound::Inbound;
pub use pipeline::Pipeline;
pub use query::{FilterKeys, PageQuery, Pagination, QueryParams};
pub use reply::Reply;
pub use validate::{Validate, Validated};

/// Media type of every request body and response this API handles.
pub const JSON_CONTENT_TYPE: &str = "application/json";

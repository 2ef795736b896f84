//! Environment-driven configuration.

use std::net::SocketAddr;

use thiserror::Error;

use thingmesh_core::page::{DEFAULT_LIMIT, MAX_LIMIT};

pub const ENV_HTTP_ADDR: &str = "THINGMESH_HTTP_ADDR";
pub const ENV_DEFAULT_LIMIT: &str = "THINGMESH_DEFAULT_LIMIT";
pub const ENV_MAX_LIMIT: &str = "THINGMESH_MAX_LIMIT";

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid socket address '{value}'")]
    InvalidAddr { var: &'static str, value: String },

    #[error("{var}: expected a non-negative integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error(
        "invalid pagination bounds: default limit {default_limit} must be within 1..={max_limit}"
    )]
    InvalidPagination { default_limit: u64, max_limit: u64 },
}

/// Bounds applied to every list endpoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Used when `limit` is absent or zero.
    pub default_limit: u64,
    /// Requests above this are rejected, not clamped.
    pub max_limit: u64,
}

impl PaginationConfig {
    pub fn new(default_limit: u64, max_limit: u64) -> Result<Self, ConfigError> {
        if default_limit == 0 || default_limit > max_limit {
            return Err(ConfigError::InvalidPagination {
                default_limit,
                max_limit,
            });
        }
        Ok(Self {
            default_limit,
            max_limit,
        })
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

/// Settings the transport pipeline consults per request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportConfig {
    pub pagination: PaginationConfig,
}

/// Process configuration for the API binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub transport: TransportConfig,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = lookup(ENV_HTTP_ADDR).unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let bind_addr = addr.parse().map_err(|_| ConfigError::InvalidAddr {
            var: ENV_HTTP_ADDR,
            value: addr.clone(),
        })?;

        let default_limit = read_u64(&lookup, ENV_DEFAULT_LIMIT, DEFAULT_LIMIT)?;
        let max_limit = read_u64(&lookup, ENV_MAX_LIMIT, MAX_LIMIT)?;

        Ok(Self {
            bind_addr,
            transport: TransportConfig {
                pagination: PaginationConfig::new(default_limit, max_limit)?,
            },
        })
    }
}

fn read_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}

//! Query-string parsing: allow-listed filters and bounded pagination.

use thingmesh_core::{DomainError, DomainResult, ErrorKind, Filter, PageMetadata};
use thingmesh_core::page::{Direction, Order};

use crate::config::PaginationConfig;
use crate::transport::validate::{Validate, ensure, name_len, one_of};

pub const OFFSET_KEY: &str = "offset";
pub const LIMIT_KEY: &str = "limit";
pub const NAME_KEY: &str = "name";
pub const ORDER_KEY: &str = "order";
pub const DIR_KEY: &str = "dir";

/// Decoded query pairs in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn parse(raw: &str) -> Self {
        Self(url::form_urlencoded::parse(raw.as_bytes()).into_owned().collect())
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First non-empty value for `key`.
    pub fn read_string(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty()).map(str::to_string)
    }

    pub fn read_u64(&self, key: &str, default: u64) -> DomainResult<u64> {
        match self.get(key) {
            None => Ok(default),
            Some(v) => v
                .parse()
                .map_err(|e| DomainError::wrap(ErrorKind::InvalidQueryParams, e)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Allow-lists of query keys recognised as filters.
#[derive(Debug, Clone, Copy)]
pub struct FilterKeys {
    /// Keys matched exactly.
    pub full_match: &'static [&'static str],
    /// Keys matched as case-insensitive substrings.
    pub partial_match: &'static [&'static str],
}

/// Build a [`Filter`] from the recognised keys of `query`.
///
/// Unknown keys are ignored. A key is looked up in `full_match` first, so it
/// lands in one category at most. The first occurrence of a key wins.
pub fn parse_filter(query: &QueryParams, keys: &FilterKeys) -> Filter {
    let mut filter = Filter::default();
    for (k, v) in query.iter() {
        if keys.full_match.contains(&k) {
            filter
                .full_match
                .entry(k.to_string())
                .or_insert_with(|| v.to_string());
        } else if keys.partial_match.contains(&k) {
            filter
                .partial_match
                .entry(k.to_string())
                .or_insert_with(|| v.to_lowercase());
        }
    }
    filter
}

/// Offset/limit pair after defaults and bounds were applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

pub fn parse_pagination(
    query: &QueryParams,
    config: &PaginationConfig,
) -> DomainResult<Pagination> {
    let offset = query.read_u64(OFFSET_KEY, 0)?;
    let limit = match query.read_u64(LIMIT_KEY, 0)? {
        0 => config.default_limit,
        limit => limit,
    };
    if limit > config.max_limit {
        return Err(DomainError::invalid_query());
    }
    Ok(Pagination { offset, limit })
}

/// Raw list query. Sort fields stay strings until validation accepts them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub offset: u64,
    pub limit: u64,
    pub name: Option<String>,
    pub order: Option<String>,
    pub dir: Option<String>,
}

impl PageQuery {
    pub fn parse(query: &QueryParams, config: &PaginationConfig) -> DomainResult<Self> {
        let Pagination { offset, limit } = parse_pagination(query, config)?;
        Ok(Self {
            offset,
            limit,
            name: query.read_string(NAME_KEY),
            order: query.read_string(ORDER_KEY),
            dir: query.read_string(DIR_KEY),
        })
    }

    /// Typed paging metadata for the service call.
    pub fn to_metadata(&self) -> DomainResult<PageMetadata> {
        Ok(PageMetadata {
            offset: self.offset,
            limit: self.limit,
            name: self.name.clone(),
            order: self.order.as_deref().map(str::parse::<Order>).transpose()?,
            dir: self.dir.as_deref().map(str::parse::<Direction>).transpose()?,
        })
    }
}

impl Validate for PageQuery {
    fn validate(&self) -> DomainResult<()> {
        ensure(self.limit > 0)?;
        if let Some(name) = &self.name {
            name_len(name)?;
        }
        if let Some(order) = &self.order {
            one_of(order, &Order::VALUES)?;
        }
        if let Some(dir) = &self.dir {
            one_of(dir, &Direction::VALUES)?;
        }
        Ok(())
    }
}

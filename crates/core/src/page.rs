//! Paging metadata for list operations.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Limit applied when a list request does not name one.
pub const DEFAULT_LIMIT: u64 = 10;

/// Largest limit a list request may ask for.
pub const MAX_LIMIT: u64 = 100;

/// Field a listing is sorted by.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Name,
    Id,
}

impl Order {
    pub const VALUES: [&'static str; 2] = ["name", "id"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Order::Name => "name",
            Order::Id => "id",
        }
    }
}

impl FromStr for Order {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Order::Name),
            "id" => Ok(Order::Id),
            _ => Err(DomainError::malformed()),
        }
    }
}

/// Sort direction of a listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub const VALUES: [&'static str; 2] = ["asc", "desc"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            _ => Err(DomainError::malformed()),
        }
    }
}

/// Validated paging parameters handed to a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub offset: u64,
    pub limit: u64,
    /// Case-insensitive name fragment.
    pub name: Option<String>,
    pub order: Option<Order>,
    pub dir: Option<Direction>,
}

impl Default for PageMetadata {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
            name: None,
            order: None,
            dir: None,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn empty(offset: u64, limit: u64) -> Self {
        Self {
            total: 0,
            offset,
            limit,
            items: Vec::new(),
        }
    }

    /// Slice `all` into the page described by `offset`/`limit`.
    pub fn from_all(all: Vec<T>, offset: u64, limit: u64) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();
        Self {
            total,
            offset,
            limit,
            items,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total: self.total,
            offset: self.offset,
            limit: self.limit,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_and_direction_parse_known_values_only() {
        assert_eq!("name".parse::<Order>().unwrap(), Order::Name);
        assert_eq!("id".parse::<Order>().unwrap(), Order::Id);
        assert!("Name".parse::<Order>().is_err());
        assert_eq!("desc".parse::<Direction>().unwrap(), Direction::Desc);
        assert!("down".parse::<Direction>().is_err());
    }

    #[test]
    fn from_all_slices_and_counts() {
        let page = Page::from_all((0..25).collect::<Vec<_>>(), 20, 10);
        assert_eq!(page.total, 25);
        assert_eq!(page.items, vec![20, 21, 22, 23, 24]);

        let past_end = Page::from_all(vec![1, 2, 3], 10, 10);
        assert_eq!(past_end.total, 3);
        assert!(past_end.items.is_empty());
    }

    proptest::proptest! {
        #[test]
        fn from_all_never_exceeds_limit(
            len in 0usize..200,
            offset in 0u64..250,
            limit in 0u64..120,
        ) {
            let page = Page::from_all((0..len).collect::<Vec<_>>(), offset, limit);
            proptest::prop_assert_eq!(page.total, len as u64);
            proptest::prop_assert!(page.items.len() as u64 <= limit);
            proptest::prop_assert!(page.items.iter().all(|&i| i as u64 >= offset));
        }
    }
}

//! Exact and partial match filters for list operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Filter built from allow-listed query keys.
///
/// `partial_match` values are stored lower-cased; matching against them is a
/// case-insensitive substring test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub full_match: BTreeMap<String, String>,
    pub partial_match: BTreeMap<String, String>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self.full_match.is_empty() && self.partial_match.is_empty()
    }

    /// Test a record whose fields are exposed through `field`.
    ///
    /// A filtered field the record does not expose fails the match.
    pub fn matches(&self, field: impl Fn(&str) -> Option<String>) -> bool {
        let full = self
            .full_match
            .iter()
            .all(|(k, v)| field(k).is_some_and(|actual| actual == *v));
        let partial = self
            .partial_match
            .iter()
            .all(|(k, v)| {
                field(k).is_some_and(|actual| actual.to_lowercase().contains(v.as_str()))
            });
        full && partial
    }

    /// Render the filter back into `application/x-www-form-urlencoded` form.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in self.full_match.iter().chain(self.partial_match.iter()) {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> Filter {
        let mut f = Filter::default();
        f.full_match.insert("state".into(), "1".into());
        f.partial_match.insert("name".into(), "gate".into());
        f
    }

    #[test]
    fn matches_requires_every_field() {
        let f = filter();
        assert!(f.matches(|k| match k {
            "state" => Some("1".to_string()),
            "name" => Some("North Gateway".to_string()),
            _ => None,
        }));
        assert!(!f.matches(|k| match k {
            "state" => Some("0".to_string()),
            "name" => Some("North Gateway".to_string()),
            _ => None,
        }));
        assert!(!f.matches(|k| match k {
            "state" => Some("1".to_string()),
            _ => None,
        }));
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::default().matches(|_| None));
    }

    #[test]
    fn query_string_encodes_reserved_characters() {
        let mut f = Filter::default();
        f.full_match.insert("external_id".into(), "a&b=c".into());
        assert_eq!(f.to_query_string(), "external_id=a%26b%3Dc");
    }
}

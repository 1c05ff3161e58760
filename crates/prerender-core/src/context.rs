//! Request identity and location types.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Unique request identifier for log correlation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(0);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let seq = REQUEST_SEQ.fetch_add(1, Ordering::Relaxed);
        Self(format!("{:x}-{:x}", nanos, seq))
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extracted route parameters (e.g., `:id` from `/products/:id`).
pub type RouteParams = HashMap<String, String>;

/// A parsed request location: pathname plus the raw query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Path portion, always starting with `/`.
    pub pathname: String,
    /// Query string including the leading `?`, or empty.
    pub search: String,
}

impl Location {
    /// Parse a url (path with optional query) into a location.
    pub fn parse(url: &str) -> Self {
        let (pathname, search) = match url.find('?') {
            Some(idx) => (&url[..idx], &url[idx..]),
            None => (url, ""),
        };
        let pathname = if pathname.is_empty() {
            "/".to_string()
        } else {
            pathname.to_string()
        };
        Self {
            pathname,
            search: search.to_string(),
        }
    }

    /// The full url: pathname plus query string.
    pub fn full(&self) -> String {
        format!("{}{}", self.pathname, self.search)
    }

    /// Decompose the query string into key/value pairs, in order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.search
            .trim_start_matches('?')
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| match part.find('=') {
                Some(idx) => (part[..idx].to_string(), part[idx + 1..].to_string()),
                None => (part.to_string(), String::new()),
            })
            .collect()
    }

    /// Path segments with empty segments removed.
    pub fn segments(&self) -> Vec<&str> {
        self.pathname.split('/').filter(|s| !s.is_empty()).collect()
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_location_parse_with_query() {
        let loc = Location::parse("/products/42?sort=price&page=2");
        assert_eq!(loc.pathname, "/products/42");
        assert_eq!(loc.search, "?sort=price&page=2");
        assert_eq!(loc.full(), "/products/42?sort=price&page=2");
        assert_eq!(
            loc.query_pairs(),
            vec![
                ("sort".to_string(), "price".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_location_parse_without_query() {
        let loc = Location::parse("/about");
        assert_eq!(loc.pathname, "/about");
        assert_eq!(loc.search, "");
        assert!(loc.query_pairs().is_empty());
    }

    #[test]
    fn test_empty_url_is_root() {
        let loc = Location::parse("");
        assert_eq!(loc.pathname, "/");
    }

    #[test]
    fn test_segments() {
        assert_eq!(Location::parse("/a/b/c").segments(), vec!["a", "b", "c"]);
        assert!(Location::parse("/").segments().is_empty());
    }
}

//! Route descriptors and the route table.

use serde::{Deserialize, Serialize};

/// A route descriptor, possibly nested.
///
/// Patterns are `/`-separated segments: literals, `:name` parameters, and a
/// trailing `*` wildcard that consumes the rest of the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Route pattern relative to its parent (e.g., "/products/:id").
    pub path: String,
    /// Optional route name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Redirect target pattern; `:name` segments are filled from params.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    /// Marks a fallback route whose match annotates the document as
    /// not-found instead of failing the request.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub not_found: bool,
    /// Child routes matched against the remaining path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Route>,
}

impl Route {
    /// Create a new route for a pattern.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            redirect_to: None,
            not_found: false,
            children: Vec::new(),
        }
    }

    /// Create a route that redirects to a target pattern.
    pub fn redirect(path: impl Into<String>, target: impl Into<String>) -> Self {
        let mut route = Self::new(path);
        route.redirect_to = Some(target.into());
        route
    }

    /// Create a catch-all fallback route tagged as not-found.
    pub fn fallback(path: impl Into<String>) -> Self {
        let mut route = Self::new(path);
        route.name = Some("notfound".to_string());
        route.not_found = true;
        route
    }

    /// Set the route name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a child route.
    pub fn with_child(mut self, child: Route) -> Self {
        self.children.push(child);
        self
    }

    /// Pattern segments with surrounding slashes stripped.
    pub(crate) fn pattern_segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }
}

/// The table of top-level routes for an application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteTable {
    /// Top-level routes, tried in order.
    pub routes: Vec<Route>,
}

impl RouteTable {
    /// Create an empty route table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level route.
    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }
}

/// Error type for route resolution.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("no route matched '{path}'")]
    NoRouteMatched { path: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let route = Route::new("/products/:id")
            .with_name("product")
            .with_child(Route::new("reviews"));

        assert_eq!(route.path, "/products/:id");
        assert_eq!(route.name.as_deref(), Some("product"));
        assert_eq!(route.children.len(), 1);
    }

    #[test]
    fn test_fallback_is_tagged() {
        let route = Route::fallback("*");
        assert!(route.not_found);
        assert_eq!(route.name.as_deref(), Some("notfound"));
    }

    #[test]
    fn test_route_table_round_trips_through_json() {
        let table = RouteTable::new()
            .with_route(Route::new("/").with_name("home"))
            .with_route(Route::redirect("/old", "/new"))
            .with_route(Route::fallback("*"));

        let json = serde_json::to_string(&table).unwrap();
        let parsed: RouteTable = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.routes.len(), 3);
        assert_eq!(parsed.routes[1].redirect_to.as_deref(), Some("/new"));
        assert!(parsed.routes[2].not_found);
    }
}

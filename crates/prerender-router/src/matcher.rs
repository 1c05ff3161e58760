//! Pure path matching against a route table.

use prerender_core::{Location, RouteParams};

use crate::route::{Route, RouteTable};

/// Result of matching a location against a route table.
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    /// A route chain matched.
    Match(RouteMatch),
    /// A redirect route matched; carries the resolved target url.
    Redirect(String),
    /// Nothing matched and no fallback exists.
    NoMatch,
}

/// A resolved match: the route chain from root to leaf plus extracted params.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Matched routes, outermost first.
    pub routes: Vec<Route>,
    /// Extracted `:name` parameters; wildcard remainders land under `splat`.
    pub params: RouteParams,
    /// The location that was matched.
    pub location: Location,
}

impl RouteMatch {
    /// The innermost matched route.
    pub fn terminal(&self) -> Option<&Route> {
        self.routes.last()
    }

    /// Whether the terminal route is a not-found fallback.
    pub fn is_not_found(&self) -> bool {
        self.terminal().map(|r| r.not_found).unwrap_or(false)
    }

    /// Get a parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }
}

/// Match a location against the table.
///
/// Routes are tried in table order; the first chain that consumes the whole
/// path wins. A terminal route with a redirect target produces a redirect
/// with `:name` segments substituted and the original query preserved.
pub fn match_location(table: &RouteTable, location: &Location) -> MatchOutcome {
    let segments = location.segments();

    match match_routes(&table.routes, &segments) {
        Some((chain, params)) => {
            if let Some(target) = chain.last().and_then(|r| r.redirect_to.as_deref()) {
                return MatchOutcome::Redirect(resolve_redirect(target, &params, location));
            }
            MatchOutcome::Match(RouteMatch {
                routes: chain,
                params,
                location: location.clone(),
            })
        }
        None => MatchOutcome::NoMatch,
    }
}

fn match_routes(routes: &[Route], segments: &[&str]) -> Option<(Vec<Route>, RouteParams)> {
    for route in routes {
        let pattern = route.pattern_segments();
        let Some((consumed, params)) = match_pattern(&pattern, segments) else {
            continue;
        };

        let rest = &segments[consumed..];
        if rest.is_empty() {
            return Some((vec![route.clone()], params));
        }

        if !route.children.is_empty() {
            if let Some((child_chain, child_params)) = match_routes(&route.children, rest) {
                let mut chain = Vec::with_capacity(child_chain.len() + 1);
                chain.push(route.clone());
                chain.extend(child_chain);

                let mut merged = params;
                merged.extend(child_params);
                return Some((chain, merged));
            }
        }
    }
    None
}

/// Match a pattern prefix against segments.
///
/// Returns the number of segments consumed and any captured params, or
/// `None` if the pattern does not fit. A `*` consumes the remainder.
fn match_pattern(pattern: &[&str], segments: &[&str]) -> Option<(usize, RouteParams)> {
    let mut params = RouteParams::new();
    let mut consumed = 0;

    for pat in pattern {
        if *pat == "*" {
            params.insert("splat".to_string(), segments[consumed..].join("/"));
            return Some((segments.len(), params));
        }
        let seg = segments.get(consumed)?;
        if let Some(name) = pat.strip_prefix(':') {
            params.insert(name.to_string(), (*seg).to_string());
        } else if pat != seg {
            return None;
        }
        consumed += 1;
    }

    Some((consumed, params))
}

/// Resolve a redirect target: substitute `:name` segments from params and
/// carry the original query unless the target specifies its own.
fn resolve_redirect(target: &str, params: &RouteParams, location: &Location) -> String {
    let (path_part, own_query) = match target.find('?') {
        Some(idx) => (&target[..idx], Some(&target[idx..])),
        None => (target, None),
    };

    let resolved: Vec<String> = path_part
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|seg| match seg.strip_prefix(':') {
            Some(name) => params.get(name).cloned().unwrap_or_else(|| seg.to_string()),
            None => seg.to_string(),
        })
        .collect();

    let pathname = format!("/{}", resolved.join("/"));
    match own_query {
        Some(query) => format!("{}{}", pathname, query),
        None => format!("{}{}", pathname, location.search),
    }
}

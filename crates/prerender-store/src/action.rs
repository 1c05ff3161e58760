//! Dispatch vocabulary for the render store.

use prerender_core::Location;
use serde_json::Value;

/// An action dispatched into a render store.
///
/// Actions are the only way state changes: the rendered tree dispatches
/// during render, effects dispatch as their data arrives, and the
/// orchestrator dispatches `Complete` once no further top-level effects
/// will be scheduled.
#[derive(Debug, Clone)]
pub enum Action {
    /// Replace the value at a dotted path.
    Set { path: String, value: Value },
    /// Deep-merge an object into the value at a dotted path.
    Merge { path: String, value: Value },
    /// Record the active locale under `intl.locale`.
    ChangeLocale(String),
    /// Push a new location onto the request's history.
    Navigate(Location),
    /// The completion signal: no further top-level effects will be
    /// scheduled for this request.
    Complete,
}

impl Action {
    /// Short action label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Set { .. } => "set",
            Self::Merge { .. } => "merge",
            Self::ChangeLocale(_) => "change_locale",
            Self::Navigate(_) => "navigate",
            Self::Complete => "complete",
        }
    }
}

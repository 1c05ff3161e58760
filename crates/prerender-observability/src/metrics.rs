//! Per-request render timing metrics.

use std::collections::HashMap;
use std::time::Instant;

use prerender_core::{RenderPhase, RequestId};
use serde::{Deserialize, Serialize};

/// Finalized metrics for one render request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderMetrics {
    /// Request ID for correlation.
    pub request_id: String,
    /// Route path rendered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    /// Locale the document was rendered for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Microseconds from request start to each phase entry.
    pub phases: HashMap<String, u64>,
    /// Number of effects accepted by the scheduler.
    pub effects_spawned: usize,
    /// Number of effects that ran to completion.
    pub effects_completed: usize,
    /// Whether the document was annotated as not-found.
    pub not_found: bool,
    /// Total request duration in microseconds.
    pub total_duration_us: u64,
}

impl RenderMetrics {
    /// Format as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Format as human-readable summary.
    pub fn to_summary(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("Request: {}", self.request_id));

        let mut phases: Vec<(&String, &u64)> = self.phases.iter().collect();
        phases.sort_by_key(|(_, us)| **us);
        for (phase, us) in phases {
            lines.push(format!(
                "  {}: {}us ({:.2}ms)",
                phase,
                us,
                *us as f64 / 1000.0
            ));
        }

        lines.push(format!(
            "  effects: {}/{} completed",
            self.effects_completed, self.effects_spawned
        ));
        lines.push(format!(
            "  total: {}us ({:.2}ms)",
            self.total_duration_us,
            self.total_duration_us as f64 / 1000.0
        ));
        lines.join("\n")
    }
}

/// Collector for render metrics.
#[derive(Debug)]
pub struct MetricsCollector {
    request_id: RequestId,
    route: Option<String>,
    locale: Option<String>,
    start: Instant,
    phases: HashMap<String, u64>,
    effects_spawned: usize,
    effects_completed: usize,
}

impl MetricsCollector {
    /// Create a new collector.
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            route: None,
            locale: None,
            start: Instant::now(),
            phases: HashMap::new(),
            effects_spawned: 0,
            effects_completed: 0,
        }
    }

    /// Set the route path.
    pub fn set_route(&mut self, route: impl Into<String>) {
        self.route = Some(route.into());
    }

    /// Set the resolved locale.
    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.locale = Some(locale.into());
    }

    /// Record entry into a phase.
    pub fn record_phase(&mut self, phase: &RenderPhase) {
        self.phases.insert(
            phase.name().to_string(),
            self.start.elapsed().as_micros() as u64,
        );
    }

    /// Record effect accounting from the drain.
    pub fn record_effects(&mut self, spawned: usize, completed: usize) {
        self.effects_spawned = spawned;
        self.effects_completed = completed;
    }

    /// Finalize into metrics.
    pub fn finalize(self, not_found: bool) -> RenderMetrics {
        RenderMetrics {
            request_id: self.request_id.to_string(),
            route: self.route,
            locale: self.locale,
            phases: self.phases,
            effects_spawned: self.effects_spawned,
            effects_completed: self.effects_completed,
            not_found,
            total_duration_us: self.start.elapsed().as_micros() as u64,
        }
    }
}

//! Per-request render lifecycle tracking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Phases a render request moves through, in order.
///
/// `Redirected` and `Failed` are terminal exits; everything else advances
/// strictly in sequence for a successful document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderPhase {
    /// Request received, nothing resolved yet.
    Init,
    /// Route resolved, request-scoped store constructed.
    Matched,
    /// First render pass done; data effects are enqueued.
    Phase1Rendered,
    /// Completion signal issued; no further top-level effects accepted.
    EffectsStopped,
    /// All effects settled.
    Drained,
    /// Final markup produced from the populated store.
    Phase2Rendered,
    /// Document string assembled.
    Assembled,
    /// Terminal: the route resolved to a redirect.
    Redirected,
    /// Terminal: the request failed.
    Failed,
}

impl RenderPhase {
    /// Stable name used for timing marks and log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Matched => "matched",
            Self::Phase1Rendered => "phase1_rendered",
            Self::EffectsStopped => "effects_stopped",
            Self::Drained => "drained",
            Self::Phase2Rendered => "phase2_rendered",
            Self::Assembled => "assembled",
            Self::Redirected => "redirected",
            Self::Failed => "failed",
        }
    }

    /// Whether this phase ends the request.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Assembled | Self::Redirected | Self::Failed)
    }
}

impl std::fmt::Display for RenderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Timing context for observability.
#[derive(Debug, Clone)]
pub struct TimingContext {
    start: Instant,
    marks: HashMap<String, Instant>,
}

impl TimingContext {
    /// Create a new timing context.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            marks: HashMap::new(),
        }
    }

    /// Record a timing mark.
    pub fn mark(&mut self, name: &str) {
        self.marks.insert(name.to_string(), Instant::now());
    }

    /// Record the moment a phase was entered.
    pub fn mark_phase(&mut self, phase: &RenderPhase) {
        self.mark(phase.name());
    }

    /// Get elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time from request start to a named mark.
    pub fn time_to(&self, name: &str) -> Option<Duration> {
        self.marks.get(name).map(|t| t.duration_since(self.start))
    }

    /// Time from request start to a phase entry.
    pub fn time_to_phase(&self, phase: &RenderPhase) -> Option<Duration> {
        self.time_to(phase.name())
    }

    /// Duration between two named marks, if both exist in order.
    pub fn between(&self, from: &str, to: &str) -> Option<Duration> {
        let from = self.marks.get(from)?;
        let to = self.marks.get(to)?;
        to.checked_duration_since(*from)
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer trait for phase transitions.
pub trait PhaseObserver: Send + Sync {
    /// Called when a request enters a phase.
    fn on_phase(&self, phase: &RenderPhase, elapsed: Duration);
}

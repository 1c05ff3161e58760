//! Observability infrastructure for the prerender pipeline.
//!
//! This crate provides:
//! - `StructuredLogger` - Structured logging with request context
//! - `MetricsCollector` / `RenderMetrics` - Per-request phase timings
//!
//! Log lines are emitted through `tracing`, so whatever subscriber the
//! host process installs decides where they go.

mod logging;
mod metrics;

pub use logging::*;
pub use metrics::*;

// Re-export the core timing types for convenience.
pub use prerender_core::{RequestId, TimingContext};

//! Core abstractions for the prerender pipeline.
//!
//! This crate provides the fundamental types shared across the workspace:
//! - `RequestId` - Unique request identifier
//! - `Location` - Parsed path + query for a render request
//! - `RenderPhase` - Per-request pipeline phase tracking
//! - `TimingContext` - Named timing marks for observability

mod context;
mod lifecycle;

pub use context::*;
pub use lifecycle::*;

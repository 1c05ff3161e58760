//! Renderer abstraction for the prerender pipeline.
//!
//! This crate defines the seam between the pipeline and the application's
//! visual tree:
//! - `AppRenderer` - The opaque tree-to-markup renderer
//! - `RenderContext` - Everything a render pass may read or trigger
//! - `RenderPass` - Which of the two passes is running
//!
//! Rendering is synchronous and re-entrant: the pipeline calls the same
//! renderer twice against an evolving store.

mod context;
mod renderer;

pub use context::*;
pub use renderer::*;

//! HTML document assembly for the prerender pipeline.
//!
//! This crate produces the final response document:
//! - `HeadCollector` / `DocumentHead` - Head metadata accumulated during render
//! - `StyleRegistry` - Style rules injected by the rendered tree
//! - `AssetManifest` - Static asset references passed in by the caller
//! - `DocumentParts` - Everything the assembler needs for one document
//!
//! Assembly is deterministic string templating; the only failure mode is
//! serializing the state snapshot.

mod assets;
mod document;
mod head;
mod styles;

pub use assets::*;
pub use document::*;
pub use head::*;
pub use styles::*;

//! Locale resolution for the prerender pipeline.
//!
//! This crate provides:
//! - `MessageCatalog` - Translated messages for one locale
//! - `ResourceLoader` - Async seam to wherever resources live
//! - `NegotiationStrategy` - Pluggable locale negotiation
//! - `LocaleResolver` - Negotiation plus process-wide resource caches
//!
//! Caches are populated lazily, never evicted, and single-flight guarded:
//! concurrent first requests for the same locale load its resources once.

mod cache;
mod catalog;
mod loader;
mod negotiate;
mod resolver;

pub use cache::*;
pub use catalog::*;
pub use loader::*;
pub use negotiate::*;
pub use resolver::*;

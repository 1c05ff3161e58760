//! Route matching for the prerender pipeline.
//!
//! This crate provides:
//! - `Route` / `RouteTable` - Nested route descriptors
//! - `match_location` - Pure, synchronous path matching
//! - `MatchOutcome` - Match, redirect, or no-match result
//!
//! Matching is deterministic given a table and a location; the matcher
//! never performs IO and never retries.

mod matcher;
mod route;

pub use matcher::*;
pub use route::*;

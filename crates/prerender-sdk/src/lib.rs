//! Public SDK for the prerender pipeline.
//!
//! This crate re-exports all pipeline functionality:
//!
//! ```ignore
//! use prerender_sdk::prelude::*;
//!
//! let routes = RouteTable::new()
//!     .with_route(Route::new("/").with_name("home"))
//!     .with_route(Route::fallback("*"));
//!
//! let pipeline = RenderPipeline::new(routes, renderer);
//!
//! let locale = resolver.resolve(&LocaleHint::accept_language(header)).await?;
//! let options = RenderOptions::new(RenderRequest::new(locale))
//!     .with_assets(AssetManifest::new().with_js("/app.js"));
//!
//! match pipeline.render_to_location(url, options).await? {
//!     RenderOutcome::Document { html, not_found } => respond(html, not_found),
//!     RenderOutcome::Redirect { location } => redirect(location),
//! }
//! ```

pub use prerender_core;
pub use prerender_document;
pub use prerender_effects;
pub use prerender_engine;
pub use prerender_i18n;
pub use prerender_observability;
pub use prerender_render;
pub use prerender_router;
pub use prerender_store;

/// Prelude for convenient imports.
pub mod prelude {
    pub use prerender_core::*;
    pub use prerender_document::*;
    pub use prerender_effects::*;
    pub use prerender_engine::*;
    pub use prerender_i18n::*;
    pub use prerender_observability::*;
    pub use prerender_render::*;
    pub use prerender_router::*;
    pub use prerender_store::*;
}

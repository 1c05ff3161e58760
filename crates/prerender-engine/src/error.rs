//! Request-level error taxonomy.

use prerender_document::AssembleError;
use prerender_effects::EffectError;
use prerender_i18n::LocaleError;
use prerender_render::ViewError;
use prerender_router::RouteError;

/// Everything that can fail a render request.
///
/// All failures surface through the pipeline's single `Result` seam; no
/// partial document is ever produced, and nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("render pass failed: {0}")]
    View(#[from] ViewError),

    #[error("effect drain failed: {0}")]
    EffectDrain(#[from] EffectError),

    #[error("document assembly failed: {0}")]
    Assemble(#[from] AssembleError),

    #[error(transparent)]
    Locale(#[from] LocaleError),
}

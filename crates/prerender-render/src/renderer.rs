//! The opaque application renderer.

use crate::context::RenderContext;

/// Error type for render passes.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("render failed: {0}")]
    Failed(String),

    #[error("missing state at '{0}'")]
    MissingState(String),
}

impl ViewError {
    /// Create a generic render failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Renders the application tree to markup.
///
/// Implementations must be synchronous, re-entrant, and pure with respect
/// to everything outside the context: the same store, route match, and
/// catalog must produce the same markup. Data requirements are expressed
/// by enqueuing effects through the context during the first pass.
pub trait AppRenderer: Send + Sync {
    /// Render the tree for the current pass.
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<String, ViewError>;
}

impl<F> AppRenderer for F
where
    F: Fn(&mut RenderContext<'_>) -> Result<String, ViewError> + Send + Sync,
{
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<String, ViewError> {
        self(ctx)
    }
}

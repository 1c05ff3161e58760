//! Per-request inputs to the pipeline.

use prerender_core::RequestId;
use prerender_document::AssetManifest;
use prerender_i18n::LocaleContext;

/// The pre-resolved request context handed in by upstream middleware.
///
/// Locale negotiation happens before the pipeline runs; by the time a
/// request gets here its catalog and locale data are already loaded.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Request identifier for log correlation.
    pub request_id: RequestId,
    /// The resolved locale context.
    pub locale: LocaleContext,
}

impl RenderRequest {
    /// Create a request with a generated id.
    pub fn new(locale: LocaleContext) -> Self {
        Self {
            request_id: RequestId::generate(),
            locale,
        }
    }

    /// Use an externally assigned request id.
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }
}

/// Everything a render call needs besides the url.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// The pre-resolved request context.
    pub request: RenderRequest,
    /// Static asset references for the assembled document.
    pub assets: AssetManifest,
    /// Shared-library bundle names referenced by the document.
    pub script_bundles: Vec<String>,
}

impl RenderOptions {
    /// Create options for a request with no assets.
    pub fn new(request: RenderRequest) -> Self {
        Self {
            request,
            assets: AssetManifest::new(),
            script_bundles: Vec::new(),
        }
    }

    /// Set the asset manifest.
    pub fn with_assets(mut self, assets: AssetManifest) -> Self {
        self.assets = assets;
        self
    }

    /// Add a shared-library bundle name.
    pub fn with_script_bundle(mut self, name: impl Into<String>) -> Self {
        self.script_bundles.push(name.into());
        self
    }
}

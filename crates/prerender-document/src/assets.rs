//! Static asset references supplied by the caller.

use serde::{Deserialize, Serialize};

/// References to built asset bundles, as produced by an external build
/// pipeline and passed in per deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetManifest {
    /// Stylesheet urls, linked in the document head.
    #[serde(default)]
    pub css: Vec<String>,
    /// Script urls, referenced at the end of the body.
    #[serde(default)]
    pub js: Vec<String>,
}

impl AssetManifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stylesheet url.
    pub fn with_css(mut self, href: impl Into<String>) -> Self {
        self.css.push(href.into());
        self
    }

    /// Add a script url.
    pub fn with_js(mut self, src: impl Into<String>) -> Self {
        self.js.push(src.into());
        self
    }
}

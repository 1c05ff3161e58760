//! The single outcome of a render call.

/// Result of rendering a location.
///
/// Exactly one outcome exists per successful call; failures surface as
/// `RenderError` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// A complete document.
    Document {
        /// The assembled HTML document.
        html: String,
        /// Whether the matched route chain ended in a not-found
        /// fallback; the caller picks the status code.
        not_found: bool,
    },
    /// The route resolved to a redirect.
    Redirect {
        /// Target path with query.
        location: String,
    },
}

impl RenderOutcome {
    /// The document html, if this outcome carries one.
    pub fn html(&self) -> Option<&str> {
        match self {
            Self::Document { html, .. } => Some(html),
            Self::Redirect { .. } => None,
        }
    }

    /// Whether this outcome is a redirect.
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    /// Whether this outcome is a not-found document.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Document {
                not_found: true,
                ..
            }
        )
    }
}

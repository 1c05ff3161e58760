//! Final document assembly.

use serde_json::Value;

use crate::assets::AssetManifest;
use crate::head::DocumentHead;

/// The JavaScript global the state snapshot is assigned to.
pub const STATE_GLOBAL: &str = "__PRERENDER_STATE__";

/// Error type for document assembly.
#[derive(Debug, thiserror::Error)]
pub enum AssembleError {
    #[error("state snapshot could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Everything required to assemble one response document.
#[derive(Debug)]
pub struct DocumentParts {
    /// Application markup from the final render pass.
    pub markup: String,
    /// The state snapshot taken after effects drained.
    pub state: Value,
    /// Style rules collected during render.
    pub styles: Vec<String>,
    /// Head metadata taken from the collector.
    pub head: DocumentHead,
    /// Document language attribute.
    pub lang: String,
    /// Locale-formatting script injected verbatim, if any.
    pub locale_data_script: Option<String>,
    /// Static asset references.
    pub assets: AssetManifest,
    /// Shared-library bundle names, referenced as `/{name}.dll.js`.
    pub script_bundles: Vec<String>,
}

impl DocumentParts {
    /// Assemble the final HTML document.
    ///
    /// Always prefixed with the doctype declaration. Only snapshot
    /// serialization can fail.
    pub fn assemble(&self) -> Result<String, AssembleError> {
        let state_json = escape_for_script(&serde_json::to_string(&self.state)?);

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n");
        html.push_str(&format!("<html lang=\"{}\">\n", self.lang));
        html.push_str("<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        html.push_str(&self.head.render());

        for href in &self.assets.css {
            html.push_str(&format!(
                "<link rel=\"stylesheet\" href=\"{}\">\n",
                href
            ));
        }

        if !self.styles.is_empty() {
            html.push_str("<style>\n");
            html.push_str(&self.styles.join("\n"));
            html.push_str("\n</style>\n");
        }

        html.push_str("</head>\n<body>\n");
        html.push_str(&format!("<div id=\"app\">{}</div>\n", self.markup));
        html.push_str(&format!(
            "<script>window.{} = {};</script>\n",
            STATE_GLOBAL, state_json
        ));

        if let Some(script) = &self.locale_data_script {
            html.push_str(&format!("<script>{}</script>\n", script));
        }

        for name in &self.script_bundles {
            html.push_str(&format!("<script src=\"/{}.dll.js\"></script>\n", name));
        }

        for src in &self.assets.js {
            html.push_str(&format!("<script src=\"{}\"></script>\n", src));
        }

        html.push_str("</body>\n</html>");
        Ok(html)
    }
}

/// Escape serialized JSON for embedding inside a script element so the
/// payload can never terminate the surrounding tag.
fn escape_for_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// Extract and parse the embedded state snapshot from an assembled
/// document. Useful for callers that verify round-tripping.
pub fn extract_state(html: &str) -> Option<Value> {
    let needle = format!("window.{} = ", STATE_GLOBAL);
    let start = html.find(&needle)? + needle.len();
    let end = start + html[start..].find(";</script>")?;
    let raw = html[start..end].replace("<\\/", "</");
    serde_json::from_str(&raw).ok()
}

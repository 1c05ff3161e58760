//! Document head metadata collected during render.

/// Head content accumulated by the rendered tree.
///
/// The tree writes into the collector as it renders; the orchestrator
/// takes the result once the final render pass is done, resetting the
/// collector so a later pass starts clean.
#[derive(Debug, Default)]
pub struct HeadCollector {
    head: DocumentHead,
}

impl HeadCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page title. A later call wins.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.head.title = Some(title.into());
    }

    /// Add a meta tag.
    pub fn add_meta(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.head.meta.push((name.into(), content.into()));
    }

    /// Add a raw link tag.
    pub fn add_link(&mut self, html: impl Into<String>) {
        self.head.links.push(html.into());
    }

    /// Add a stylesheet link.
    pub fn add_stylesheet(&mut self, href: &str) {
        self.head
            .links
            .push(format!(r#"<link rel="stylesheet" href="{}">"#, href));
    }

    /// Take the collected head, leaving the collector empty.
    pub fn take(&mut self) -> DocumentHead {
        std::mem::take(&mut self.head)
    }
}

/// Finalized head content for one document.
#[derive(Debug, Clone, Default)]
pub struct DocumentHead {
    /// Page title.
    pub title: Option<String>,
    /// Meta tags as (name, content) pairs.
    pub meta: Vec<(String, String)>,
    /// Raw link tags.
    pub links: Vec<String>,
}

impl DocumentHead {
    /// Render the head content to HTML.
    pub fn render(&self) -> String {
        let mut html = String::new();

        if let Some(title) = &self.title {
            html.push_str(&format!("<title>{}</title>\n", title));
        }

        for (name, content) in &self.meta {
            html.push_str(&format!(
                r#"<meta name="{}" content="{}">"#,
                name, content
            ));
            html.push('\n');
        }

        for link in &self.links {
            html.push_str(link);
            html.push('\n');
        }

        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_and_renders() {
        let mut collector = HeadCollector::new();
        collector.set_title("About");
        collector.add_meta("description", "About the app");
        collector.add_stylesheet("/app.css");

        let head = collector.take();
        let html = head.render();
        assert!(html.contains("<title>About</title>"));
        assert!(html.contains(r#"<meta name="description" content="About the app">"#));
        assert!(html.contains(r#"<link rel="stylesheet" href="/app.css">"#));
    }

    #[test]
    fn test_take_resets_the_collector() {
        let mut collector = HeadCollector::new();
        collector.set_title("First");
        let _ = collector.take();

        let head = collector.take();
        assert!(head.title.is_none());
        assert!(head.render().is_empty());
    }

    #[test]
    fn test_later_title_wins() {
        let mut collector = HeadCollector::new();
        collector.set_title("First");
        collector.set_title("Second");
        assert_eq!(collector.take().title.as_deref(), Some("Second"));
    }
}

//! The context handed to each render pass.

use std::future::Future;

use prerender_core::Location;
use prerender_document::{HeadCollector, StyleRegistry};
use prerender_i18n::MessageCatalog;
use prerender_router::RouteMatch;
use prerender_store::{Action, RenderStore};
use serde_json::Value;

/// Which render pass is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPass {
    /// The pass that triggers data effects; its markup is discarded.
    First,
    /// The pass that produces the final markup.
    Second,
}

/// Everything a render pass may read or trigger.
///
/// The context borrows the request's store, route match, and catalog, plus
/// the head and style accumulators shared by both passes.
pub struct RenderContext<'a> {
    store: &'a RenderStore,
    route: &'a RouteMatch,
    catalog: &'a MessageCatalog,
    head: &'a mut HeadCollector,
    styles: &'a mut StyleRegistry,
    pass: RenderPass,
}

impl<'a> RenderContext<'a> {
    /// Assemble a context for one pass.
    pub fn new(
        store: &'a RenderStore,
        route: &'a RouteMatch,
        catalog: &'a MessageCatalog,
        head: &'a mut HeadCollector,
        styles: &'a mut StyleRegistry,
        pass: RenderPass,
    ) -> Self {
        Self {
            store,
            route,
            catalog,
            head,
            styles,
            pass,
        }
    }

    /// Which pass is running.
    pub fn pass(&self) -> RenderPass {
        self.pass
    }

    /// Read a clone of the state at a dotted path.
    pub fn state(&self, path: &str) -> Option<Value> {
        self.store.select(path)
    }

    /// Dispatch an action into the store.
    pub fn dispatch(&self, action: Action) {
        self.store.dispatch(action);
    }

    /// Enqueue a background data effect.
    ///
    /// Effects enqueued during the first pass run before the final pass;
    /// effects enqueued later are dropped by the scheduler.
    pub fn spawn_effect<F>(&self, name: impl Into<String>, effect: F) -> bool
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.store.spawn_effect(name, effect)
    }

    /// A clone of the store for use inside effects.
    pub fn store(&self) -> RenderStore {
        self.store.clone()
    }

    /// The matched route chain and params.
    pub fn route(&self) -> &RouteMatch {
        self.route
    }

    /// Get a route parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.route.param(name)
    }

    /// The location being rendered.
    pub fn location(&self) -> &Location {
        &self.route.location
    }

    /// Look up a message, falling back to its id.
    pub fn message<'b>(&'b self, id: &'b str) -> &'b str {
        self.catalog.get_or_id(id)
    }

    /// The message catalog for the request locale.
    pub fn catalog(&self) -> &MessageCatalog {
        self.catalog
    }

    /// The head metadata collector.
    pub fn head(&mut self) -> &mut HeadCollector {
        self.head
    }

    /// The style rule registry.
    pub fn styles(&mut self) -> &mut StyleRegistry {
        self.styles
    }
}

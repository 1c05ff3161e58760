//! The per-request render state machine.

use std::sync::Arc;

use prerender_core::{Location, PhaseObserver, RenderPhase, TimingContext};
use prerender_document::{DocumentParts, HeadCollector, StyleRegistry};
use prerender_effects::scheduler_pair;
use prerender_observability::{MetricsCollector, StructuredLogger};
use prerender_render::{AppRenderer, RenderContext, RenderPass};
use prerender_router::{match_location, MatchOutcome, RouteError, RouteMatch, RouteTable};
use prerender_store::{Action, RenderStore};

use crate::error::RenderError;
use crate::options::RenderOptions;
use crate::outcome::RenderOutcome;

/// Orchestrates the two-phase render for one application.
///
/// One pipeline serves many requests; each call to `render_to_location`
/// builds its own store, scheduler, and collectors, so requests never
/// share mutable state.
pub struct RenderPipeline {
    routes: RouteTable,
    renderer: Arc<dyn AppRenderer>,
    observers: Vec<Arc<dyn PhaseObserver>>,
}

impl RenderPipeline {
    /// Create a pipeline over a route table and an application renderer.
    pub fn new(routes: RouteTable, renderer: Arc<dyn AppRenderer>) -> Self {
        Self {
            routes,
            renderer,
            observers: Vec::new(),
        }
    }

    /// Register a phase observer.
    pub fn with_observer(mut self, observer: Arc<dyn PhaseObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Render the application at a url to a complete document.
    ///
    /// Returns exactly one of a document, a redirect, or an error. The
    /// sequence is strict: route match, store construction, the
    /// effect-triggering pass, the completion signal, the drain barrier,
    /// one state snapshot, the markup pass, then assembly.
    pub async fn render_to_location(
        &self,
        url: &str,
        options: RenderOptions,
    ) -> Result<RenderOutcome, RenderError> {
        let location = Location::parse(url);
        let mut timing = TimingContext::new();
        let mut metrics = MetricsCollector::new(options.request.request_id.clone());
        metrics.set_route(location.pathname.as_str());
        metrics.set_locale(options.request.locale.locale.as_str());

        let logger = StructuredLogger::new(options.request.request_id.clone())
            .with_route(location.pathname.as_str())
            .with_locale(options.request.locale.locale.as_str());

        self.enter_phase(RenderPhase::Init, &mut timing, &mut metrics);

        match match_location(&self.routes, &location) {
            MatchOutcome::NoMatch => {
                self.enter_phase(RenderPhase::Failed, &mut timing, &mut metrics);
                Err(RouteError::NoRouteMatched {
                    path: location.full(),
                }
                .into())
            }
            MatchOutcome::Redirect(target) => {
                self.enter_phase(RenderPhase::Redirected, &mut timing, &mut metrics);
                logger
                    .info_builder("redirecting")
                    .field("location", target.clone())
                    .emit();
                Ok(RenderOutcome::Redirect { location: target })
            }
            MatchOutcome::Match(route_match) => {
                self.render_document(
                    location,
                    route_match,
                    options,
                    &mut timing,
                    &mut metrics,
                    &logger,
                )
                .await
            }
        }
    }

    async fn render_document(
        &self,
        location: Location,
        route_match: RouteMatch,
        options: RenderOptions,
        timing: &mut TimingContext,
        metrics: &mut MetricsCollector,
        logger: &StructuredLogger,
    ) -> Result<RenderOutcome, RenderError> {
        let locale = &options.request.locale;
        let (effects, monitor) = scheduler_pair();
        let store = RenderStore::new(location, effects);

        // Seed the store the way a client boot would: the catalog first,
        // then the locale the request resolved to.
        store.dispatch(Action::Set {
            path: "intl.messages".to_string(),
            value: locale.catalog.to_value(),
        });
        store.dispatch(Action::ChangeLocale(locale.locale.clone()));
        self.enter_phase(RenderPhase::Matched, timing, metrics);

        let mut head = HeadCollector::new();
        let mut styles = StyleRegistry::new();

        // First pass: the markup is discarded; its purpose is enqueuing
        // the route's data effects into the store's scheduler.
        let first_pass = {
            let mut ctx = RenderContext::new(
                &store,
                &route_match,
                &locale.catalog,
                &mut head,
                &mut styles,
                RenderPass::First,
            );
            self.renderer.render(&mut ctx)
        };
        if let Err(err) = first_pass {
            store.seal();
            self.enter_phase(RenderPhase::Failed, timing, metrics);
            return Err(err.into());
        }
        self.enter_phase(RenderPhase::Phase1Rendered, timing, metrics);

        // The completion signal: no further top-level effects will be
        // scheduled for this request.
        store.dispatch(Action::Complete);
        self.enter_phase(RenderPhase::EffectsStopped, timing, metrics);

        let report = match monitor.await_drain().await {
            Ok(report) => report,
            Err(err) => {
                store.seal();
                self.enter_phase(RenderPhase::Failed, timing, metrics);
                logger
                    .error_builder("effect drain failed")
                    .field("error", err.to_string())
                    .emit();
                return Err(err.into());
            }
        };
        metrics.record_effects(report.spawned, report.completed);
        self.enter_phase(RenderPhase::Drained, timing, metrics);

        // Snapshot once, after the drain and before the final pass reads
        // the store.
        let snapshot = store.snapshot();

        // The final pass starts with a clean head; styles keep
        // accumulating since rules are deduplicated.
        let _ = head.take();

        let markup = {
            let mut ctx = RenderContext::new(
                &store,
                &route_match,
                &locale.catalog,
                &mut head,
                &mut styles,
                RenderPass::Second,
            );
            match self.renderer.render(&mut ctx) {
                Ok(markup) => markup,
                Err(err) => {
                    store.seal();
                    self.enter_phase(RenderPhase::Failed, timing, metrics);
                    return Err(err.into());
                }
            }
        };
        self.enter_phase(RenderPhase::Phase2Rendered, timing, metrics);

        // The request is over as far as the store is concerned; anything
        // still holding a clone can no longer write.
        store.seal();

        let parts = DocumentParts {
            markup,
            state: snapshot,
            styles: styles.rules().to_vec(),
            head: head.take(),
            lang: locale.locale.clone(),
            locale_data_script: (!locale.locale_data.is_empty())
                .then(|| locale.locale_data.as_ref().clone()),
            assets: options.assets,
            script_bundles: options.script_bundles,
        };
        let html = match parts.assemble() {
            Ok(html) => html,
            Err(err) => {
                self.enter_phase(RenderPhase::Failed, timing, metrics);
                return Err(err.into());
            }
        };
        self.enter_phase(RenderPhase::Assembled, timing, metrics);

        let not_found = route_match.is_not_found();
        logger
            .info_builder("document assembled")
            .field_bool("not_found", not_found)
            .field_u64("bytes", html.len() as u64)
            .field_u64("effects", report.spawned as u64)
            .emit();

        Ok(RenderOutcome::Document { html, not_found })
    }

    fn enter_phase(
        &self,
        phase: RenderPhase,
        timing: &mut TimingContext,
        metrics: &mut MetricsCollector,
    ) {
        timing.mark_phase(&phase);
        metrics.record_phase(&phase);
        tracing::debug!(target: "prerender", phase = %phase, "phase entered");
        for observer in &self.observers {
            observer.on_phase(&phase, timing.elapsed());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use prerender_core::RequestId;
    use prerender_document::{extract_state, AssetManifest};
    use prerender_i18n::{LocaleContext, MessageCatalog};
    use prerender_render::ViewError;
    use prerender_router::Route;
    use serde_json::json;

    use super::*;
    use crate::options::RenderRequest;

    /// Records renderer and effect activity for ordering assertions.
    #[derive(Default)]
    struct EventLog(Mutex<Vec<String>>);

    impl EventLog {
        fn push(&self, event: impl Into<String>) {
            self.0.lock().unwrap().push(event.into());
        }

        fn events(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl PhaseObserver for EventLog {
        fn on_phase(&self, phase: &RenderPhase, _elapsed: Duration) {
            self.push(format!("phase:{}", phase));
        }
    }

    /// A small application exercising every pipeline path. Views are
    /// selected by the terminal route name.
    struct DemoApp {
        events: Arc<EventLog>,
    }

    impl DemoApp {
        fn new(events: Arc<EventLog>) -> Self {
            Self { events }
        }
    }

    impl AppRenderer for DemoApp {
        fn render(&self, ctx: &mut RenderContext<'_>) -> Result<String, ViewError> {
            let pass = match ctx.pass() {
                RenderPass::First => "first",
                RenderPass::Second => "second",
            };
            self.events.push(format!("render:{}", pass));

            let view = ctx
                .route()
                .terminal()
                .and_then(|r| r.name.clone())
                .unwrap_or_default();

            match view.as_str() {
                "about" => {
                    let title = ctx.message("about.title").to_string();
                    ctx.head().set_title(title);
                    ctx.styles().inject(".about { margin: 0 auto; }");

                    if ctx.pass() == RenderPass::First {
                        let store = ctx.store();
                        let events = self.events.clone();
                        ctx.spawn_effect("load-about", async move {
                            tokio::time::sleep(Duration::from_millis(5)).await;
                            events.push("effect:load-about".to_string());
                            store.dispatch(Action::Merge {
                                path: "about".to_string(),
                                value: json!({ "tagline": "rendered ahead of time" }),
                            });
                            Ok(())
                        });
                    }

                    let tagline = ctx
                        .state("about.tagline")
                        .and_then(|v| v.as_str().map(String::from))
                        .unwrap_or_else(|| "loading".to_string());
                    Ok(format!("<section class=\"about\">{}</section>", tagline))
                }
                "greedy" => {
                    // Enqueues on every pass; the scheduler drops what the
                    // final pass tries to add.
                    let store = ctx.store();
                    let accepted = ctx.spawn_effect("greedy", async move {
                        store.dispatch(Action::Set {
                            path: "greedy.ran".to_string(),
                            value: json!(true),
                        });
                        Ok(())
                    });
                    self.events
                        .push(format!("spawn:{}:{}", pass, accepted));
                    Ok("<section>greedy</section>".to_string())
                }
                "boom" => {
                    if ctx.pass() == RenderPass::First {
                        ctx.spawn_effect("load-boom", async {
                            Err(anyhow::anyhow!("backend exploded"))
                        });
                    }
                    Ok("<section>boom</section>".to_string())
                }
                "broken-view" => Err(ViewError::failed("template blew up")),
                "notfound" => Ok("<h1>Not found</h1>".to_string()),
                _ => Ok("<main>home</main>".to_string()),
            }
        }
    }

    fn routes() -> RouteTable {
        RouteTable::new()
            .with_route(Route::new("/").with_name("home"))
            .with_route(Route::new("/about").with_name("about"))
            .with_route(Route::new("/greedy").with_name("greedy"))
            .with_route(Route::new("/boom").with_name("boom"))
            .with_route(Route::new("/broken").with_name("broken-view"))
            .with_route(Route::redirect("/old-about", "/target?query=1"))
            .with_route(Route::fallback("*"))
    }

    fn locale_context() -> LocaleContext {
        LocaleContext {
            locale: "en".to_string(),
            catalog: Arc::new(MessageCatalog::from_pairs([(
                "about.title",
                "About us",
            )])),
            locale_data: Arc::new("registerLocale('en');".to_string()),
        }
    }

    fn pipeline() -> (RenderPipeline, Arc<EventLog>) {
        let events = Arc::new(EventLog::default());
        let pipeline = RenderPipeline::new(routes(), Arc::new(DemoApp::new(events.clone())))
            .with_observer(events.clone());
        (pipeline, events)
    }

    fn options() -> RenderOptions {
        RenderOptions::new(RenderRequest::new(locale_context()))
            .with_assets(AssetManifest::new().with_css("/app.css").with_js("/app.js"))
            .with_script_bundle("vendor")
    }

    #[tokio::test]
    async fn test_matched_route_yields_document_with_effect_data() {
        let (pipeline, _events) = pipeline();
        let outcome = pipeline
            .render_to_location("/about", options())
            .await
            .unwrap();

        let RenderOutcome::Document { html, not_found } = outcome else {
            panic!("expected a document");
        };
        assert!(!not_found);
        assert!(html.starts_with("<!DOCTYPE html>\n"));
        // The final markup reflects the state the effect loaded.
        assert!(html.contains("rendered ahead of time"));
        assert!(!html.contains("loading"));
        assert!(html.contains("<title>About us</title>"));
        assert!(html.contains(".about { margin: 0 auto; }"));
        assert!(html.contains("<script src=\"/vendor.dll.js\"></script>"));
        assert!(html.contains("registerLocale('en');"));
    }

    #[tokio::test]
    async fn test_render_passes_and_effects_run_in_order() {
        let (pipeline, events) = pipeline();
        pipeline
            .render_to_location("/about", options())
            .await
            .unwrap();

        let log = events.events();
        let pos = |needle: &str| {
            log.iter()
                .position(|e| e == needle)
                .unwrap_or_else(|| panic!("missing event {needle}: {log:?}"))
        };

        // First render, then the stop signal, then the drain (which runs
        // the effect), then the final render.
        assert!(pos("render:first") < pos("phase:effects_stopped"));
        assert!(pos("phase:effects_stopped") < pos("effect:load-about"));
        assert!(pos("effect:load-about") < pos("phase:drained"));
        assert!(pos("phase:drained") < pos("render:second"));
        assert!(pos("render:second") < pos("phase:assembled"));

        // The completion signal happens exactly once.
        let stops = log.iter().filter(|e| *e == "phase:effects_stopped").count();
        assert_eq!(stops, 1);
        // Exactly two render invocations.
        let renders = log.iter().filter(|e| e.starts_with("render:")).count();
        assert_eq!(renders, 2);
    }

    #[tokio::test]
    async fn test_embedded_state_round_trips() {
        let (pipeline, _events) = pipeline();
        let outcome = pipeline
            .render_to_location("/about?ref=1", options())
            .await
            .unwrap();

        let html = outcome.html().unwrap();
        let state = extract_state(html).unwrap();

        assert_eq!(state["about"]["tagline"], json!("rendered ahead of time"));
        assert_eq!(state["intl"]["locale"], json!("en"));
        assert_eq!(state["intl"]["messages"]["about.title"], json!("About us"));
        assert_eq!(state["route"]["location"]["pathname"], json!("/about"));
        assert_eq!(state["route"]["location"]["search"], json!("?ref=1"));
    }

    #[tokio::test]
    async fn test_rendering_is_deterministic_for_identical_requests() {
        let (pipeline, _events) = pipeline();
        let first = pipeline
            .render_to_location("/about", options())
            .await
            .unwrap();
        let second = pipeline
            .render_to_location("/about", options())
            .await
            .unwrap();

        assert_eq!(first.html(), second.html());
    }

    #[tokio::test]
    async fn test_unmatched_path_with_fallback_is_not_found_document() {
        let (pipeline, _events) = pipeline();
        let outcome = pipeline
            .render_to_location("/missing", options())
            .await
            .unwrap();

        let RenderOutcome::Document { html, not_found } = outcome else {
            panic!("expected a document");
        };
        assert!(not_found);
        assert!(html.starts_with("<!DOCTYPE html>\n"));
        assert!(html.contains("<h1>Not found</h1>"));
    }

    #[tokio::test]
    async fn test_redirect_route_yields_redirect_and_no_html() {
        let (pipeline, events) = pipeline();
        let outcome = pipeline
            .render_to_location("/old-about", options())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RenderOutcome::Redirect {
                location: "/target?query=1".to_string()
            }
        );
        assert_eq!(outcome.html(), None);
        // No render pass runs for a redirect.
        assert!(!events.events().iter().any(|e| e.starts_with("render:")));
    }

    #[tokio::test]
    async fn test_failing_effect_fails_the_request() {
        let (pipeline, events) = pipeline();
        let err = pipeline
            .render_to_location("/boom", options())
            .await
            .unwrap_err();

        assert!(matches!(err, RenderError::EffectDrain(_)));
        // The request failed before the final pass could run.
        assert!(!events.events().contains(&"render:second".to_string()));
    }

    #[tokio::test]
    async fn test_view_error_fails_the_request() {
        let (pipeline, _events) = pipeline();
        let err = pipeline
            .render_to_location("/broken", options())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::View(_)));
    }

    #[tokio::test]
    async fn test_unmatched_path_without_fallback_is_a_routing_error() {
        let events = Arc::new(EventLog::default());
        let table = RouteTable::new().with_route(Route::new("/only").with_name("home"));
        let pipeline = RenderPipeline::new(table, Arc::new(DemoApp::new(events)));

        let err = pipeline
            .render_to_location("/elsewhere", options())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Route(_)));
    }

    #[tokio::test]
    async fn test_effects_from_the_final_pass_are_dropped() {
        let (pipeline, events) = pipeline();
        let outcome = pipeline
            .render_to_location("/greedy", options())
            .await
            .unwrap();

        let log = events.events();
        assert!(log.contains(&"spawn:first:true".to_string()));
        assert!(log.contains(&"spawn:second:false".to_string()));

        // The first-pass effect's write is in the snapshot; the dropped
        // second-pass effect changed nothing.
        let state = extract_state(outcome.html().unwrap()).unwrap();
        assert_eq!(state["greedy"]["ran"], json!(true));
    }

    #[tokio::test]
    async fn test_snapshot_excludes_writes_after_drain() {
        let (pipeline, _events) = pipeline();
        let outcome = pipeline
            .render_to_location("/greedy", options())
            .await
            .unwrap();

        // The second pass spawned an effect that would have dispatched
        // again; since it never ran, the embedded snapshot holds exactly
        // the post-drain state.
        let state = extract_state(outcome.html().unwrap()).unwrap();
        assert_eq!(state["greedy"], json!({ "ran": true }));
    }

    #[tokio::test]
    async fn test_request_ids_are_carried_through_options() {
        let request = RenderRequest::new(locale_context())
            .with_request_id(RequestId::from_string("req-42"));
        assert_eq!(request.request_id.to_string(), "req-42");
    }
}

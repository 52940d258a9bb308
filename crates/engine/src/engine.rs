use std::collections::BTreeMap;
use std::rc::Rc;

use foundation::time::{Millis, TimeRange};
use gpu::basemap::{BaseMap, MapEvent};
use gpu::context::ContextMonitor;
use gpu::renderer::Renderer;
use layers::compose::{Composer, CompositionInput, CompositionMode};
use layers::pulse::{PulseScope, has_pulse_candidates};
use layers::{RenderableLayer, Theme};
use runtime::budget::FrameBudget;
use runtime::clock::Clock;
use runtime::event_bus::{EventBus, SubscriptionId};
use runtime::metrics::RenderMetrics;
use runtime::scheduler::{Poll, RenderScheduler, RequestOutcome};
use scene::highlight::{AssetKind, HighlightSets};
use scene::records::{
    ConflictZone, CountryShape, CyberThreat, Earthquake, Fire, Hotspot, MilitaryFlight,
    MilitaryFlightCluster, NaturalEvent, NewsLocation, Outage, Pipeline, Protest, Site, Vessel,
};
use scene::stores::DataStores;
use scene::tier::DeviceTier;
use scene::view_state::{ApplicationViewState, LayerKey, Pan, ViewPreset};
use tracing::{debug, error, info};

use crate::animation::{PulseAnimator, PulseState, PulseTick};
use crate::config::EngineConfig;
use crate::events::EngineEvent;
use crate::pick::{CountryIndex, Dispatch, DispatchContext, PickResult, dispatch};
use crate::platform::{NoSignals, PlatformSignal, PlatformSignals};

/// Layer composition and render-update engine.
///
/// Single-threaded and poll driven: the host calls [`tick`](Self::tick) once
/// per animation frame and forwards base-map events through
/// [`handle_map_event`](Self::handle_map_event). All state is mutated through
/// the setters below; each one schedules the rebuild it needs.
pub struct MapEngine {
    config: EngineConfig,
    clock: Box<dyn Clock>,
    renderer: Box<dyn Renderer>,
    base_map: Option<Box<dyn BaseMap>>,
    signals: Box<dyn PlatformSignals>,

    tier: DeviceTier,
    theme: Theme,
    viewport: Option<(u32, u32)>,
    state: ApplicationViewState,
    stores: DataStores,
    highlights: HighlightSets,
    flash_until: Option<Millis>,
    countries: CountryIndex,

    composer: Composer,
    scheduler: RenderScheduler,
    animator: PulseAnimator,
    context: ContextMonitor,
    events: EventBus<EngineEvent>,
    metrics: RenderMetrics,
    last_layers: Vec<Rc<RenderableLayer>>,
    /// Context came back while paused; the resume replay must rebuild
    /// everything.
    full_pass_owed: bool,
    destroyed: bool,
}

impl MapEngine {
    pub fn new(config: EngineConfig, clock: Box<dyn Clock>, renderer: Box<dyn Renderer>) -> Self {
        let started_at = clock.now();
        let tier = DeviceTier::Full;
        let composer = Composer::new(
            config.visibility_policy(),
            FrameBudget::new(config.frame_budget_ms),
        );
        let scheduler = RenderScheduler::new(config.profile(tier).scheduler_config());
        let animator = PulseAnimator::new(config.pulse.clone(), started_at);
        Self {
            config,
            clock,
            renderer,
            base_map: None,
            signals: Box::new(NoSignals),
            tier,
            theme: Theme::default(),
            viewport: None,
            state: ApplicationViewState::default(),
            stores: DataStores::new(),
            highlights: HighlightSets::new(),
            flash_until: None,
            countries: CountryIndex::default(),
            composer,
            scheduler,
            animator,
            context: ContextMonitor::new(),
            events: EventBus::new(),
            metrics: RenderMetrics::new(),
            last_layers: Vec::new(),
            full_pass_owed: false,
            destroyed: false,
        }
    }

    pub fn with_base_map(mut self, base_map: Box<dyn BaseMap>) -> Self {
        self.base_map = Some(base_map);
        self
    }

    pub fn with_signals(mut self, signals: Box<dyn PlatformSignals>) -> Self {
        self.signals = signals;
        self
    }

    pub fn with_tier(mut self, tier: DeviceTier) -> Self {
        self.apply_tier(tier);
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &ApplicationViewState {
        &self.state
    }

    pub fn stores(&self) -> &DataStores {
        &self.stores
    }

    pub fn highlights(&self) -> &HighlightSets {
        &self.highlights
    }

    pub fn tier(&self) -> DeviceTier {
        self.tier
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn viewport(&self) -> Option<(u32, u32)> {
        self.viewport
    }

    pub fn metrics(&self) -> RenderMetrics {
        self.metrics
    }

    pub fn pulse_state(&self) -> PulseState {
        self.animator.state()
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn is_context_lost(&self) -> bool {
        self.context.is_lost()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Layers most recently handed to the renderer.
    pub fn layers(&self) -> &[Rc<RenderableLayer>] {
        &self.last_layers
    }

    /// Map zoom if a base map is attached, otherwise the state's zoom.
    pub fn live_zoom(&self) -> f64 {
        self.base_map
            .as_ref()
            .map_or(self.state.zoom, |m| m.zoom())
    }

    pub fn on(&mut self, handler: impl FnMut(&EngineEvent) + 'static) -> SubscriptionId {
        self.events.on(handler)
    }

    pub fn off(&mut self, id: SubscriptionId) -> bool {
        self.events.off(id)
    }

    pub fn set_conflict_zones(&mut self, items: Vec<ConflictZone>) {
        self.replace_data(|s| s.conflict_zones.replace(items));
    }

    pub fn set_pipelines(&mut self, items: Vec<Pipeline>) {
        self.replace_data(|s| s.pipelines.replace(items));
    }

    pub fn set_bases(&mut self, items: Vec<Site>) {
        self.replace_data(|s| s.bases.replace(items));
    }

    pub fn set_nuclear_facilities(&mut self, items: Vec<Site>) {
        self.replace_data(|s| s.nuclear.replace(items));
    }

    pub fn set_hotspots(&mut self, items: Vec<Hotspot>) {
        self.replace_data(|s| s.hotspots.replace(items));
    }

    pub fn set_outages(&mut self, items: Vec<Outage>) {
        self.replace_data(|s| s.outages.replace(items));
    }

    pub fn set_cyber_threats(&mut self, items: Vec<CyberThreat>) {
        self.replace_data(|s| s.cyber_threats.replace(items));
    }

    pub fn set_fires(&mut self, items: Vec<Fire>) {
        self.replace_data(|s| s.fires.replace(items));
    }

    pub fn set_natural_events(&mut self, items: Vec<NaturalEvent>) {
        self.replace_data(|s| s.natural_events.replace(items));
    }

    pub fn set_earthquakes(&mut self, items: Vec<Earthquake>) {
        self.replace_data(|s| s.earthquakes.replace(items));
    }

    pub fn set_protests(&mut self, items: Vec<Protest>) {
        self.replace_data(|s| s.protests.replace(items));
    }

    pub fn set_military_flights(
        &mut self,
        flights: Vec<MilitaryFlight>,
        clusters: Vec<MilitaryFlightCluster>,
    ) {
        self.replace_data(|s| {
            s.military_flights.replace(flights);
            s.military_flight_clusters.replace(clusters);
        });
    }

    pub fn set_vessels(&mut self, items: Vec<Vessel>) {
        self.replace_data(|s| s.vessels.replace(items));
    }

    pub fn set_news_locations(&mut self, items: Vec<NewsLocation>) {
        self.replace_data(|s| s.news_locations.replace(items));
    }

    /// Precomputed outlines for resolving bare-map clicks.
    pub fn set_country_geometry(&mut self, shapes: Vec<CountryShape>) {
        if self.destroyed {
            return;
        }
        self.countries = CountryIndex::new(shapes);
        debug!(countries = self.countries.len(), "country geometry loaded");
    }

    fn replace_data(&mut self, apply: impl FnOnce(&mut DataStores)) {
        if self.destroyed {
            return;
        }
        apply(&mut self.stores);
        let now = self.clock.now();
        self.coarse_at(now);
        self.sync_pulse(now);
    }

    pub fn set_time_range(&mut self, range: TimeRange) {
        if self.destroyed || self.state.time_range == range {
            return;
        }
        self.state.time_range = range;
        self.request_coarse();
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if self.destroyed {
            return;
        }
        self.state.zoom = zoom;
        self.request_coarse();
    }

    pub fn set_view(&mut self, view: ViewPreset) {
        if self.destroyed {
            return;
        }
        let center = view.center();
        self.state.view = view;
        self.state.zoom = view.zoom();
        self.state.pan = Pan {
            x: center.lon,
            y: center.lat,
        };
        self.request_coarse();
    }

    pub fn set_layer_enabled(&mut self, key: LayerKey, enabled: bool) {
        if self.destroyed || !self.state.set_enabled(key, enabled) {
            return;
        }
        self.events.emit(&EngineEvent::LayerToggled { key, enabled });
        let now = self.clock.now();
        self.coarse_at(now);
        self.sync_pulse(now);
    }

    pub fn set_layers(&mut self, layers: &BTreeMap<LayerKey, bool>) {
        for (&key, &enabled) in layers {
            self.set_layer_enabled(key, enabled);
        }
    }

    pub fn set_tier(&mut self, tier: DeviceTier) {
        if self.destroyed || self.tier == tier {
            return;
        }
        self.apply_tier(tier);
        let now = self.clock.now();
        self.coarse_at(now);
        self.sync_pulse(now);
    }

    fn apply_tier(&mut self, tier: DeviceTier) {
        self.tier = tier;
        self.scheduler
            .reconfigure(self.config.profile(tier).scheduler_config());
        info!(tier = tier.as_str(), "device tier applied");
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if self.destroyed || self.theme == theme {
            return;
        }
        self.theme = theme;
        self.composer.invalidate_cache();
        self.request_coarse();
    }

    /// Replace every highlight with `ids` of `kind`.
    pub fn highlight_assets<I, S>(&mut self, kind: AssetKind, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.destroyed {
            return;
        }
        self.highlights.clear();
        self.highlights.replace(kind, ids);
        self.flash_until = None;
        self.request_coarse();
    }

    /// Highlight `ids` for the configured flash duration.
    pub fn flash_assets<I, S>(&mut self, kind: AssetKind, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.destroyed {
            return;
        }
        self.highlight_assets(kind, ids);
        let now = self.clock.now();
        self.flash_until = Some(now.saturating_add_ms(self.config.flash_duration_ms));
    }

    pub fn clear_highlights(&mut self) {
        if self.destroyed {
            return;
        }
        self.flash_until = None;
        if self.highlights.is_empty() {
            return;
        }
        self.highlights.clear();
        self.request_coarse();
    }

    fn request_coarse(&mut self) {
        let now = self.clock.now();
        self.coarse_at(now);
    }

    fn coarse_at(&mut self, now: Millis) {
        let outcome = self.scheduler.request_coarse(now);
        self.note_request(outcome);
    }

    fn note_request(&mut self, outcome: RequestOutcome) {
        if outcome == RequestOutcome::Deferred {
            self.metrics.suppressed_while_paused += 1;
        }
    }

    /// Continuous trigger: at most one rebuild per frame.
    pub fn request_frame(&mut self) {
        if !self.destroyed {
            let outcome = self.scheduler.request_frame();
            self.note_request(outcome);
        }
    }

    pub fn is_render_paused(&self) -> bool {
        self.scheduler.is_paused()
    }

    /// While paused nothing is composed; requests collapse into a single
    /// pending flag replayed once on resume.
    pub fn set_render_paused(&mut self, paused: bool) {
        if self.destroyed {
            return;
        }
        let now = self.clock.now();
        let replay = self.scheduler.set_paused(paused, now);
        if replay && !self.context.is_lost() {
            let mode = if self.full_pass_owed {
                CompositionMode::Full
            } else {
                CompositionMode::Incremental
            };
            self.compose(mode);
        }
    }

    /// Compose immediately, subject to pause and context-loss gating.
    /// Returns `true` if a pass ran.
    pub fn render_now(&mut self) -> bool {
        if self.destroyed || self.context.is_lost() {
            return false;
        }
        if self.scheduler.is_paused() {
            self.scheduler.mark_pending();
            self.metrics.suppressed_while_paused += 1;
            return false;
        }
        let now = self.clock.now();
        self.scheduler.note_executed(now);
        self.compose(CompositionMode::Incremental);
        true
    }

    /// One animation frame. Returns `true` if a composition ran.
    pub fn tick(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        let now = self.clock.now();
        self.drain_signals();

        if self.flash_until.is_some_and(|t| now >= t) {
            self.clear_highlights();
        }

        if !self.context.is_lost() {
            if !self.animator.is_pulsing() {
                self.sync_pulse(now);
            }
            let scope = PulseScope {
                state: &self.state,
                stores: &self.stores,
                policy: self.composer.policy(),
                zoom: self.live_zoom(),
                tier: self.tier,
                caps: &self.config.profile(self.tier).item_caps,
                now,
                recency_ms: self.config.pulse.recency_window_ms,
            };
            let tick = self.animator.poll(now, || has_pulse_candidates(&scope));
            if tick == PulseTick::Tick {
                self.metrics.pulse_ticks += 1;
                self.request_frame();
            }
        }

        match self.scheduler.poll(now) {
            Poll::Rebuild(cause) => {
                debug!(?cause, "rebuild");
                self.compose(CompositionMode::Incremental);
                true
            }
            Poll::Skipped => {
                self.metrics.skipped_frames += 1;
                false
            }
            Poll::Idle => false,
        }
    }

    fn drain_signals(&mut self) {
        for signal in self.signals.drain() {
            match signal {
                PlatformSignal::ThemeChanged(theme) => self.set_theme(theme),
                PlatformSignal::Resized { width, height } => {
                    self.viewport = Some((width, height));
                    self.request_coarse();
                }
            }
        }
    }

    fn sync_pulse(&mut self, now: Millis) {
        if self.context.is_lost() {
            return;
        }
        let scope = PulseScope {
            state: &self.state,
            stores: &self.stores,
            policy: self.composer.policy(),
            zoom: self.live_zoom(),
            tier: self.tier,
            caps: &self.config.profile(self.tier).item_caps,
            now,
            recency_ms: self.config.pulse.recency_window_ms,
        };
        self.animator.sync(now, || has_pulse_candidates(&scope));
    }

    pub fn handle_map_event(&mut self, event: MapEvent) {
        if self.destroyed {
            return;
        }
        match event {
            MapEvent::MoveStart => {}
            MapEvent::Move | MapEvent::Zoom => self.request_frame(),
            MapEvent::MoveEnd | MapEvent::ZoomEnd => {
                if let Some(map) = &self.base_map {
                    self.state.zoom = map.zoom();
                }
                self.request_coarse();
            }
            MapEvent::ContextLost => self.on_context_lost(),
            MapEvent::ContextRestored => self.on_context_restored(),
        }
    }

    fn on_context_lost(&mut self) {
        if !self.context.on_context_lost() {
            return;
        }
        self.animator.stop();
        self.scheduler.set_suspended(true);
        self.metrics.context_losses += 1;
        self.events.emit(&EngineEvent::DegradedMode { active: true });
    }

    fn on_context_restored(&mut self) {
        if !self.context.on_context_restored() {
            return;
        }
        self.scheduler.set_suspended(false);
        let now = self.clock.now();
        if self.scheduler.is_paused() {
            // Cached layers may point at dead GPU resources.
            self.composer.invalidate_cache();
            self.scheduler.mark_pending();
            self.full_pass_owed = true;
        } else {
            self.scheduler.note_executed(now);
            self.compose(CompositionMode::Full);
        }
        self.events.emit(&EngineEvent::DegradedMode { active: false });
        self.sync_pulse(now);
    }

    /// Resolve a click and notify subscribers.
    pub fn handle_pick(&mut self, pick: &PickResult) -> Option<Dispatch> {
        if self.destroyed {
            return None;
        }
        let ctx = DispatchContext {
            stores: &self.stores,
            time_range: self.state.time_range,
            now: self.clock.now(),
            countries: &self.countries,
            base_map: self.base_map.as_deref(),
        };
        let out = dispatch(pick, &ctx)?;
        let event = match &out {
            Dispatch::Popup(p) => EngineEvent::Popup(p.clone()),
            Dispatch::Country(c) => EngineEvent::CountryClicked(c.clone()),
        };
        self.events.emit(&event);
        Some(out)
    }

    /// Stop everything and hand the renderer an empty list. Later calls are
    /// ignored.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.animator.stop();
        self.scheduler.cancel();
        self.composer.invalidate_cache();
        self.last_layers.clear();
        if let Err(err) = self.renderer.set_layers(&[]) {
            error!(%err, "renderer failed to clear layers");
        }
        self.events.clear();
        self.destroyed = true;
        info!("engine destroyed");
    }

    fn compose(&mut self, mode: CompositionMode) {
        let input = CompositionInput {
            state: &self.state,
            stores: &self.stores,
            highlights: &self.highlights,
            theme: self.theme,
            zoom: self.live_zoom(),
            tier: self.tier,
            caps: &self.config.profile(self.tier).item_caps,
            pulse_phase: self.animator.phase(),
            pulse_recency_ms: self.config.pulse.recency_window_ms,
        };
        let composition = self.composer.compose(&input, self.clock.as_ref(), mode);
        let report = &composition.report;

        let m = &mut self.metrics;
        m.compositions += 1;
        if mode == CompositionMode::Full {
            m.full_compositions += 1;
            self.full_pass_owed = false;
        }
        m.cache_hits += report.cache.hits;
        m.cache_misses += report.cache.misses;
        if report.budget.is_over_budget() {
            m.budget_overruns += 1;
        }
        m.composition_time.record(report.budget.elapsed_ms);

        match self.renderer.set_layers(&composition.layers) {
            Ok(()) => {
                let count = composition.layers.len();
                self.last_layers = composition.layers;
                self.events.emit(&EngineEvent::LayersRendered { count });
            }
            Err(err) => {
                self.metrics.renderer_errors += 1;
                error!(%err, "renderer rejected layer list");
            }
        }
    }
}

use std::collections::BTreeMap;
use std::rc::Rc;

use foundation::time::Millis;
use runtime::budget::{BudgetReport, FrameBudget};
use runtime::clock::Clock;
use scene::highlight::HighlightSets;
use scene::stores::DataStores;
use scene::tier::DeviceTier;
use scene::view_state::{ApplicationViewState, LayerKey};
use tracing::{debug, warn};

use crate::builders::BuildContext;
use crate::cache::{CacheStats, LayerCache};
use crate::layer::RenderableLayer;
use crate::registry::{LAYERS, LayerDescriptor, LayerRole};
use crate::symbology::{Theme, colors_for};
use crate::visibility::VisibilityPolicy;

/// Inputs of one composition pass.
#[derive(Debug, Clone, Copy)]
pub struct CompositionInput<'a> {
    pub state: &'a ApplicationViewState,
    pub stores: &'a DataStores,
    pub highlights: &'a HighlightSets,
    pub theme: Theme,
    /// Live map zoom (may differ from `state.zoom` mid-gesture).
    pub zoom: f64,
    pub tier: DeviceTier,
    /// Per-layer item caps for `tier`.
    pub caps: &'a BTreeMap<LayerKey, usize>,
    pub pulse_phase: Option<f32>,
    pub pulse_recency_ms: i64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompositionMode {
    /// Reuse cached layers whose signature is unchanged.
    Incremental,
    /// Drop every cache entry first.
    Full,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositionReport {
    pub mode: CompositionMode,
    pub started_at: Millis,
    pub layer_count: usize,
    pub cache: CacheStats,
    pub budget: BudgetReport,
}

#[derive(Debug, Clone)]
pub struct Composition {
    pub layers: Vec<Rc<RenderableLayer>>,
    pub report: CompositionReport,
}

impl Composition {
    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    pub fn layer(&self, id: &str) -> Option<&Rc<RenderableLayer>> {
        self.layers.iter().find(|l| l.id == id)
    }
}

/// Turns view state plus data stores into the ordered layer list.
///
/// Never fails: bad or empty input means fewer layers, and running over the
/// soft budget is only logged.
#[derive(Debug)]
pub struct Composer {
    policy: VisibilityPolicy,
    cache: LayerCache,
    budget: FrameBudget,
}

impl Composer {
    pub fn new(policy: VisibilityPolicy, budget: FrameBudget) -> Self {
        Self {
            policy,
            cache: LayerCache::new(),
            budget,
        }
    }

    pub fn policy(&self) -> &VisibilityPolicy {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut VisibilityPolicy {
        &mut self.policy
    }

    pub fn cache(&self) -> &LayerCache {
        &self.cache
    }

    pub fn invalidate_cache(&mut self) {
        self.cache.invalidate_all();
    }

    /// Descriptors that pass the visibility gates, in paint order.
    pub fn eligible<'s>(
        &'s self,
        input: &'s CompositionInput<'_>,
    ) -> impl Iterator<Item = &'static LayerDescriptor> + 's {
        LAYERS.iter().filter(move |d| {
            self.policy
                .is_visible(d.key, input.state, input.zoom, input.tier)
        })
    }

    pub fn compose(
        &mut self,
        input: &CompositionInput<'_>,
        clock: &dyn Clock,
        mode: CompositionMode,
    ) -> Composition {
        let started_at = clock.now();
        let span = self.budget.start(started_at);
        if mode == CompositionMode::Full {
            self.cache.invalidate_all();
        }
        let stats_before = self.cache.stats();

        let palette = colors_for(input.theme);
        let ctx = BuildContext {
            state: input.state,
            stores: input.stores,
            highlights: input.highlights,
            palette: &palette,
            caps: input.caps,
            now: started_at,
            pulse_phase: input.pulse_phase,
            pulse_recency_ms: input.pulse_recency_ms,
        };

        let eligible: Vec<&'static LayerDescriptor> = self.eligible(input).collect();
        let mut layers = Vec::with_capacity(eligible.len());
        for d in eligible {
            let built = match d.signature {
                Some(signature) => {
                    let sig = signature(&ctx);
                    self.cache.get_or_build(d.id, sig, || (d.build)(&ctx))
                }
                None => (d.build)(&ctx).map(Rc::new),
            };
            if let Some(layer) = built {
                debug_assert!(d.role != LayerRole::Ghost || layer.is_ghost());
                layers.push(layer);
            }
        }

        let budget = span.finish(clock.now());
        let after = self.cache.stats();
        let cache = CacheStats {
            hits: after.hits - stats_before.hits,
            misses: after.misses - stats_before.misses,
        };
        if budget.is_over_budget() {
            warn!(
                elapsed_ms = budget.elapsed_ms,
                budget_ms = budget.budget_ms,
                layers = layers.len(),
                "composition exceeded frame budget"
            );
        } else {
            debug!(
                elapsed_ms = budget.elapsed_ms,
                layers = layers.len(),
                cache_hits = cache.hits,
                cache_misses = cache.misses,
                "composition finished"
            );
        }

        Composition {
            report: CompositionReport {
                mode,
                started_at,
                layer_count: layers.len(),
                cache,
                budget,
            },
            layers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Composer, CompositionInput, CompositionMode};
    use crate::registry::ids;
    use crate::symbology::Theme;
    use crate::visibility::VisibilityPolicy;
    use foundation::bounds::LonLat;
    use foundation::time::{HOUR_MS, Millis};
    use pretty_assertions::assert_eq;
    use runtime::budget::FrameBudget;
    use runtime::clock::ManualClock;
    use scene::highlight::{AssetKind, HighlightSets};
    use scene::records::{ConflictZone, Fire, Hotspot, Severity, Site};
    use scene::stores::DataStores;
    use scene::tier::DeviceTier;
    use scene::view_state::{ApplicationViewState, LayerKey};
    use std::collections::BTreeMap;
    use std::rc::Rc;

    const NOW: Millis = Millis(900 * HOUR_MS);

    struct World {
        state: ApplicationViewState,
        stores: DataStores,
        highlights: HighlightSets,
        caps: BTreeMap<LayerKey, usize>,
        tier: DeviceTier,
        theme: Theme,
        zoom: f64,
    }

    impl World {
        fn new() -> Self {
            let mut stores = DataStores::new();
            stores.bases.replace(vec![
                Site {
                    id: "b1".into(),
                    name: "Base One".into(),
                    position: LonLat::new(10.0, 50.0),
                    operator: None,
                },
                Site {
                    id: "b2".into(),
                    name: "Base Two".into(),
                    position: LonLat::new(11.0, 51.0),
                    operator: None,
                },
            ]);
            stores.hotspots.replace(vec![Hotspot {
                id: "h1".into(),
                name: "Hot".into(),
                position: LonLat::new(30.0, 30.0),
                escalation_score: 2.0,
                has_breaking: false,
                updated_at: None,
            }]);
            stores.conflict_zones.replace(vec![ConflictZone {
                id: "z1".into(),
                name: "Zone".into(),
                rings: vec![vec![
                    LonLat::new(0.0, 0.0),
                    LonLat::new(1.0, 0.0),
                    LonLat::new(1.0, 1.0),
                    LonLat::new(0.0, 0.0),
                ]],
                intensity: Severity::High,
            }]);
            let mut state = ApplicationViewState::default();
            state.set_enabled(LayerKey::Bases, true);
            Self {
                state,
                stores,
                highlights: HighlightSets::new(),
                caps: BTreeMap::new(),
                tier: DeviceTier::Full,
                theme: Theme::Dark,
                zoom: 5.0,
            }
        }

        fn input(&self) -> CompositionInput<'_> {
            CompositionInput {
                state: &self.state,
                stores: &self.stores,
                highlights: &self.highlights,
                theme: self.theme,
                zoom: self.zoom,
                tier: self.tier,
                caps: &self.caps,
                pulse_phase: None,
                pulse_recency_ms: 0,
            }
        }
    }

    fn composer() -> Composer {
        Composer::new(
            VisibilityPolicy::new(
                [(LayerKey::Bases, 3.0), (LayerKey::Nuclear, 3.0)],
                [LayerKey::Conflicts, LayerKey::Fires],
            ),
            FrameBudget::sixty_fps(),
        )
    }

    fn clock() -> ManualClock {
        ManualClock::new(NOW)
    }

    #[test]
    fn layers_follow_priority_order() {
        let w = World::new();
        let out = composer().compose(&w.input(), &clock(), CompositionMode::Incremental);
        assert_eq!(
            out.layer_ids(),
            vec![
                ids::CONFLICT_ZONES,
                ids::BASES,
                ids::BASES_GHOST,
                ids::HOTSPOTS,
                ids::HOTSPOTS_GHOST,
            ]
        );
        assert_eq!(out.report.layer_count, 5);
    }

    #[test]
    fn unchanged_highlights_reuse_cached_layer() {
        let mut w = World::new();
        w.highlights.replace(AssetKind::Base, ["b1"]);
        let mut c = composer();
        let clk = clock();

        let first = c.compose(&w.input(), &clk, CompositionMode::Incremental);
        let second = c.compose(&w.input(), &clk, CompositionMode::Incremental);
        assert!(Rc::ptr_eq(
            first.layer(ids::BASES).unwrap(),
            second.layer(ids::BASES).unwrap()
        ));
        assert_eq!(second.report.cache.misses, 0);

        w.highlights.replace(AssetKind::Base, ["b2"]);
        let third = c.compose(&w.input(), &clk, CompositionMode::Incremental);
        assert!(!Rc::ptr_eq(
            second.layer(ids::BASES).unwrap(),
            third.layer(ids::BASES).unwrap()
        ));
        // Unrelated layers stay cached.
        assert!(Rc::ptr_eq(
            second.layer(ids::CONFLICT_ZONES).unwrap(),
            third.layer(ids::CONFLICT_ZONES).unwrap()
        ));
    }

    #[test]
    fn full_mode_bypasses_cache() {
        let w = World::new();
        let mut c = composer();
        let clk = clock();
        let first = c.compose(&w.input(), &clk, CompositionMode::Incremental);
        let full = c.compose(&w.input(), &clk, CompositionMode::Full);
        assert_eq!(full.report.cache.hits, 0);
        assert!(!Rc::ptr_eq(
            first.layer(ids::BASES).unwrap(),
            full.layer(ids::BASES).unwrap()
        ));
    }

    #[test]
    fn theme_change_rebuilds_cached_layers() {
        let mut w = World::new();
        let mut c = composer();
        let clk = clock();
        let dark = c.compose(&w.input(), &clk, CompositionMode::Incremental);
        w.theme = Theme::Light;
        let light = c.compose(&w.input(), &clk, CompositionMode::Incremental);
        assert!(!Rc::ptr_eq(
            dark.layer(ids::CONFLICT_ZONES).unwrap(),
            light.layer(ids::CONFLICT_ZONES).unwrap()
        ));
    }

    #[test]
    fn bases_below_min_zoom_are_absent() {
        let mut w = World::new();
        w.zoom = 2.0;
        let out = composer().compose(&w.input(), &clock(), CompositionMode::Incremental);
        assert!(out.layer(ids::BASES).is_none());
        assert!(out.layer(ids::BASES_GHOST).is_none());
        assert!(out.layer(ids::CONFLICT_ZONES).is_some());
    }

    #[test]
    fn lite_tier_caps_fires_to_first_hundred() {
        let mut w = World::new();
        w.tier = DeviceTier::Lite;
        w.state.set_enabled(LayerKey::Fires, true);
        w.caps.insert(LayerKey::Fires, 100);
        w.stores.fires.replace(
            (0..150)
                .map(|i| Fire {
                    id: format!("fire-{i}"),
                    position: LonLat::new(-120.0 + i as f64 * 0.01, 37.0),
                    brightness: 320.0,
                    detected_at: Some(NOW),
                })
                .collect(),
        );

        let out = composer().compose(&w.input(), &clock(), CompositionMode::Incremental);
        let fires = out.layer(ids::FIRES).unwrap();
        assert_eq!(fires.len(), 100);
        assert_eq!(fires.features.first().unwrap().id, "fire-0");
        assert_eq!(fires.features.last().unwrap().id, "fire-99");
        // Bases and hotspots are not on the lite allow-list.
        assert_eq!(out.layer_ids(), vec![ids::CONFLICT_ZONES, ids::FIRES]);
    }

    #[test]
    fn static_tier_composes_nothing() {
        let mut w = World::new();
        w.tier = DeviceTier::Static;
        let out = composer().compose(&w.input(), &clock(), CompositionMode::Incremental);
        assert!(out.layers.is_empty());
    }

    #[test]
    fn empty_and_malformed_inputs_still_compose() {
        let mut w = World::new();
        w.stores = DataStores::new();
        w.stores.bases.replace(vec![Site {
            id: "bad".into(),
            name: "Bad".into(),
            position: LonLat::new(f64::NAN, f64::NAN),
            operator: None,
        }]);
        w.zoom = f64::NAN;
        let out = composer().compose(&w.input(), &clock(), CompositionMode::Incremental);
        assert!(out.layers.is_empty());
    }

    #[test]
    fn over_budget_pass_still_returns_layers() {
        let w = World::new();
        let clk = clock();
        clk.set_auto_step(40);
        let out = composer().compose(&w.input(), &clk, CompositionMode::Incremental);
        assert!(out.report.budget.is_over_budget());
        assert_eq!(out.layers.len(), 5);
    }
}

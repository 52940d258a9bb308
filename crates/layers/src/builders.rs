//! One builder per registered layer.
//!
//! Builders read only from [`BuildContext`], skip records with non-finite
//! coordinates, and return `None` when nothing is left to draw.

use std::borrow::Cow;
use std::collections::BTreeMap;

use foundation::bounds::LonLat;
use foundation::time::Millis;
use scene::highlight::{AssetKind, HighlightSets};
use scene::records::{DomainRecord, MilitaryFlight, Severity, Site};
use scene::stores::DataStores;
use scene::view_state::{ApplicationViewState, LayerKey};

use crate::layer::{
    Feature, FeatureStyle, GHOST_SUFFIX, Geometry, LayerKind, RenderableLayer, Rgba,
};
use crate::pulse::{hotspot_qualifies, news_qualifies};
use crate::registry::ids;
use crate::symbology::{Palette, fade};
use crate::time_filter::{cap_opt, filter_by_time, filter_clusters};

const GHOST_PADDING_PX: f32 = 8.0;
const HIGHLIGHT_SCALE: f32 = 1.8;

/// Everything a builder may look at during one composition pass.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub state: &'a ApplicationViewState,
    pub stores: &'a DataStores,
    pub highlights: &'a HighlightSets,
    pub palette: &'a Palette,
    pub caps: &'a BTreeMap<LayerKey, usize>,
    pub now: Millis,
    /// Shared pulse phase; `None` while the animation is idle.
    pub pulse_phase: Option<f32>,
    pub pulse_recency_ms: i64,
}

impl<'a> BuildContext<'a> {
    /// Items inside the current time window.
    pub fn windowed<'s, T>(&self, items: &'s [T]) -> Cow<'s, [T]>
    where
        T: DomainRecord + Clone,
    {
        filter_by_time(items, self.state.time_range, self.now, T::timestamp)
    }

    pub fn cap_for(&self, key: LayerKey) -> Option<usize> {
        self.caps.get(&key).copied()
    }
}

fn point_feature<R: DomainRecord>(
    record: &R,
    style: FeatureStyle,
    label: Option<String>,
) -> Option<Feature> {
    let position = record.position();
    position.is_finite().then(|| Feature {
        id: record.id().to_string(),
        geometry: Geometry::Point(position),
        style,
        label,
    })
}

fn point_layer<'r, R, I, S>(
    id: &str,
    kind: LayerKind,
    items: I,
    style: S,
    label: impl Fn(&R) -> Option<String>,
) -> Option<RenderableLayer>
where
    R: DomainRecord + 'r,
    I: IntoIterator<Item = &'r R>,
    S: Fn(&R) -> FeatureStyle,
{
    let features = items
        .into_iter()
        .filter_map(|r| point_feature(r, style(r), label(r)))
        .collect();
    RenderableLayer::new(id, kind, features).non_empty()
}

fn no_label<R>(_: &R) -> Option<String> {
    None
}

/// Invisible, enlarged copy of `visible` used only for hit-testing.
pub fn ghost_of(visible: RenderableLayer) -> RenderableLayer {
    let features = visible
        .features
        .into_iter()
        .map(|mut f| {
            f.style.radius_px += GHOST_PADDING_PX;
            f.label = None;
            f
        })
        .collect();
    RenderableLayer::new(
        format!("{}{GHOST_SUFFIX}", visible.id),
        visible.kind,
        features,
    )
    .with_opacity(0.0)
}

fn finite_ring(ring: &[LonLat]) -> Option<Vec<LonLat>> {
    (ring.len() >= 3 && ring.iter().all(LonLat::is_finite)).then(|| ring.to_vec())
}

fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v } else { fallback }
}

pub fn conflict_zones(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    let p = ctx.palette;
    let features = ctx
        .stores
        .conflict_zones
        .items()
        .iter()
        .filter_map(|zone| {
            let mut rings = zone.rings.iter();
            let outer = finite_ring(rings.next()?)?;
            let mut polygon = vec![outer];
            polygon.extend(rings.filter_map(|r| finite_ring(r)));

            let highlighted = ctx.highlights.contains(AssetKind::Conflict, &zone.id);
            let style = if highlighted {
                FeatureStyle::area(p.conflict_fill, p.highlight, 3.0)
            } else {
                let fill = fade(p.conflict_fill, intensity_alpha(zone.intensity));
                FeatureStyle::area(fill, p.conflict_stroke, 1.0)
            };
            Some(Feature {
                id: zone.id.clone(),
                geometry: Geometry::Polygon(polygon),
                style,
                label: Some(zone.name.clone()),
            })
        })
        .collect();
    RenderableLayer::new(ids::CONFLICT_ZONES, LayerKind::Polygon, features).non_empty()
}

fn intensity_alpha(s: Severity) -> f32 {
    match s {
        Severity::Low => 0.5,
        Severity::Medium => 0.7,
        Severity::High => 0.85,
        Severity::Critical => 1.0,
    }
}

pub fn pipelines(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    let p = ctx.palette;
    let features = ctx
        .stores
        .pipelines
        .items()
        .iter()
        .filter_map(|line| {
            let path: Vec<LonLat> = line.path.iter().copied().filter(LonLat::is_finite).collect();
            if path.len() < 2 {
                return None;
            }
            let style = if ctx.highlights.contains(AssetKind::Pipeline, &line.id) {
                FeatureStyle::line(p.highlight, 4.0)
            } else if line.operational {
                FeatureStyle::line(p.pipeline, 1.5)
            } else {
                FeatureStyle::line(p.pipeline_offline, 1.0)
            };
            Some(Feature {
                id: line.id.clone(),
                geometry: Geometry::Path(path),
                style,
                label: Some(line.name.clone()),
            })
        })
        .collect();
    RenderableLayer::new(ids::PIPELINES, LayerKind::Path, features).non_empty()
}

fn site_layer(
    ctx: &BuildContext<'_>,
    id: &str,
    sites: &[Site],
    kind: AssetKind,
    color: Rgba,
) -> Option<RenderableLayer> {
    let highlight = ctx.palette.highlight;
    point_layer(
        id,
        LayerKind::Icon,
        sites,
        |s: &Site| {
            if ctx.highlights.contains(kind, &s.id) {
                FeatureStyle::point(highlight, 5.0 * HIGHLIGHT_SCALE)
            } else {
                FeatureStyle::point(color, 5.0)
            }
        },
        |s: &Site| Some(s.name.clone()),
    )
}

pub fn bases(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    let items = ctx.stores.bases.items();
    site_layer(ctx, ids::BASES, items, AssetKind::Base, ctx.palette.base)
}

pub fn bases_ghost(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    bases(ctx).map(ghost_of)
}

pub fn nuclear(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    let items = ctx.stores.nuclear.items();
    site_layer(ctx, ids::NUCLEAR, items, AssetKind::Nuclear, ctx.palette.nuclear)
}

pub fn nuclear_ghost(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    nuclear(ctx).map(ghost_of)
}

pub fn hotspots(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    let p = ctx.palette;
    point_layer(
        ids::HOTSPOTS,
        LayerKind::Scatter,
        ctx.stores.hotspots.items(),
        |h| {
            let score = finite_or(h.escalation_score, 0.0).clamp(0.0, 5.0);
            let color = if score >= 4.0 || h.has_breaking {
                p.hotspot_hot
            } else {
                p.hotspot
            };
            FeatureStyle::point(color, 6.0 + 1.5 * score)
        },
        |h| Some(h.name.clone()),
    )
}

pub fn hotspots_ghost(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    hotspots(ctx).map(ghost_of)
}

pub fn outages(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    let items = ctx.windowed(ctx.stores.outages.items());
    let items = cap_opt(&items, ctx.cap_for(LayerKey::Outages));
    let p = ctx.palette;
    point_layer(
        ids::OUTAGES,
        LayerKind::Scatter,
        items,
        |o| FeatureStyle {
            stroke: p.severity(o.severity),
            width_px: 1.0,
            ..FeatureStyle::point(p.outage, 5.0)
        },
        |o| Some(o.title.clone()),
    )
}

pub fn cyber_threats(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    let items = ctx.windowed(ctx.stores.cyber_threats.items());
    let items = cap_opt(&items, ctx.cap_for(LayerKey::Cyber));
    let p = ctx.palette;
    point_layer(
        ids::CYBER_THREATS,
        LayerKind::Scatter,
        items,
        |c| FeatureStyle {
            stroke: p.severity(c.severity),
            width_px: 1.0,
            ..FeatureStyle::point(p.cyber, 4.0)
        },
        |c| Some(c.indicator.clone()),
    )
}

pub fn natural_events(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    let items = ctx.windowed(ctx.stores.natural_events.items());
    let items = cap_opt(&items, ctx.cap_for(LayerKey::Natural));
    let color = ctx.palette.natural;
    point_layer(
        ids::NATURAL_EVENTS,
        LayerKind::Icon,
        items,
        |_| FeatureStyle::point(color, 6.0),
        |e| Some(e.title.clone()),
    )
}

pub fn earthquakes(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    let items = ctx.windowed(ctx.stores.earthquakes.items());
    let color = ctx.palette.earthquake;
    point_layer(
        ids::EARTHQUAKES,
        LayerKind::Scatter,
        items.iter(),
        |q| {
            let mag = finite_or(q.magnitude, 0.0).max(0.0);
            FeatureStyle::point(color, 3.0 + 1.5 * mag)
        },
        |q| Some(q.place.clone()),
    )
}

pub fn fires(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    let items = ctx.windowed(ctx.stores.fires.items());
    let items = cap_opt(&items, ctx.cap_for(LayerKey::Fires));
    let color = ctx.palette.fire;
    point_layer(
        ids::FIRES,
        LayerKind::Scatter,
        items,
        |_| FeatureStyle::point(color, 3.0),
        no_label,
    )
}

pub fn protests(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    let items = ctx.windowed(ctx.stores.protests.items());
    let items = cap_opt(&items, ctx.cap_for(LayerKey::Protests));
    let p = ctx.palette;
    point_layer(
        ids::PROTESTS,
        LayerKind::Scatter,
        items,
        |pr| FeatureStyle {
            stroke: p.severity(pr.severity),
            width_px: 1.0,
            ..FeatureStyle::point(p.protest, 4.0)
        },
        |pr| Some(pr.title.clone()),
    )
}

pub fn flight_clusters(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    let clusters = filter_clusters(
        ctx.stores.military_flight_clusters.items(),
        ctx.state.time_range,
        ctx.now,
        MilitaryFlight::timestamp,
    );
    let color = ctx.palette.flight_cluster;
    point_layer(
        ids::FLIGHT_CLUSTERS,
        LayerKind::Scatter,
        clusters.iter(),
        |c| FeatureStyle::point(color, 6.0 + (c.flight_count.min(20) as f32) * 0.5),
        |c| Some(format!("{} ({})", c.name, c.flight_count)),
    )
}

pub fn flights(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    let items = ctx.windowed(ctx.stores.military_flights.items());
    let items = cap_opt(&items, ctx.cap_for(LayerKey::Flights));
    let color = ctx.palette.flight;
    point_layer(
        ids::FLIGHTS,
        LayerKind::Icon,
        items,
        |_| FeatureStyle::point(color, 4.0),
        |f| Some(f.callsign.clone()),
    )
}

pub fn vessels(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    let items = ctx.windowed(ctx.stores.vessels.items());
    let items = cap_opt(&items, ctx.cap_for(LayerKey::Vessels));
    let color = ctx.palette.vessel;
    point_layer(
        ids::VESSELS,
        LayerKind::Icon,
        items,
        |_| FeatureStyle::point(color, 4.0),
        |v| Some(v.name.clone()),
    )
}

pub fn news_locations(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    let items = ctx.windowed(ctx.stores.news_locations.items());
    let items = cap_opt(&items, ctx.cap_for(LayerKey::News));
    let p = ctx.palette;
    point_layer(
        ids::NEWS_LOCATIONS,
        LayerKind::Scatter,
        items,
        |n| {
            if n.is_breaking {
                FeatureStyle::point(p.news_breaking, 6.0)
            } else {
                FeatureStyle::point(p.news, 4.0)
            }
        },
        |n| Some(n.title.clone()),
    )
}

fn pulse_style(pulse: Rgba, base_radius_px: f32, phase: f32) -> FeatureStyle {
    FeatureStyle {
        fill: [0, 0, 0, 0],
        stroke: fade(pulse, 1.0 - 0.7 * phase),
        radius_px: base_radius_px * (1.0 + phase),
        width_px: 2.0,
    }
}

pub fn news_pulse(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    let phase = ctx.pulse_phase?;
    let items = ctx.windowed(ctx.stores.news_locations.items());
    let items = cap_opt(&items, ctx.cap_for(LayerKey::News));
    let style = pulse_style(ctx.palette.pulse, 8.0, phase);
    let qualifying = items
        .iter()
        .filter(|n| news_qualifies(n, ctx.now, ctx.pulse_recency_ms));
    point_layer(
        ids::NEWS_PULSE,
        LayerKind::Scatter,
        qualifying,
        |_| style,
        no_label,
    )
    .map(RenderableLayer::non_pickable)
}

pub fn hotspots_pulse(ctx: &BuildContext<'_>) -> Option<RenderableLayer> {
    let phase = ctx.pulse_phase?;
    let style = pulse_style(ctx.palette.pulse, 12.0, phase);
    let qualifying = ctx
        .stores
        .hotspots
        .items()
        .iter()
        .filter(|h| hotspot_qualifies(h));
    point_layer(
        ids::HOTSPOTS_PULSE,
        LayerKind::Scatter,
        qualifying,
        |_| style,
        no_label,
    )
    .map(RenderableLayer::non_pickable)
}

#[cfg(test)]
mod tests {
    use super::{
        BuildContext, bases, bases_ghost, cyber_threats, fires, flight_clusters, news_pulse,
        pipelines,
    };
    use crate::layer::{Geometry, LayerKind};
    use crate::symbology::{Theme, colors_for};
    use foundation::bounds::LonLat;
    use foundation::time::{HOUR_MS, MINUTE_MS, Millis, TimeRange};
    use scene::highlight::{AssetKind, HighlightSets};
    use scene::records::{
        CyberThreat, Fire, MilitaryFlight, MilitaryFlightCluster, NewsLocation, Pipeline,
        Severity, Site,
    };
    use scene::stores::DataStores;
    use scene::view_state::{ApplicationViewState, LayerKey};
    use std::collections::BTreeMap;

    const NOW: Millis = Millis(500 * HOUR_MS);

    fn site(id: &str, lon: f64, lat: f64) -> Site {
        Site {
            id: id.into(),
            name: id.to_uppercase(),
            position: LonLat::new(lon, lat),
            operator: None,
        }
    }

    struct Fixture {
        state: ApplicationViewState,
        stores: DataStores,
        highlights: HighlightSets,
        caps: BTreeMap<LayerKey, usize>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                state: ApplicationViewState::default(),
                stores: DataStores::new(),
                highlights: HighlightSets::new(),
                caps: BTreeMap::new(),
            }
        }
    }

    fn with_ctx<R>(
        fx: &Fixture,
        pulse_phase: Option<f32>,
        f: impl FnOnce(&BuildContext<'_>) -> R,
    ) -> R {
        let palette = colors_for(Theme::Dark);
        let ctx = BuildContext {
            state: &fx.state,
            stores: &fx.stores,
            highlights: &fx.highlights,
            palette: &palette,
            caps: &fx.caps,
            now: NOW,
            pulse_phase,
            pulse_recency_ms: 30 * MINUTE_MS,
        };
        f(&ctx)
    }

    #[test]
    fn non_finite_positions_are_skipped() {
        let mut fx = Fixture::new();
        fx.stores.bases.replace(vec![
            site("ok", 10.0, 10.0),
            site("nan", f64::NAN, 0.0),
            site("inf", 0.0, f64::INFINITY),
        ]);
        let layer = with_ctx(&fx, None, bases).unwrap();
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.features[0].id, "ok");
    }

    #[test]
    fn empty_input_yields_no_layer() {
        let fx = Fixture::new();
        assert!(with_ctx(&fx, None, bases).is_none());
        assert!(with_ctx(&fx, None, fires).is_none());
    }

    #[test]
    fn highlighted_sites_are_enlarged() {
        let mut fx = Fixture::new();
        fx.stores.bases.replace(vec![site("a", 0.0, 0.0), site("b", 1.0, 1.0)]);
        fx.highlights.replace(AssetKind::Base, ["b"]);
        let layer = with_ctx(&fx, None, bases).unwrap();
        let palette = colors_for(Theme::Dark);
        assert_eq!(layer.features[0].style.fill, palette.base);
        assert_eq!(layer.features[1].style.fill, palette.highlight);
        assert!(layer.features[1].style.radius_px > layer.features[0].style.radius_px);
    }

    #[test]
    fn cyber_threats_fill_with_theme_colour() {
        let mut fx = Fixture::new();
        fx.stores.cyber_threats.replace(vec![CyberThreat {
            id: "c1".into(),
            indicator: "198.51.100.7".into(),
            position: LonLat::new(30.0, 50.0),
            severity: Severity::Critical,
            last_seen: None,
        }]);
        let layer = with_ctx(&fx, None, cyber_threats).unwrap();
        let palette = colors_for(Theme::Dark);
        assert_eq!(layer.features[0].style.fill, palette.cyber);
        assert_eq!(
            layer.features[0].style.stroke,
            palette.severity(Severity::Critical)
        );
    }

    #[test]
    fn ghost_is_invisible_and_wider() {
        let mut fx = Fixture::new();
        fx.stores.bases.replace(vec![site("a", 0.0, 0.0)]);
        let visible = with_ctx(&fx, None, bases).unwrap();
        let ghost = with_ctx(&fx, None, bases_ghost).unwrap();
        assert_eq!(ghost.id, "bases-layer-ghost");
        assert!(ghost.is_ghost());
        assert_eq!(ghost.opacity, 0.0);
        assert!(ghost.pickable);
        assert!(ghost.features[0].style.radius_px > visible.features[0].style.radius_px);
    }

    #[test]
    fn fires_are_windowed_then_capped() {
        let mut fx = Fixture::new();
        fx.state.time_range = TimeRange::OneHour;
        let mut items: Vec<Fire> = (0..150)
            .map(|i| Fire {
                id: format!("f{i}"),
                position: LonLat::new(i as f64 * 0.1, 0.0),
                brightness: 300.0,
                detected_at: Some(NOW),
            })
            .collect();
        items.insert(
            0,
            Fire {
                id: "stale".into(),
                position: LonLat::new(0.0, 0.0),
                brightness: 300.0,
                detected_at: Some(Millis(NOW.0 - 2 * HOUR_MS)),
            },
        );
        fx.stores.fires.replace(items);
        fx.caps.insert(LayerKey::Fires, 100);

        let layer = with_ctx(&fx, None, fires).unwrap();
        assert_eq!(layer.len(), 100);
        assert_eq!(layer.features[0].id, "f0");
        assert_eq!(layer.features[99].id, "f99");
    }

    #[test]
    fn pipelines_need_two_finite_vertices() {
        let mut fx = Fixture::new();
        fx.stores.pipelines.replace(vec![
            Pipeline {
                id: "p1".into(),
                name: "Line".into(),
                path: vec![LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0)],
                operational: true,
            },
            Pipeline {
                id: "p2".into(),
                name: "Broken".into(),
                path: vec![LonLat::new(0.0, 0.0), LonLat::new(f64::NAN, 1.0)],
                operational: true,
            },
        ]);
        let layer = with_ctx(&fx, None, pipelines).unwrap();
        assert_eq!(layer.kind, LayerKind::Path);
        assert_eq!(layer.len(), 1);
        assert!(matches!(layer.features[0].geometry, Geometry::Path(ref p) if p.len() == 2));
    }

    #[test]
    fn cluster_labels_use_recomputed_counts() {
        let mut fx = Fixture::new();
        fx.state.time_range = TimeRange::OneHour;
        let flight = |id: &str, at: i64| MilitaryFlight {
            id: id.into(),
            callsign: id.into(),
            position: LonLat::new(0.0, 0.0),
            heading_deg: 0.0,
            last_seen: Some(Millis(at)),
        };
        fx.stores.military_flight_clusters.replace(vec![MilitaryFlightCluster::new(
            "c",
            "Tankers",
            LonLat::new(30.0, 40.0),
            vec![flight("a", NOW.0), flight("b", NOW.0 - 3 * HOUR_MS)],
        )]);
        let layer = with_ctx(&fx, None, flight_clusters).unwrap();
        assert_eq!(layer.features[0].label.as_deref(), Some("Tankers (1)"));
    }

    #[test]
    fn news_pulse_needs_phase_and_candidates() {
        let mut fx = Fixture::new();
        fx.stores.news_locations.replace(vec![
            NewsLocation {
                id: "calm".into(),
                title: "calm".into(),
                position: LonLat::new(0.0, 0.0),
                pub_date: None,
                is_breaking: false,
                threat: Severity::Low,
            },
            NewsLocation {
                id: "breaking".into(),
                title: "breaking".into(),
                position: LonLat::new(1.0, 1.0),
                pub_date: None,
                is_breaking: true,
                threat: Severity::High,
            },
        ]);
        assert!(with_ctx(&fx, None, news_pulse).is_none());

        let layer = with_ctx(&fx, Some(0.5), news_pulse).unwrap();
        assert!(!layer.pickable);
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.features[0].id, "breaking");
    }
}

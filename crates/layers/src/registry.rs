use foundation::signature::{Signature, SignatureBuilder};
use scene::highlight::AssetKind;
use scene::view_state::LayerKey;

use crate::builders::{self, BuildContext};
use crate::layer::RenderableLayer;

/// Registered layer ids.
pub mod ids {
    pub const CONFLICT_ZONES: &str = "conflict-zones-layer";
    pub const PIPELINES: &str = "pipelines-layer";
    pub const BASES: &str = "bases-layer";
    pub const BASES_GHOST: &str = "bases-layer-ghost";
    pub const NUCLEAR: &str = "nuclear-layer";
    pub const NUCLEAR_GHOST: &str = "nuclear-layer-ghost";
    pub const HOTSPOTS: &str = "hotspots-layer";
    pub const HOTSPOTS_GHOST: &str = "hotspots-layer-ghost";
    pub const OUTAGES: &str = "outages-layer";
    pub const CYBER_THREATS: &str = "cyber-threats-layer";
    pub const NATURAL_EVENTS: &str = "natural-events-layer";
    pub const EARTHQUAKES: &str = "earthquakes-layer";
    pub const FIRES: &str = "fires-layer";
    pub const PROTESTS: &str = "protests-layer";
    pub const FLIGHT_CLUSTERS: &str = "military-flight-clusters-layer";
    pub const FLIGHTS: &str = "military-flights-layer";
    pub const VESSELS: &str = "vessels-layer";
    pub const NEWS_LOCATIONS: &str = "news-locations-layer";
    pub const NEWS_PULSE: &str = "news-pulse-layer";
    pub const HOTSPOTS_PULSE: &str = "hotspots-pulse-layer";
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayerRole {
    Primary,
    /// Invisible hit-test twin of the preceding primary layer.
    Ghost,
    /// Rebuilt on every pulse tick; never cached.
    Pulse,
}

pub type SignatureFn = fn(&BuildContext<'_>) -> Signature;
pub type BuildFn = fn(&BuildContext<'_>) -> Option<RenderableLayer>;

/// Static description of one layer. Layers with a `signature` go through the
/// cache; the rest are rebuilt on every pass.
#[derive(Debug, Copy, Clone)]
pub struct LayerDescriptor {
    pub id: &'static str,
    pub key: LayerKey,
    pub role: LayerRole,
    pub signature: Option<SignatureFn>,
    pub build: BuildFn,
}

impl LayerDescriptor {
    const fn new(id: &'static str, key: LayerKey, role: LayerRole, build: BuildFn) -> Self {
        Self {
            id,
            key,
            role,
            signature: None,
            build,
        }
    }

    const fn cached(mut self, signature: SignatureFn) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn is_cached(&self) -> bool {
        self.signature.is_some()
    }
}

use LayerRole::{Ghost, Primary, Pulse};

/// Every layer in paint order: static geography first, dynamic overlays
/// after, ghosts right behind their visible twin, pulse layers on top.
pub static LAYERS: [LayerDescriptor; 20] = [
    LayerDescriptor::new(
        ids::CONFLICT_ZONES,
        LayerKey::Conflicts,
        Primary,
        builders::conflict_zones,
    )
    .cached(conflict_signature),
    LayerDescriptor::new(ids::PIPELINES, LayerKey::Pipelines, Primary, builders::pipelines)
        .cached(pipeline_signature),
    LayerDescriptor::new(ids::BASES, LayerKey::Bases, Primary, builders::bases)
        .cached(base_signature),
    LayerDescriptor::new(ids::BASES_GHOST, LayerKey::Bases, Ghost, builders::bases_ghost)
        .cached(base_signature),
    LayerDescriptor::new(ids::NUCLEAR, LayerKey::Nuclear, Primary, builders::nuclear)
        .cached(nuclear_signature),
    LayerDescriptor::new(ids::NUCLEAR_GHOST, LayerKey::Nuclear, Ghost, builders::nuclear_ghost)
        .cached(nuclear_signature),
    LayerDescriptor::new(ids::HOTSPOTS, LayerKey::Hotspots, Primary, builders::hotspots)
        .cached(hotspot_signature),
    LayerDescriptor::new(ids::HOTSPOTS_GHOST, LayerKey::Hotspots, Ghost, builders::hotspots_ghost)
        .cached(hotspot_signature),
    LayerDescriptor::new(ids::OUTAGES, LayerKey::Outages, Primary, builders::outages),
    LayerDescriptor::new(ids::CYBER_THREATS, LayerKey::Cyber, Primary, builders::cyber_threats),
    LayerDescriptor::new(ids::NATURAL_EVENTS, LayerKey::Natural, Primary, builders::natural_events),
    LayerDescriptor::new(ids::EARTHQUAKES, LayerKey::Natural, Primary, builders::earthquakes),
    LayerDescriptor::new(ids::FIRES, LayerKey::Fires, Primary, builders::fires),
    LayerDescriptor::new(ids::PROTESTS, LayerKey::Protests, Primary, builders::protests),
    LayerDescriptor::new(
        ids::FLIGHT_CLUSTERS,
        LayerKey::Flights,
        Primary,
        builders::flight_clusters,
    ),
    LayerDescriptor::new(ids::FLIGHTS, LayerKey::Flights, Primary, builders::flights),
    LayerDescriptor::new(ids::VESSELS, LayerKey::Vessels, Primary, builders::vessels),
    LayerDescriptor::new(ids::NEWS_LOCATIONS, LayerKey::News, Primary, builders::news_locations),
    LayerDescriptor::new(ids::NEWS_PULSE, LayerKey::News, Pulse, builders::news_pulse),
    LayerDescriptor::new(ids::HOTSPOTS_PULSE, LayerKey::Hotspots, Pulse, builders::hotspots_pulse),
];

pub fn descriptor(id: &str) -> Option<&'static LayerDescriptor> {
    LAYERS.iter().find(|d| d.id == id)
}

fn base_inputs(domain: &str, generation: u64, ctx: &BuildContext<'_>) -> SignatureBuilder {
    SignatureBuilder::new(domain)
        .u64(generation)
        .str(ctx.palette.theme.as_str())
}

fn highlighted(b: SignatureBuilder, ctx: &BuildContext<'_>, kind: AssetKind) -> SignatureBuilder {
    b.id_set(ctx.highlights.ids(kind))
}

fn conflict_signature(ctx: &BuildContext<'_>) -> Signature {
    let b = base_inputs("conflicts", ctx.stores.conflict_zones.generation(), ctx);
    highlighted(b, ctx, AssetKind::Conflict).finish()
}

fn pipeline_signature(ctx: &BuildContext<'_>) -> Signature {
    let b = base_inputs("pipelines", ctx.stores.pipelines.generation(), ctx);
    highlighted(b, ctx, AssetKind::Pipeline).finish()
}

fn base_signature(ctx: &BuildContext<'_>) -> Signature {
    let b = base_inputs("bases", ctx.stores.bases.generation(), ctx);
    highlighted(b, ctx, AssetKind::Base).finish()
}

fn nuclear_signature(ctx: &BuildContext<'_>) -> Signature {
    let b = base_inputs("nuclear", ctx.stores.nuclear.generation(), ctx);
    highlighted(b, ctx, AssetKind::Nuclear).finish()
}

fn hotspot_signature(ctx: &BuildContext<'_>) -> Signature {
    base_inputs("hotspots", ctx.stores.hotspots.generation(), ctx).finish()
}

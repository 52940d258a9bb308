//! Maps picks back to domain records, or bare-map clicks to countries.

use foundation::bounds::{GeoBounds, LonLat, point_in_polygon};
use foundation::time::{Millis, TimeRange};
use gpu::basemap::{BaseMap, ScreenPoint};
use layers::ids;
use layers::normalize_layer_id;
use layers::time_filter::filter_clusters;
use scene::records::{
    ConflictZone, CountryShape, CyberThreat, DomainRecord, Earthquake, Fire, Hotspot,
    MilitaryFlight, MilitaryFlightCluster, NaturalEvent, NewsLocation, Outage, Pipeline, Protest,
    Site, Vessel,
};
use scene::stores::DataStores;
use serde::Serialize;
use serde_json::{Map, Value};

/// Base-map layer holding country outlines, queried when no precomputed
/// geometry matches.
pub const COUNTRY_BOUNDARY_LAYER: &str = "country-boundaries";

/// What the renderer reports under the cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum PickedObject {
    /// GeoJSON-backed layer: only the feature properties come back.
    Feature { properties: Map<String, Value> },
    Record { id: String },
}

impl PickedObject {
    pub fn record_id(&self) -> Option<String> {
        match self {
            PickedObject::Record { id } => Some(id.clone()),
            PickedObject::Feature { properties } => match properties.get("id")? {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub layer_id: String,
    pub object: PickedObject,
}

/// One click. `hit` is `None` on bare map.
#[derive(Debug, Clone, PartialEq)]
pub struct PickResult {
    pub coordinate: LonLat,
    pub x: f64,
    pub y: f64,
    pub hit: Option<PickHit>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupKind {
    Conflict,
    Pipeline,
    Base,
    Nuclear,
    Hotspot,
    Outage,
    Cyber,
    NaturalEvent,
    Earthquake,
    Fire,
    Protest,
    MilitaryFlightCluster,
    MilitaryFlight,
    Vessel,
    News,
}

/// Popup type per pickable layer id (ghost suffix already removed).
pub fn popup_kind_for(layer_id: &str) -> Option<PopupKind> {
    let kind = match layer_id {
        ids::CONFLICT_ZONES => PopupKind::Conflict,
        ids::PIPELINES => PopupKind::Pipeline,
        ids::BASES => PopupKind::Base,
        ids::NUCLEAR => PopupKind::Nuclear,
        ids::HOTSPOTS => PopupKind::Hotspot,
        ids::OUTAGES => PopupKind::Outage,
        ids::CYBER_THREATS => PopupKind::Cyber,
        ids::NATURAL_EVENTS => PopupKind::NaturalEvent,
        ids::EARTHQUAKES => PopupKind::Earthquake,
        ids::FIRES => PopupKind::Fire,
        ids::PROTESTS => PopupKind::Protest,
        ids::FLIGHT_CLUSTERS => PopupKind::MilitaryFlightCluster,
        ids::FLIGHTS => PopupKind::MilitaryFlight,
        ids::VESSELS => PopupKind::Vessel,
        ids::NEWS_LOCATIONS => PopupKind::News,
        _ => return None,
    };
    Some(kind)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum PopupData {
    Conflict(ConflictZone),
    Pipeline(Pipeline),
    Base(Site),
    Nuclear(Site),
    Hotspot(Hotspot),
    Outage(Outage),
    Cyber(CyberThreat),
    NaturalEvent(NaturalEvent),
    Earthquake(Earthquake),
    Fire(Fire),
    Protest(Protest),
    MilitaryFlightCluster(MilitaryFlightCluster),
    MilitaryFlight(MilitaryFlight),
    Vessel(Vessel),
    News(NewsLocation),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupRequest {
    #[serde(rename = "popup")]
    pub kind: PopupKind,
    pub data: PopupData,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryClick {
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Popup(PopupRequest),
    Country(CountryClick),
}

/// Read-only view the dispatcher resolves against.
#[derive(Clone, Copy)]
pub struct DispatchContext<'a> {
    pub stores: &'a DataStores,
    pub time_range: TimeRange,
    pub now: Millis,
    pub countries: &'a CountryIndex,
    pub base_map: Option<&'a dyn BaseMap>,
}

pub fn dispatch(pick: &PickResult, ctx: &DispatchContext<'_>) -> Option<Dispatch> {
    match &pick.hit {
        Some(hit) => popup_for(hit, pick.x, pick.y, ctx).map(Dispatch::Popup),
        None => Some(Dispatch::Country(resolve_country(
            pick.coordinate,
            ScreenPoint::new(pick.x, pick.y),
            ctx,
        ))),
    }
}

fn popup_for(hit: &PickHit, x: f64, y: f64, ctx: &DispatchContext<'_>) -> Option<PopupRequest> {
    let kind = popup_kind_for(normalize_layer_id(&hit.layer_id))?;
    let id = hit.object.record_id()?;
    let data = lookup(kind, &id, ctx)?;
    Some(PopupRequest { kind, data, x, y })
}

fn lookup(kind: PopupKind, id: &str, ctx: &DispatchContext<'_>) -> Option<PopupData> {
    let s = ctx.stores;
    let data = match kind {
        PopupKind::Conflict => PopupData::Conflict(s.conflict_zones.find(id)?.clone()),
        PopupKind::Pipeline => PopupData::Pipeline(s.pipelines.find(id)?.clone()),
        PopupKind::Base => PopupData::Base(s.bases.find(id)?.clone()),
        PopupKind::Nuclear => PopupData::Nuclear(s.nuclear.find(id)?.clone()),
        PopupKind::Hotspot => PopupData::Hotspot(s.hotspots.find(id)?.clone()),
        PopupKind::Outage => PopupData::Outage(s.outages.find(id)?.clone()),
        PopupKind::Cyber => PopupData::Cyber(s.cyber_threats.find(id)?.clone()),
        PopupKind::NaturalEvent => PopupData::NaturalEvent(s.natural_events.find(id)?.clone()),
        PopupKind::Earthquake => PopupData::Earthquake(s.earthquakes.find(id)?.clone()),
        PopupKind::Fire => PopupData::Fire(s.fires.find(id)?.clone()),
        PopupKind::Protest => PopupData::Protest(s.protests.find(id)?.clone()),
        PopupKind::MilitaryFlightCluster => {
            // Same member list and count as the drawn cluster.
            let windowed = filter_clusters(
                s.military_flight_clusters.items(),
                ctx.time_range,
                ctx.now,
                MilitaryFlight::timestamp,
            );
            let cluster = windowed.iter().find(|c| c.id == id)?.clone();
            PopupData::MilitaryFlightCluster(cluster)
        }
        PopupKind::MilitaryFlight => {
            PopupData::MilitaryFlight(s.military_flights.find(id)?.clone())
        }
        PopupKind::Vessel => PopupData::Vessel(s.vessels.find(id)?.clone()),
        PopupKind::News => PopupData::News(s.news_locations.find(id)?.clone()),
    };
    Some(data)
}

#[derive(Debug, Clone)]
struct IndexedCountry {
    shape: CountryShape,
    bounds: GeoBounds,
}

/// Precomputed country polygons with bounding boxes for quick rejection.
#[derive(Debug, Clone, Default)]
pub struct CountryIndex {
    countries: Vec<IndexedCountry>,
}

impl CountryIndex {
    pub fn new(shapes: Vec<CountryShape>) -> Self {
        let countries = shapes
            .into_iter()
            .filter_map(|shape| {
                let bounds = GeoBounds::from_points(
                    shape
                        .polygons
                        .iter()
                        .filter_map(|p| p.first())
                        .flatten(),
                )?;
                Some(IndexedCountry { shape, bounds })
            })
            .collect();
        Self { countries }
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn find(&self, at: LonLat) -> Option<&CountryShape> {
        if !at.is_finite() {
            return None;
        }
        self.countries
            .iter()
            .filter(|c| c.bounds.contains(at))
            .find(|c| c.shape.polygons.iter().any(|rings| point_in_polygon(at, rings)))
            .map(|c| &c.shape)
    }
}

/// Geometry first, then the base map's boundary layer if it is loaded.
/// Unresolved clicks still carry the raw coordinate.
pub fn resolve_country(at: LonLat, point: ScreenPoint, ctx: &DispatchContext<'_>) -> CountryClick {
    let mut click = CountryClick {
        lat: at.lat,
        lon: at.lon,
        code: None,
        name: None,
    };
    if let Some(shape) = ctx.countries.find(at) {
        click.code = Some(shape.code.clone());
        click.name = Some(shape.name.clone());
        return click;
    }
    let Some(map) = ctx.base_map else {
        return click;
    };
    if !map.is_layer_loaded(COUNTRY_BOUNDARY_LAYER) {
        return click;
    }
    if let Some(feature) = map
        .query_rendered_features(point, &[COUNTRY_BOUNDARY_LAYER])
        .into_iter()
        .next()
    {
        click.code = feature.property("iso_a2").map(str::to_string);
        click.name = feature.property("name").map(str::to_string);
    }
    click
}

//! Domain records as delivered by the per-domain feeds.
//!
//! Field names follow the feeds (camelCase on the wire). Timestamp fields
//! differ per domain and are resolved through [`DomainRecord::timestamp`];
//! textual dates that fail to parse resolve to `None`.

use foundation::bounds::LonLat;
use foundation::time::{Millis, parse_timestamp};
use serde::{Deserialize, Serialize};

pub trait DomainRecord {
    /// Stable identifier, unique within its collection.
    fn id(&self) -> &str;

    /// Representative position (anchor for points, first vertex or
    /// centroid for paths and areas).
    fn position(&self) -> LonLat;

    /// Event time, `None` when absent or unparsable.
    fn timestamp(&self) -> Option<Millis> {
        None
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outage {
    pub id: String,
    pub title: String,
    pub position: LonLat,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub pub_date: Option<String>,
}

impl DomainRecord for Outage {
    fn id(&self) -> &str {
        &self.id
    }
    fn position(&self) -> LonLat {
        self.position
    }
    fn timestamp(&self) -> Option<Millis> {
        self.pub_date.as_deref().and_then(parse_timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilitaryFlight {
    pub id: String,
    pub callsign: String,
    pub position: LonLat,
    #[serde(default)]
    pub heading_deg: f32,
    #[serde(default)]
    pub last_seen: Option<Millis>,
}

impl DomainRecord for MilitaryFlight {
    fn id(&self) -> &str {
        &self.id
    }
    fn position(&self) -> LonLat {
        self.position
    }
    fn timestamp(&self) -> Option<Millis> {
        self.last_seen
    }
}

/// Group of flights rendered as a single marker.
///
/// `flight_count` is a cached copy of `flights.len()`; it must be recomputed
/// whenever the member list changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilitaryFlightCluster {
    pub id: String,
    pub name: String,
    pub position: LonLat,
    pub flights: Vec<MilitaryFlight>,
    pub flight_count: usize,
}

impl MilitaryFlightCluster {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: LonLat,
        flights: Vec<MilitaryFlight>,
    ) -> Self {
        let flight_count = flights.len();
        Self {
            id: id.into(),
            name: name.into(),
            position,
            flights,
            flight_count,
        }
    }
}

impl DomainRecord for MilitaryFlightCluster {
    fn id(&self) -> &str {
        &self.id
    }
    fn position(&self) -> LonLat {
        self.position
    }
}

/// Parent record whose visibility depends on a nested member list.
pub trait Cluster: Clone {
    type Member;

    fn members(&self) -> &[Self::Member];

    /// Copy of `self` carrying `members`, with every derived count recomputed.
    fn with_members(&self, members: Vec<Self::Member>) -> Self;
}

impl Cluster for MilitaryFlightCluster {
    type Member = MilitaryFlight;

    fn members(&self) -> &[MilitaryFlight] {
        &self.flights
    }

    fn with_members(&self, members: Vec<MilitaryFlight>) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            position: self.position,
            flight_count: members.len(),
            flights: members,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vessel {
    pub id: String,
    pub name: String,
    pub position: LonLat,
    #[serde(default)]
    pub vessel_type: String,
    #[serde(default)]
    pub last_seen: Option<Millis>,
}

impl DomainRecord for Vessel {
    fn id(&self) -> &str {
        &self.id
    }
    fn position(&self) -> LonLat {
        self.position
    }
    fn timestamp(&self) -> Option<Millis> {
        self.last_seen
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fire {
    pub id: String,
    pub position: LonLat,
    #[serde(default)]
    pub brightness: f32,
    #[serde(default)]
    pub detected_at: Option<Millis>,
}

impl DomainRecord for Fire {
    fn id(&self) -> &str {
        &self.id
    }
    fn position(&self) -> LonLat {
        self.position
    }
    fn timestamp(&self) -> Option<Millis> {
        self.detected_at
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsLocation {
    pub id: String,
    pub title: String,
    pub position: LonLat,
    #[serde(default)]
    pub pub_date: Option<String>,
    #[serde(default)]
    pub is_breaking: bool,
    #[serde(default)]
    pub threat: Severity,
}

impl DomainRecord for NewsLocation {
    fn id(&self) -> &str {
        &self.id
    }
    fn position(&self) -> LonLat {
        self.position
    }
    fn timestamp(&self) -> Option<Millis> {
        self.pub_date.as_deref().and_then(parse_timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protest {
    pub id: String,
    pub title: String,
    pub position: LonLat,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub date_start: Option<String>,
}

impl DomainRecord for Protest {
    fn id(&self) -> &str {
        &self.id
    }
    fn position(&self) -> LonLat {
        self.position
    }
    fn timestamp(&self) -> Option<Millis> {
        self.date_start.as_deref().and_then(parse_timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CyberThreat {
    pub id: String,
    pub indicator: String,
    pub position: LonLat,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub last_seen: Option<String>,
}

impl DomainRecord for CyberThreat {
    fn id(&self) -> &str {
        &self.id
    }
    fn position(&self) -> LonLat {
        self.position
    }
    fn timestamp(&self) -> Option<Millis> {
        self.last_seen.as_deref().and_then(parse_timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaturalEvent {
    pub id: String,
    pub title: String,
    pub category: String,
    pub position: LonLat,
    #[serde(default)]
    pub date: Option<String>,
}

impl DomainRecord for NaturalEvent {
    fn id(&self) -> &str {
        &self.id
    }
    fn position(&self) -> LonLat {
        self.position
    }
    fn timestamp(&self) -> Option<Millis> {
        self.date.as_deref().and_then(parse_timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Earthquake {
    pub id: String,
    pub place: String,
    pub magnitude: f32,
    pub position: LonLat,
    #[serde(default)]
    pub time: Option<Millis>,
}

impl DomainRecord for Earthquake {
    fn id(&self) -> &str {
        &self.id
    }
    fn position(&self) -> LonLat {
        self.position
    }
    fn timestamp(&self) -> Option<Millis> {
        self.time
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub id: String,
    pub name: String,
    pub position: LonLat,
    #[serde(default)]
    pub escalation_score: f32,
    #[serde(default)]
    pub has_breaking: bool,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl DomainRecord for Hotspot {
    fn id(&self) -> &str {
        &self.id
    }
    fn position(&self) -> LonLat {
        self.position
    }
    fn timestamp(&self) -> Option<Millis> {
        self.updated_at.as_deref().and_then(parse_timestamp)
    }
}

/// Polygonal conflict area, rendered from GeoJSON. Picks carry only `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictZone {
    pub id: String,
    pub name: String,
    /// Outer ring first, then holes.
    pub rings: Vec<Vec<LonLat>>,
    #[serde(default)]
    pub intensity: Severity,
}

impl DomainRecord for ConflictZone {
    fn id(&self) -> &str {
        &self.id
    }
    fn position(&self) -> LonLat {
        self.rings
            .first()
            .map(|ring| centroid(ring))
            .unwrap_or_default()
    }
}

/// Fixed installation (military base, nuclear facility).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    pub name: String,
    pub position: LonLat,
    #[serde(default)]
    pub operator: Option<String>,
}

impl DomainRecord for Site {
    fn id(&self) -> &str {
        &self.id
    }
    fn position(&self) -> LonLat {
        self.position
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: String,
    pub name: String,
    pub path: Vec<LonLat>,
    #[serde(default)]
    pub operational: bool,
}

impl DomainRecord for Pipeline {
    fn id(&self) -> &str {
        &self.id
    }
    fn position(&self) -> LonLat {
        self.path.first().copied().unwrap_or_default()
    }
}

/// Precomputed country outline used to resolve bare-map clicks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryShape {
    pub code: String,
    pub name: String,
    /// Multi-polygon: each polygon is outer ring first, then holes.
    pub polygons: Vec<Vec<Vec<LonLat>>>,
}

fn centroid(ring: &[LonLat]) -> LonLat {
    let pts: Vec<&LonLat> = ring.iter().filter(|p| p.is_finite()).collect();
    if pts.is_empty() {
        return LonLat::default();
    }
    let n = pts.len() as f64;
    let (sx, sy) = pts
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.lon, sy + p.lat));
    LonLat::new(sx / n, sy / n)
}

#[cfg(test)]
mod tests {
    use super::{
        Cluster, ConflictZone, DomainRecord, MilitaryFlight, MilitaryFlightCluster, NewsLocation,
        Severity,
    };
    use foundation::bounds::LonLat;
    use foundation::time::Millis;

    fn flight(id: &str) -> MilitaryFlight {
        MilitaryFlight {
            id: id.to_string(),
            callsign: id.to_uppercase(),
            position: LonLat::new(0.0, 0.0),
            heading_deg: 0.0,
            last_seen: Some(Millis(0)),
        }
    }

    #[test]
    fn cluster_count_follows_members() {
        let c = MilitaryFlightCluster::new(
            "c",
            "Group",
            LonLat::default(),
            vec![flight("a"), flight("b")],
        );
        assert_eq!(c.flight_count, 2);
        let trimmed = c.with_members(vec![flight("a")]);
        assert_eq!(trimmed.flight_count, 1);
        assert_eq!(trimmed.members().len(), 1);
        assert_eq!(trimmed.id, "c");
    }

    #[test]
    fn unparsable_pub_date_has_no_timestamp() {
        let n = NewsLocation {
            id: "n".into(),
            title: "t".into(),
            position: LonLat::default(),
            pub_date: Some("not a date".into()),
            is_breaking: false,
            threat: Severity::Low,
        };
        assert_eq!(n.timestamp(), None);
    }

    #[test]
    fn news_decodes_from_feed_json() {
        let n: NewsLocation = serde_json::from_str(
            r#"{"id":"n1","title":"Strike","position":{"lon":1.0,"lat":2.0},
                "pubDate":"1970-01-01T00:00:05Z","isBreaking":true,"threat":"high"}"#,
        )
        .expect("decode");
        assert!(n.is_breaking);
        assert_eq!(n.threat, Severity::High);
        assert_eq!(n.timestamp(), Some(Millis(5_000)));
    }

    #[test]
    fn conflict_zone_anchor_is_ring_centroid() {
        let z = ConflictZone {
            id: "z".into(),
            name: "Zone".into(),
            rings: vec![vec![
                LonLat::new(0.0, 0.0),
                LonLat::new(2.0, 0.0),
                LonLat::new(2.0, 2.0),
                LonLat::new(0.0, 2.0),
            ]],
            intensity: Severity::High,
        };
        assert_eq!(z.position(), LonLat::new(1.0, 1.0));
    }
}

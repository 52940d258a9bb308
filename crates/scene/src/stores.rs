use crate::collection::DomainCollection;
use crate::records::{
    ConflictZone, CyberThreat, Earthquake, Fire, Hotspot, MilitaryFlight, MilitaryFlightCluster,
    NaturalEvent, NewsLocation, Outage, Pipeline, Protest, Site, Vessel,
};

/// Retained per-domain data the layers are composed from.
///
/// Owned by the engine; producers replace collections wholesale through the
/// engine's setters.
#[derive(Debug, Clone)]
pub struct DataStores {
    pub conflict_zones: DomainCollection<ConflictZone>,
    pub pipelines: DomainCollection<Pipeline>,
    pub bases: DomainCollection<Site>,
    pub nuclear: DomainCollection<Site>,
    pub hotspots: DomainCollection<Hotspot>,
    pub outages: DomainCollection<Outage>,
    pub cyber_threats: DomainCollection<CyberThreat>,
    pub fires: DomainCollection<Fire>,
    pub natural_events: DomainCollection<NaturalEvent>,
    pub earthquakes: DomainCollection<Earthquake>,
    pub protests: DomainCollection<Protest>,
    pub military_flights: DomainCollection<MilitaryFlight>,
    pub military_flight_clusters: DomainCollection<MilitaryFlightCluster>,
    pub vessels: DomainCollection<Vessel>,
    pub news_locations: DomainCollection<NewsLocation>,
}

impl Default for DataStores {
    fn default() -> Self {
        Self {
            conflict_zones: DomainCollection::new("conflict_zones"),
            pipelines: DomainCollection::new("pipelines"),
            bases: DomainCollection::new("bases"),
            nuclear: DomainCollection::new("nuclear"),
            hotspots: DomainCollection::new("hotspots"),
            outages: DomainCollection::new("outages"),
            cyber_threats: DomainCollection::new("cyber_threats"),
            fires: DomainCollection::new("fires"),
            natural_events: DomainCollection::new("natural_events"),
            earthquakes: DomainCollection::new("earthquakes"),
            protests: DomainCollection::new("protests"),
            military_flights: DomainCollection::new("military_flights"),
            military_flight_clusters: DomainCollection::new("military_flight_clusters"),
            vessels: DomainCollection::new("vessels"),
            news_locations: DomainCollection::new("news_locations"),
        }
    }
}

impl DataStores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total records across every collection (clusters count once).
    pub fn total_records(&self) -> usize {
        self.conflict_zones.len()
            + self.pipelines.len()
            + self.bases.len()
            + self.nuclear.len()
            + self.hotspots.len()
            + self.outages.len()
            + self.cyber_threats.len()
            + self.fires.len()
            + self.natural_events.len()
            + self.earthquakes.len()
            + self.protests.len()
            + self.military_flights.len()
            + self.military_flight_clusters.len()
            + self.vessels.len()
            + self.news_locations.len()
    }
}

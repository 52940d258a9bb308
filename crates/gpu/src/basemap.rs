use std::collections::{BTreeMap, BTreeSet};

use foundation::bounds::{GeoBounds, LonLat};

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Feature returned by a rendered-feature query on the base map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderedFeature {
    pub layer_id: String,
    pub properties: BTreeMap<String, String>,
}

impl RenderedFeature {
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Notifications the base map forwards to the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MapEvent {
    MoveStart,
    Move,
    MoveEnd,
    Zoom,
    ZoomEnd,
    ContextLost,
    ContextRestored,
}

/// Tile base map underneath the overlay layers.
pub trait BaseMap {
    fn zoom(&self) -> f64;
    fn bounds(&self) -> GeoBounds;
    fn project(&self, at: LonLat) -> ScreenPoint;
    /// Features drawn at `point`, restricted to `layer_ids`.
    fn query_rendered_features(&self, point: ScreenPoint, layer_ids: &[&str])
    -> Vec<RenderedFeature>;
    fn is_layer_loaded(&self, layer_id: &str) -> bool;
}

/// Fixed-viewport base map with an equirectangular projection.
#[derive(Debug, Clone)]
pub struct StaticBaseMap {
    pub zoom: f64,
    pub bounds: GeoBounds,
    pub width_px: f64,
    pub height_px: f64,
    pub features: Vec<RenderedFeature>,
    pub loaded_layers: BTreeSet<String>,
}

impl StaticBaseMap {
    pub fn new(zoom: f64) -> Self {
        Self {
            zoom,
            bounds: GeoBounds::world(),
            width_px: 1024.0,
            height_px: 512.0,
            features: Vec::new(),
            loaded_layers: BTreeSet::new(),
        }
    }

    /// Add a feature every query for `layer_id` returns, marking the layer
    /// loaded.
    pub fn with_feature(mut self, feature: RenderedFeature) -> Self {
        self.loaded_layers.insert(feature.layer_id.clone());
        self.features.push(feature);
        self
    }
}

impl BaseMap for StaticBaseMap {
    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    fn project(&self, at: LonLat) -> ScreenPoint {
        let b = self.bounds;
        let w = (b.east - b.west).max(f64::EPSILON);
        let h = (b.north - b.south).max(f64::EPSILON);
        ScreenPoint::new(
            (at.lon - b.west) / w * self.width_px,
            (b.north - at.lat) / h * self.height_px,
        )
    }

    fn query_rendered_features(
        &self,
        _point: ScreenPoint,
        layer_ids: &[&str],
    ) -> Vec<RenderedFeature> {
        self.features
            .iter()
            .filter(|f| layer_ids.contains(&f.layer_id.as_str()))
            .cloned()
            .collect()
    }

    fn is_layer_loaded(&self, layer_id: &str) -> bool {
        self.loaded_layers.contains(layer_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{BaseMap, RenderedFeature, ScreenPoint, StaticBaseMap};
    use foundation::bounds::LonLat;
    use pretty_assertions::assert_eq;

    #[test]
    fn projects_world_corners() {
        let map = StaticBaseMap::new(2.0);
        assert_eq!(map.project(LonLat::new(-180.0, 90.0)), ScreenPoint::new(0.0, 0.0));
        assert_eq!(
            map.project(LonLat::new(180.0, -90.0)),
            ScreenPoint::new(1024.0, 512.0)
        );
    }

    #[test]
    fn queries_filter_by_layer() {
        let map = StaticBaseMap::new(2.0).with_feature(RenderedFeature {
            layer_id: "country-boundaries".into(),
            properties: [("iso_a2".to_string(), "FR".to_string())].into_iter().collect(),
        });
        assert!(map.is_layer_loaded("country-boundaries"));
        assert!(!map.is_layer_loaded("roads"));
        let hits = map.query_rendered_features(ScreenPoint::default(), &["country-boundaries"]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].property("iso_a2"), Some("FR"));
        assert!(map.query_rendered_features(ScreenPoint::default(), &["roads"]).is_empty());
    }
}

use serde::{Deserialize, Serialize};

/// Geographic position in degrees.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// Lon/lat axis-aligned box (no antimeridian wrapping).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBounds {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// Bounds of a point set, `None` when empty or when no point is finite.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LonLat>) -> Option<Self> {
        let mut out: Option<Self> = None;
        for p in points.into_iter().filter(|p| p.is_finite()) {
            out = Some(match out {
                None => Self::new(p.lon, p.lat, p.lon, p.lat),
                Some(b) => Self::new(
                    b.west.min(p.lon),
                    b.south.min(p.lat),
                    b.east.max(p.lon),
                    b.north.max(p.lat),
                ),
            });
        }
        out
    }

    pub fn contains(&self, p: LonLat) -> bool {
        p.lon >= self.west && p.lon <= self.east && p.lat >= self.south && p.lat <= self.north
    }
}

/// Even-odd ray casting test against a single ring.
///
/// Rings may be open or closed; a closing duplicate vertex is harmless.
pub fn point_in_ring(p: LonLat, ring: &[LonLat]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[j];
        if (a.lat > p.lat) != (b.lat > p.lat) {
            let x = (b.lon - a.lon) * (p.lat - a.lat) / (b.lat - a.lat) + a.lon;
            if p.lon < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Polygon test: inside the outer ring (first) and outside every hole.
pub fn point_in_polygon(p: LonLat, rings: &[Vec<LonLat>]) -> bool {
    let Some((outer, holes)) = rings.split_first() else {
        return false;
    };
    point_in_ring(p, outer) && !holes.iter().any(|h| point_in_ring(p, h))
}

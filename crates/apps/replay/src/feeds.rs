//! Deterministic synthetic feeds.
//!
//! Positions walk a golden-angle spiral over the globe so every run with the
//! same parameters produces the same records.

use foundation::bounds::LonLat;
use foundation::time::{MINUTE_MS, Millis};
use scene::records::{
    ConflictZone, CountryShape, Fire, Hotspot, MilitaryFlight, MilitaryFlightCluster,
    NewsLocation, Pipeline, Severity, Site, Vessel,
};

const GOLDEN_ANGLE_DEG: f64 = 137.507_764;

fn spiral(i: usize, n: usize) -> LonLat {
    let n = n.max(1) as f64;
    let t = (i as f64 + 0.5) / n;
    let lat = (1.0 - 2.0 * t).asin().to_degrees();
    let lon = (i as f64 * GOLDEN_ANGLE_DEG).rem_euclid(360.0) - 180.0;
    LonLat::new(lon, lat)
}

fn severity(i: usize) -> Severity {
    match i % 4 {
        0 => Severity::Low,
        1 => Severity::Medium,
        2 => Severity::High,
        _ => Severity::Critical,
    }
}

fn square(center: LonLat, half: f64) -> Vec<LonLat> {
    vec![
        LonLat::new(center.lon - half, center.lat - half),
        LonLat::new(center.lon + half, center.lat - half),
        LonLat::new(center.lon + half, center.lat + half),
        LonLat::new(center.lon - half, center.lat + half),
        LonLat::new(center.lon - half, center.lat - half),
    ]
}

/// Fires detected over the last `spread_minutes`, newest first.
pub fn fires(n: usize, now: Millis, spread_minutes: i64) -> Vec<Fire> {
    (0..n)
        .map(|i| {
            let age = (i as i64 * spread_minutes * MINUTE_MS) / n.max(1) as i64;
            Fire {
                id: format!("fire-{i}"),
                position: spiral(i, n),
                brightness: 300.0 + (i % 50) as f32,
                detected_at: Some(now.saturating_sub_ms(age)),
            }
        })
        .collect()
}

pub fn bases(n: usize) -> Vec<Site> {
    (0..n)
        .map(|i| Site {
            id: format!("base-{i}"),
            name: format!("Base {i}"),
            position: spiral(i * 7 + 3, n * 7 + 3),
            operator: Some(["USAF", "RAF", "FAF"][i % 3].to_string()),
        })
        .collect()
}

pub fn conflict_zones(n: usize) -> Vec<ConflictZone> {
    (0..n)
        .map(|i| ConflictZone {
            id: format!("zone-{i}"),
            name: format!("Zone {i}"),
            rings: vec![square(spiral(i * 3, n * 3), 1.5)],
            intensity: severity(i),
        })
        .collect()
}

pub fn pipelines(n: usize) -> Vec<Pipeline> {
    (0..n)
        .map(|i| {
            let a = spiral(i * 5, n * 5);
            let b = LonLat::new(a.lon + 4.0, a.lat + 1.0);
            Pipeline {
                id: format!("pipeline-{i}"),
                name: format!("Pipeline {i}"),
                path: vec![a, b],
                operational: i % 5 != 0,
            }
        })
        .collect()
}

pub fn hotspots(n: usize, breaking_every: usize) -> Vec<Hotspot> {
    (0..n)
        .map(|i| Hotspot {
            id: format!("hotspot-{i}"),
            name: format!("Hotspot {i}"),
            position: spiral(i * 11 + 1, n * 11 + 1),
            escalation_score: (i % 6) as f32,
            has_breaking: breaking_every > 0 && i % breaking_every == 0,
            updated_at: None,
        })
        .collect()
}

/// News items; the first `recent` are stamped `now`, the rest a day old.
pub fn news(n: usize, recent: usize, now: Millis) -> Vec<NewsLocation> {
    (0..n)
        .map(|i| {
            let at = if i < recent {
                now
            } else {
                now.saturating_sub_ms(24 * 60 * MINUTE_MS)
            };
            NewsLocation {
                id: format!("news-{i}"),
                title: format!("Story {i}"),
                position: spiral(i * 13 + 2, n * 13 + 2),
                pub_date: Some(at.0.to_string()),
                is_breaking: false,
                threat: severity(i),
            }
        })
        .collect()
}

pub fn flights(n: usize, now: Millis) -> (Vec<MilitaryFlight>, Vec<MilitaryFlightCluster>) {
    let flights: Vec<MilitaryFlight> = (0..n)
        .map(|i| MilitaryFlight {
            id: format!("flight-{i}"),
            callsign: format!("RCH{:03}", i),
            position: spiral(i * 17 + 5, n * 17 + 5),
            heading_deg: (i * 37 % 360) as f32,
            last_seen: Some(now.saturating_sub_ms(i as i64 * MINUTE_MS)),
        })
        .collect();
    let clusters = flights
        .chunks(4)
        .enumerate()
        .map(|(i, members)| {
            let anchor = members.first().map(|f| f.position).unwrap_or_default();
            MilitaryFlightCluster::new(
                format!("cluster-{i}"),
                format!("Package {i}"),
                anchor,
                members.to_vec(),
            )
        })
        .collect();
    (flights, clusters)
}

pub fn vessels(n: usize, now: Millis) -> Vec<Vessel> {
    (0..n)
        .map(|i| Vessel {
            id: format!("vessel-{i}"),
            name: format!("MV {i}"),
            position: spiral(i * 19 + 7, n * 19 + 7),
            vessel_type: ["tanker", "cargo", "naval"][i % 3].to_string(),
            last_seen: Some(now.saturating_sub_ms(i as i64 * 5 * MINUTE_MS)),
        })
        .collect()
}

/// Coarse rectangular "countries" tiling the globe in 30 degree cells.
pub fn countries() -> Vec<CountryShape> {
    let mut out = Vec::new();
    for (row, south) in (-90..90).step_by(30).enumerate() {
        for (col, west) in (-180..180).step_by(30).enumerate() {
            let (w, s) = (west as f64, south as f64);
            out.push(CountryShape {
                code: format!("C{row}{col:02}"),
                name: format!("Cell {row}/{col}"),
                polygons: vec![vec![vec![
                    LonLat::new(w, s),
                    LonLat::new(w + 30.0, s),
                    LonLat::new(w + 30.0, s + 30.0),
                    LonLat::new(w, s + 30.0),
                    LonLat::new(w, s),
                ]]],
            });
        }
    }
    out
}

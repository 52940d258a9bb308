use std::collections::BTreeMap;

use foundation::bounds::LonLat;
use foundation::time::TimeRange;
use serde::{Deserialize, Serialize};

/// User-facing layer toggle. One key may drive several render layers
/// (visible + ghost + pulse).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKey {
    Conflicts,
    Pipelines,
    Bases,
    Nuclear,
    Hotspots,
    Outages,
    Cyber,
    Fires,
    Natural,
    Protests,
    Flights,
    Vessels,
    News,
}

impl LayerKey {
    pub const ALL: [LayerKey; 13] = [
        LayerKey::Conflicts,
        LayerKey::Pipelines,
        LayerKey::Bases,
        LayerKey::Nuclear,
        LayerKey::Hotspots,
        LayerKey::Outages,
        LayerKey::Cyber,
        LayerKey::Fires,
        LayerKey::Natural,
        LayerKey::Protests,
        LayerKey::Flights,
        LayerKey::Vessels,
        LayerKey::News,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LayerKey::Conflicts => "conflicts",
            LayerKey::Pipelines => "pipelines",
            LayerKey::Bases => "bases",
            LayerKey::Nuclear => "nuclear",
            LayerKey::Hotspots => "hotspots",
            LayerKey::Outages => "outages",
            LayerKey::Cyber => "cyber",
            LayerKey::Fires => "fires",
            LayerKey::Natural => "natural",
            LayerKey::Protests => "protests",
            LayerKey::Flights => "flights",
            LayerKey::Vessels => "vessels",
            LayerKey::News => "news",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        LayerKey::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewPreset {
    #[default]
    Global,
    America,
    Mena,
    Eu,
    Asia,
    Latam,
    Africa,
    Oceania,
}

impl ViewPreset {
    pub const ALL: [ViewPreset; 8] = [
        ViewPreset::Global,
        ViewPreset::America,
        ViewPreset::Mena,
        ViewPreset::Eu,
        ViewPreset::Asia,
        ViewPreset::Latam,
        ViewPreset::Africa,
        ViewPreset::Oceania,
    ];

    pub fn center(self) -> LonLat {
        match self {
            ViewPreset::Global => LonLat::new(0.0, 20.0),
            ViewPreset::America => LonLat::new(-95.0, 38.0),
            ViewPreset::Mena => LonLat::new(45.0, 28.0),
            ViewPreset::Eu => LonLat::new(15.0, 50.0),
            ViewPreset::Asia => LonLat::new(105.0, 30.0),
            ViewPreset::Latam => LonLat::new(-60.0, -15.0),
            ViewPreset::Africa => LonLat::new(20.0, 5.0),
            ViewPreset::Oceania => LonLat::new(140.0, -25.0),
        }
    }

    pub fn zoom(self) -> f64 {
        match self {
            ViewPreset::Global => 1.5,
            ViewPreset::Mena | ViewPreset::Eu => 3.5,
            _ => 3.0,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pan {
    pub x: f64,
    pub y: f64,
}

/// Single mutable UI state the layers are composed against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationViewState {
    pub zoom: f64,
    pub pan: Pan,
    pub view: ViewPreset,
    pub layers: BTreeMap<LayerKey, bool>,
    pub time_range: TimeRange,
}

impl Default for ApplicationViewState {
    fn default() -> Self {
        let enabled = [
            LayerKey::Conflicts,
            LayerKey::Hotspots,
            LayerKey::Outages,
            LayerKey::Natural,
            LayerKey::News,
        ];
        Self {
            zoom: ViewPreset::Global.zoom(),
            pan: Pan::default(),
            view: ViewPreset::Global,
            layers: LayerKey::ALL
                .into_iter()
                .map(|k| (k, enabled.contains(&k)))
                .collect(),
            time_range: TimeRange::default(),
        }
    }
}

impl ApplicationViewState {
    /// Missing keys read as disabled.
    pub fn is_enabled(&self, key: LayerKey) -> bool {
        self.layers.get(&key).copied().unwrap_or(false)
    }

    /// Returns `true` if the flag changed.
    pub fn set_enabled(&mut self, key: LayerKey, enabled: bool) -> bool {
        self.layers.insert(key, enabled) != Some(enabled)
    }
}

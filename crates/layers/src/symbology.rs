use scene::records::Severity;
use serde::{Deserialize, Serialize};

use crate::layer::Rgba;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// Colours for every layer under one theme.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Palette {
    pub theme: Theme,
    pub conflict_fill: Rgba,
    pub conflict_stroke: Rgba,
    pub pipeline: Rgba,
    pub pipeline_offline: Rgba,
    pub base: Rgba,
    pub nuclear: Rgba,
    pub hotspot: Rgba,
    pub hotspot_hot: Rgba,
    pub outage: Rgba,
    pub cyber: Rgba,
    pub fire: Rgba,
    pub natural: Rgba,
    pub earthquake: Rgba,
    pub protest: Rgba,
    pub flight: Rgba,
    pub flight_cluster: Rgba,
    pub vessel: Rgba,
    pub news: Rgba,
    pub news_breaking: Rgba,
    pub highlight: Rgba,
    pub pulse: Rgba,
    pub severity: [Rgba; 4],
}

impl Palette {
    pub fn severity(&self, s: Severity) -> Rgba {
        match s {
            Severity::Low => self.severity[0],
            Severity::Medium => self.severity[1],
            Severity::High => self.severity[2],
            Severity::Critical => self.severity[3],
        }
    }
}

/// Pure theme → palette mapping; the same theme always yields the same
/// colours.
pub fn colors_for(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            theme,
            conflict_fill: [255, 0, 0, 40],
            conflict_stroke: [255, 0, 0, 160],
            pipeline: [0, 200, 255, 200],
            pipeline_offline: [120, 120, 120, 160],
            base: [0, 160, 255, 220],
            nuclear: [255, 220, 0, 230],
            hotspot: [255, 160, 0, 220],
            hotspot_hot: [255, 40, 40, 240],
            outage: [255, 80, 200, 220],
            cyber: [0, 255, 170, 220],
            fire: [255, 100, 0, 200],
            natural: [120, 200, 80, 220],
            earthquake: [200, 120, 40, 220],
            protest: [255, 200, 60, 220],
            flight: [180, 220, 255, 230],
            flight_cluster: [120, 170, 255, 230],
            vessel: [80, 200, 220, 230],
            news: [230, 230, 230, 220],
            news_breaking: [255, 60, 60, 255],
            highlight: [255, 255, 255, 255],
            pulse: [255, 60, 60, 180],
            severity: [
                [120, 200, 120, 220],
                [255, 200, 0, 220],
                [255, 120, 0, 230],
                [255, 30, 30, 240],
            ],
        },
        Theme::Light => Palette {
            theme,
            conflict_fill: [200, 0, 0, 50],
            conflict_stroke: [170, 0, 0, 190],
            pipeline: [0, 120, 180, 220],
            pipeline_offline: [150, 150, 150, 180],
            base: [0, 90, 200, 230],
            nuclear: [190, 140, 0, 240],
            hotspot: [220, 120, 0, 230],
            hotspot_hot: [200, 20, 20, 250],
            outage: [190, 30, 150, 230],
            cyber: [0, 150, 100, 230],
            fire: [220, 70, 0, 220],
            natural: [60, 140, 40, 230],
            earthquake: [150, 80, 20, 230],
            protest: [200, 140, 0, 230],
            flight: [40, 80, 160, 240],
            flight_cluster: [20, 60, 200, 240],
            vessel: [0, 120, 140, 240],
            news: [60, 60, 60, 230],
            news_breaking: [210, 20, 20, 255],
            highlight: [20, 20, 20, 255],
            pulse: [210, 20, 20, 170],
            severity: [
                [60, 150, 60, 230],
                [200, 150, 0, 230],
                [220, 90, 0, 240],
                [200, 0, 0, 250],
            ],
        },
    }
}

/// Multiply an RGBA colour's alpha by `factor` (clamped to 0..=1).
pub fn fade(c: Rgba, factor: f32) -> Rgba {
    let a = (c[3] as f32 * factor.clamp(0.0, 1.0)).round() as u8;
    [c[0], c[1], c[2], a]
}

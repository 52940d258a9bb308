use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use foundation::time::{MINUTE_MS, SECOND_MS};
use layers::VisibilityPolicy;
use runtime::scheduler::SchedulerConfig;
use scene::tier::DeviceTier;
use scene::view_state::LayerKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Timing and caps for one device tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierProfile {
    pub debounce_ms: i64,
    pub min_frame_interval_ms: Option<i64>,
    pub item_caps: BTreeMap<LayerKey, usize>,
}

impl Default for TierProfile {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            min_frame_interval_ms: None,
            item_caps: BTreeMap::new(),
        }
    }
}

impl TierProfile {
    pub fn lite() -> Self {
        Self {
            debounce_ms: 250,
            min_frame_interval_ms: Some(33),
            item_caps: [
                (LayerKey::Fires, 100),
                (LayerKey::Flights, 150),
                (LayerKey::Vessels, 150),
                (LayerKey::News, 100),
                (LayerKey::Outages, 100),
                (LayerKey::Protests, 100),
                (LayerKey::Cyber, 100),
            ]
            .into_iter()
            .collect(),
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            debounce_ms: self.debounce_ms,
            min_frame_interval_ms: self.min_frame_interval_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Grace period after engine start before pulsing may begin.
    pub warmup_ms: i64,
    pub interval_ms: i64,
    /// Items seen within this window qualify for pulsing.
    pub recency_window_ms: i64,
    /// Oscillation period of the shared pulse phase.
    pub period_ms: i64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            warmup_ms: 10 * SECOND_MS,
            interval_ms: 500,
            recency_window_ms: 30 * MINUTE_MS,
            period_ms: 1_500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub frame_budget_ms: i64,
    pub full: TierProfile,
    pub lite: TierProfile,
    pub pulse: PulseConfig,
    pub zoom_thresholds: BTreeMap<LayerKey, f64>,
    /// Layers allowed on the lite tier. Anything not listed is disallowed.
    pub lite_allow_list: Vec<LayerKey>,
    pub flash_duration_ms: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_budget_ms: 16,
            full: TierProfile::default(),
            lite: TierProfile::lite(),
            pulse: PulseConfig::default(),
            zoom_thresholds: [
                (LayerKey::Bases, 3.0),
                (LayerKey::Nuclear, 3.0),
                (LayerKey::Pipelines, 2.0),
            ]
            .into_iter()
            .collect(),
            lite_allow_list: vec![
                LayerKey::Conflicts,
                LayerKey::Hotspots,
                LayerKey::Outages,
                LayerKey::Cyber,
                LayerKey::Fires,
                LayerKey::Natural,
                LayerKey::Protests,
                LayerKey::Flights,
                LayerKey::Vessels,
                LayerKey::News,
            ],
            flash_duration_ms: 3 * SECOND_MS,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        info!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn non_negative(field: &'static str, v: i64) -> Result<(), ConfigError> {
            if v < 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be >= 0, got {v}"),
                });
            }
            Ok(())
        }
        fn positive(field: &'static str, v: i64) -> Result<(), ConfigError> {
            if v <= 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be > 0, got {v}"),
                });
            }
            Ok(())
        }

        non_negative("frame_budget_ms", self.frame_budget_ms)?;
        non_negative("full.debounce_ms", self.full.debounce_ms)?;
        non_negative("lite.debounce_ms", self.lite.debounce_ms)?;
        non_negative("pulse.warmup_ms", self.pulse.warmup_ms)?;
        non_negative("pulse.recency_window_ms", self.pulse.recency_window_ms)?;
        non_negative("flash_duration_ms", self.flash_duration_ms)?;
        positive("pulse.interval_ms", self.pulse.interval_ms)?;
        positive("pulse.period_ms", self.pulse.period_ms)?;
        if let Some((key, z)) = self.zoom_thresholds.iter().find(|(_, z)| !z.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "zoom_thresholds",
                reason: format!("{} has non-finite min zoom {z}", key.as_str()),
            });
        }
        Ok(())
    }

    /// `Static` renders no GPU layers; it borrows the lite timings.
    pub fn profile(&self, tier: DeviceTier) -> &TierProfile {
        match tier {
            DeviceTier::Full => &self.full,
            DeviceTier::Lite | DeviceTier::Static => &self.lite,
        }
    }

    pub fn visibility_policy(&self) -> VisibilityPolicy {
        VisibilityPolicy::new(
            self.zoom_thresholds.iter().map(|(k, z)| (*k, *z)),
            self.lite_allow_list.iter().copied(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EngineConfig};
    use pretty_assertions::assert_eq;
    use scene::tier::DeviceTier;
    use scene::view_state::LayerKey;

    #[test]
    fn defaults_match_documented_values() {
        let c = EngineConfig::default();
        assert_eq!(c.frame_budget_ms, 16);
        assert_eq!(c.full.debounce_ms, 100);
        assert_eq!(c.full.min_frame_interval_ms, None);
        assert_eq!(c.lite.debounce_ms, 250);
        assert_eq!(c.lite.min_frame_interval_ms, Some(33));
        assert_eq!(c.lite.item_caps.get(&LayerKey::Fires), Some(&100));
        assert_eq!(c.zoom_thresholds.get(&LayerKey::Bases), Some(&3.0));
        assert_eq!(c.pulse.interval_ms, 500);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = EngineConfig::from_json_str(
            r#"{ "frame_budget_ms": 8, "lite": { "item_caps": { "fires": 10 } } }"#,
        )
        .unwrap();
        assert_eq!(c.frame_budget_ms, 8);
        assert_eq!(c.lite.item_caps.get(&LayerKey::Fires), Some(&10));
        // Nested struct defaults come from TierProfile::default, not lite().
        assert_eq!(c.lite.debounce_ms, 100);
        assert_eq!(c.pulse, EngineConfig::default().pulse);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "pulse": { "interval_ms": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "pulse.interval_ms", .. }));

        let err = EngineConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = EngineConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn static_tier_uses_lite_profile() {
        let c = EngineConfig::default();
        assert_eq!(c.profile(DeviceTier::Static), &c.lite);
        assert!(!c.visibility_policy().allows_on_lite(LayerKey::Bases));
        assert!(c.visibility_policy().allows_on_lite(LayerKey::Fires));
    }
}

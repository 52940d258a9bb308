use serde::{Deserialize, Serialize};

/// Externally computed device capability class.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceTier {
    #[default]
    Full,
    /// Constrained GPU/CPU: allow-listed layers only, item caps, 30 fps.
    Lite,
    /// No GPU layers; a lighter renderer outside this engine takes over.
    Static,
}

impl DeviceTier {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceTier::Full => "full",
            DeviceTier::Lite => "lite",
            DeviceTier::Static => "static",
        }
    }
}

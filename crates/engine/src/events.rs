use scene::view_state::LayerKey;
use serde::Serialize;

use crate::pick::{CountryClick, PopupRequest};

/// Everything the engine reports to the host application.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    Popup(PopupRequest),
    CountryClicked(CountryClick),
    /// GPU context lost (`active: true`) or recovered.
    DegradedMode { active: bool },
    LayersRendered { count: usize },
    LayerToggled { key: LayerKey, enabled: bool },
}

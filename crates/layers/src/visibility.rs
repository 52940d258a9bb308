use std::collections::{BTreeMap, BTreeSet};

use scene::tier::DeviceTier;
use scene::view_state::{ApplicationViewState, LayerKey};

/// Decides whether a layer exists at all in a composition pass.
///
/// Three gates, all of which must pass:
/// 1. the user's feature flag for the layer,
/// 2. the registered minimum zoom, if any,
/// 3. the device tier: `Lite` renders allow-listed layers only and `Static`
///    renders no GPU layers.
///
/// A layer failing any gate is absent from the output, not drawn empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisibilityPolicy {
    min_zoom: BTreeMap<LayerKey, f64>,
    lite_allow_list: BTreeSet<LayerKey>,
}

impl VisibilityPolicy {
    pub fn new(
        min_zoom: impl IntoIterator<Item = (LayerKey, f64)>,
        lite_allow_list: impl IntoIterator<Item = LayerKey>,
    ) -> Self {
        Self {
            min_zoom: min_zoom.into_iter().collect(),
            lite_allow_list: lite_allow_list.into_iter().collect(),
        }
    }

    pub fn min_zoom(&self, key: LayerKey) -> Option<f64> {
        self.min_zoom.get(&key).copied()
    }

    pub fn set_min_zoom(&mut self, key: LayerKey, min_zoom: Option<f64>) {
        match min_zoom {
            Some(z) => {
                self.min_zoom.insert(key, z);
            }
            None => {
                self.min_zoom.remove(&key);
            }
        }
    }

    /// Layers not on the list are disallowed on `Lite`.
    pub fn allows_on_lite(&self, key: LayerKey) -> bool {
        self.lite_allow_list.contains(&key)
    }

    pub fn tier_allows(&self, key: LayerKey, tier: DeviceTier) -> bool {
        match tier {
            DeviceTier::Full => true,
            DeviceTier::Lite => self.allows_on_lite(key),
            DeviceTier::Static => false,
        }
    }

    pub fn is_visible(
        &self,
        key: LayerKey,
        state: &ApplicationViewState,
        zoom: f64,
        tier: DeviceTier,
    ) -> bool {
        if !state.is_enabled(key) {
            return false;
        }
        if let Some(min) = self.min_zoom(key)
            && !(zoom >= min)
        {
            return false;
        }
        self.tier_allows(key, tier)
    }
}

#[cfg(test)]
mod tests {
    use super::VisibilityPolicy;
    use scene::tier::DeviceTier;
    use scene::view_state::{ApplicationViewState, LayerKey};

    fn policy() -> VisibilityPolicy {
        VisibilityPolicy::new(
            [(LayerKey::Bases, 3.0)],
            [LayerKey::Conflicts, LayerKey::Fires],
        )
    }

    fn state_with(key: LayerKey) -> ApplicationViewState {
        let mut s = ApplicationViewState::default();
        s.set_enabled(key, true);
        s
    }

    #[test]
    fn disabled_flag_hides_layer() {
        let mut s = ApplicationViewState::default();
        s.set_enabled(LayerKey::Fires, false);
        assert!(!policy().is_visible(LayerKey::Fires, &s, 10.0, DeviceTier::Full));
    }

    #[test]
    fn below_min_zoom_hides_layer() {
        let s = state_with(LayerKey::Bases);
        let p = policy();
        assert!(!p.is_visible(LayerKey::Bases, &s, 2.0, DeviceTier::Full));
        assert!(p.is_visible(LayerKey::Bases, &s, 3.0, DeviceTier::Full));
    }

    #[test]
    fn nan_zoom_fails_threshold() {
        let s = state_with(LayerKey::Bases);
        assert!(!policy().is_visible(LayerKey::Bases, &s, f64::NAN, DeviceTier::Full));
    }

    #[test]
    fn lite_tier_uses_allow_list() {
        let s = state_with(LayerKey::Fires);
        let p = policy();
        assert!(p.is_visible(LayerKey::Fires, &s, 1.0, DeviceTier::Lite));

        let s = state_with(LayerKey::Vessels);
        assert!(p.is_visible(LayerKey::Vessels, &s, 1.0, DeviceTier::Full));
        assert!(!p.is_visible(LayerKey::Vessels, &s, 1.0, DeviceTier::Lite));
    }

    #[test]
    fn static_tier_renders_nothing() {
        let s = state_with(LayerKey::Conflicts);
        assert!(!policy().is_visible(LayerKey::Conflicts, &s, 10.0, DeviceTier::Static));
    }
}

//! Shared pulse clock math and the "is anything worth pulsing" check.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use foundation::time::Millis;
use scene::records::{DomainRecord, Hotspot, NewsLocation};
use scene::stores::DataStores;
use scene::tier::DeviceTier;
use scene::view_state::{ApplicationViewState, LayerKey};

use crate::time_filter::{cap_opt, filter_by_time};
use crate::visibility::VisibilityPolicy;

/// Oscillation phase in `[0, 1]` for the shared pulse clock.
///
/// Every pulsing feature derives its emphasis from this one value; there are
/// no per-item timers.
pub fn pulse_phase(pulse_time: Millis, period_ms: i64) -> f32 {
    if period_ms <= 0 {
        return 1.0;
    }
    let t = pulse_time.0.rem_euclid(period_ms) as f64 / period_ms as f64;
    (0.5 + 0.5 * (TAU * t).sin()) as f32
}

pub fn is_recent(ts: Option<Millis>, now: Millis, recency_ms: i64) -> bool {
    ts.is_some_and(|t| now.since(t) <= recency_ms)
}

pub fn news_qualifies(item: &NewsLocation, now: Millis, recency_ms: i64) -> bool {
    item.is_breaking || is_recent(item.timestamp(), now, recency_ms)
}

pub fn hotspot_qualifies(item: &Hotspot) -> bool {
    item.has_breaking
}

/// Inputs the pulse layers are composed against.
#[derive(Debug, Clone, Copy)]
pub struct PulseScope<'a> {
    pub state: &'a ApplicationViewState,
    pub stores: &'a DataStores,
    pub policy: &'a VisibilityPolicy,
    pub zoom: f64,
    pub tier: DeviceTier,
    pub caps: &'a BTreeMap<LayerKey, usize>,
    pub now: Millis,
    pub recency_ms: i64,
}

/// True while a pulse layer would draw at least one feature.
///
/// Applies the same visibility, time window and cap as the composition pass,
/// so the animation stops once nothing it drives is on screen.
pub fn has_pulse_candidates(scope: &PulseScope<'_>) -> bool {
    let visible = |key| {
        scope
            .policy
            .is_visible(key, scope.state, scope.zoom, scope.tier)
    };
    let news = visible(LayerKey::News) && {
        let windowed = filter_by_time(
            scope.stores.news_locations.items(),
            scope.state.time_range,
            scope.now,
            NewsLocation::timestamp,
        );
        cap_opt(&windowed, scope.caps.get(&LayerKey::News).copied())
            .iter()
            .any(|n| n.position.is_finite() && news_qualifies(n, scope.now, scope.recency_ms))
    };
    let hotspots = visible(LayerKey::Hotspots)
        && scope
            .stores
            .hotspots
            .items()
            .iter()
            .any(|h| h.position.is_finite() && hotspot_qualifies(h));
    news || hotspots
}

#[cfg(test)]
mod tests {
    use super::{PulseScope, has_pulse_candidates, is_recent, pulse_phase};
    use crate::visibility::VisibilityPolicy;
    use foundation::bounds::LonLat;
    use foundation::time::{HOUR_MS, MINUTE_MS, Millis, TimeRange};
    use pretty_assertions::assert_eq;
    use scene::records::{Hotspot, NewsLocation, Severity};
    use scene::stores::DataStores;
    use scene::tier::DeviceTier;
    use scene::view_state::{ApplicationViewState, LayerKey};
    use std::collections::BTreeMap;

    const NOW: Millis = Millis(1_700_000_000_000);

    fn news(id: &str, pub_date: Option<&str>, breaking: bool) -> NewsLocation {
        NewsLocation {
            id: id.into(),
            title: id.into(),
            position: LonLat::new(0.0, 0.0),
            pub_date: pub_date.map(str::to_string),
            is_breaking: breaking,
            threat: Severity::Low,
        }
    }

    fn hotspot(position: LonLat) -> Hotspot {
        Hotspot {
            id: "h1".into(),
            name: "Strait".into(),
            position,
            escalation_score: 3.0,
            has_breaking: true,
            updated_at: None,
        }
    }

    struct Fixture {
        state: ApplicationViewState,
        stores: DataStores,
        policy: VisibilityPolicy,
        tier: DeviceTier,
        caps: BTreeMap<LayerKey, usize>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                state: ApplicationViewState::default(),
                stores: DataStores::new(),
                policy: VisibilityPolicy::new([(LayerKey::Bases, 3.0)], [LayerKey::News]),
                tier: DeviceTier::Full,
                caps: BTreeMap::new(),
            }
        }

        fn candidates(&self) -> bool {
            has_pulse_candidates(&PulseScope {
                state: &self.state,
                stores: &self.stores,
                policy: &self.policy,
                zoom: 2.0,
                tier: self.tier,
                caps: &self.caps,
                now: NOW,
                recency_ms: 30 * MINUTE_MS,
            })
        }
    }

    #[test]
    fn phase_stays_in_unit_range() {
        for t in (0..3_000).step_by(37) {
            let p = pulse_phase(Millis(t), 1_500);
            assert!((0.0..=1.0).contains(&p), "{p} at {t}");
        }
        assert!((pulse_phase(Millis(0), 1_500) - 0.5).abs() < 1e-6);
        assert!((pulse_phase(Millis(375), 1_500) - 1.0).abs() < 1e-6);
        assert_eq!(pulse_phase(Millis(10), 0), 1.0);
    }

    #[test]
    fn recency_needs_a_timestamp() {
        let now = Millis(100 * MINUTE_MS);
        assert!(is_recent(Some(Millis(90 * MINUTE_MS)), now, 30 * MINUTE_MS));
        assert!(!is_recent(Some(Millis(10 * MINUTE_MS)), now, 30 * MINUTE_MS));
        assert!(!is_recent(None, now, 30 * MINUTE_MS));
    }

    #[test]
    fn candidates_follow_layer_flags() {
        let mut fx = Fixture::new();
        assert!(!fx.candidates());

        fx.stores
            .news_locations
            .replace(vec![news("n1", Some("not a date"), true)]);
        assert!(fx.candidates());

        fx.state.set_enabled(LayerKey::News, false);
        assert!(!fx.candidates());

        fx.stores.hotspots.replace(vec![hotspot(LonLat::new(56.0, 26.0))]);
        assert!(fx.candidates());
    }

    #[test]
    fn breaking_news_outside_the_window_does_not_pulse() {
        let mut fx = Fixture::new();
        fx.state.time_range = TimeRange::OneHour;
        let stale = (NOW.0 - 3 * HOUR_MS).to_string();
        fx.stores
            .news_locations
            .replace(vec![news("old", Some(&stale), true)]);
        assert!(!fx.candidates());

        fx.state.time_range = TimeRange::All;
        assert!(fx.candidates());
    }

    #[test]
    fn candidates_respect_tier_and_cap() {
        let mut fx = Fixture::new();
        fx.stores.news_locations.replace(vec![
            news("calm", None, false),
            news("hot", None, true),
        ]);
        assert!(fx.candidates());

        fx.caps.insert(LayerKey::News, 1);
        assert!(!fx.candidates());

        fx.caps.clear();
        fx.tier = DeviceTier::Static;
        assert!(!fx.candidates());

        // Hotspots are not on the lite allow-list here.
        fx.tier = DeviceTier::Lite;
        fx.state.set_enabled(LayerKey::News, false);
        fx.stores.hotspots.replace(vec![hotspot(LonLat::new(56.0, 26.0))]);
        assert!(!fx.candidates());
    }

    #[test]
    fn unplottable_hotspots_do_not_pulse() {
        let mut fx = Fixture::new();
        fx.state.set_enabled(LayerKey::News, false);
        fx.stores
            .hotspots
            .replace(vec![hotspot(LonLat::new(f64::NAN, 26.0))]);
        assert!(!fx.candidates());
    }
}

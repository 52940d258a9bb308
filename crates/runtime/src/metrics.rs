use serde::Serialize;

/// Running duration statistics (milliseconds).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DurationStats {
    pub count: u64,
    pub total_ms: i64,
    pub last_ms: i64,
    pub peak_ms: i64,
}

impl DurationStats {
    pub fn record(&mut self, ms: i64) {
        self.count += 1;
        self.total_ms += ms;
        self.last_ms = ms;
        self.peak_ms = self.peak_ms.max(ms);
    }

    pub fn mean_ms(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total_ms as f64 / self.count as f64)
    }
}

/// Counters for the render-update pipeline.
///
/// Plain fields rather than a string-keyed map: the set of things worth
/// counting is closed and a typo should be a compile error.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RenderMetrics {
    pub compositions: u64,
    pub full_compositions: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub budget_overruns: u64,
    pub skipped_frames: u64,
    pub suppressed_while_paused: u64,
    pub renderer_errors: u64,
    pub pulse_ticks: u64,
    pub context_losses: u64,
    pub composition_time: DurationStats,
}

impl RenderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn cache_hit_ratio(&self) -> Option<f64> {
        let total = self.cache_hits + self.cache_misses;
        (total > 0).then(|| self.cache_hits as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::{DurationStats, RenderMetrics};
    use pretty_assertions::assert_eq;

    #[test]
    fn duration_stats_track_last_and_peak() {
        let mut d = DurationStats::default();
        assert_eq!(d.mean_ms(), None);
        d.record(4);
        d.record(20);
        d.record(6);
        assert_eq!(d.count, 3);
        assert_eq!(d.last_ms, 6);
        assert_eq!(d.peak_ms, 20);
        assert_eq!(d.mean_ms(), Some(10.0));
    }

    #[test]
    fn hit_ratio_needs_lookups() {
        let mut m = RenderMetrics::new();
        assert_eq!(m.cache_hit_ratio(), None);
        m.cache_hits = 3;
        m.cache_misses = 1;
        assert_eq!(m.cache_hit_ratio(), Some(0.75));
        m.reset();
        assert_eq!(m, RenderMetrics::default());
    }
}

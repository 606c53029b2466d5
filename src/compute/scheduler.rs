//! Auto-evolution scheduler - wall-clock-driven mutation trigger.
//!
//! When enabled, a randomized interval is drawn uniformly from 30-60
//! seconds; each poll that finds the interval elapsed fires once, resets
//! the trigger time, and redraws a new interval. The clock value is passed
//! in explicitly so tests can drive time.

use std::time::{Duration, Instant};

use super::EngineRng;

/// Interval bounds in seconds.
const INTERVAL_SECS: (f32, f32) = (30.0, 60.0);

/// Randomized-interval trigger for automatic mutation.
pub struct AutoEvolveScheduler {
    enabled: bool,
    last_trigger: Instant,
    interval: Duration,
}

impl AutoEvolveScheduler {
    /// Create a disabled scheduler.
    pub fn new() -> Self {
        Self {
            enabled: false,
            last_trigger: Instant::now(),
            interval: Duration::ZERO,
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable and arm with a fresh interval starting at `now`.
    pub fn enable(&mut self, now: Instant, rng: &mut EngineRng) {
        self.enabled = true;
        self.last_trigger = now;
        self.interval = draw_interval(rng);
    }

    /// Disable the check. Nothing is in flight to cancel; mutation is
    /// synchronous from the caller's perspective.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Returns true when a mutation should fire at `now`, rearming the
    /// trigger with a new randomized interval.
    pub fn poll(&mut self, now: Instant, rng: &mut EngineRng) -> bool {
        if !self.enabled {
            return false;
        }
        if now.duration_since(self.last_trigger) >= self.interval {
            self.last_trigger = now;
            self.interval = draw_interval(rng);
            return true;
        }
        false
    }
}

impl Default for AutoEvolveScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_interval(rng: &mut EngineRng) -> Duration {
    Duration::from_secs_f32(rng.uniform(INTERVAL_SECS.0, INTERVAL_SECS.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_never_fires() {
        let mut scheduler = AutoEvolveScheduler::new();
        let mut rng = EngineRng::new(1);
        let t0 = Instant::now();
        assert!(!scheduler.poll(t0 + Duration::from_secs(3600), &mut rng));
    }

    #[test]
    fn test_fires_after_interval_and_rearms() {
        let mut scheduler = AutoEvolveScheduler::new();
        let mut rng = EngineRng::new(2);
        let t0 = Instant::now();
        scheduler.enable(t0, &mut rng);

        // Too early: intervals are at least 30 s.
        assert!(!scheduler.poll(t0 + Duration::from_secs(29), &mut rng));
        // 60 s always elapses the first interval.
        let t1 = t0 + Duration::from_secs(60);
        assert!(scheduler.poll(t1, &mut rng));
        // Immediately afterwards the new interval has not elapsed.
        assert!(!scheduler.poll(t1 + Duration::from_secs(1), &mut rng));
        // And fires again after another full 60 s.
        assert!(scheduler.poll(t1 + Duration::from_secs(60), &mut rng));
    }

    #[test]
    fn test_disable_stops_firing() {
        let mut scheduler = AutoEvolveScheduler::new();
        let mut rng = EngineRng::new(3);
        let t0 = Instant::now();
        scheduler.enable(t0, &mut rng);
        scheduler.disable();
        assert!(!scheduler.poll(t0 + Duration::from_secs(600), &mut rng));
    }
}

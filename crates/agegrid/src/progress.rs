use std::time::{Duration, Instant};

/// Count-based progress milestones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Tick {
    start: Instant,
    every: u64,
}

impl Tick {
    /// A tick that fires on every multiple of `every` (at least 1).
    #[inline]
    pub(crate) fn new(every: u64) -> Self {
        Self {
            start: Instant::now(),
            every: every.max(1),
        }
    }

    #[inline]
    pub(crate) fn should(&self, count: u64) -> bool {
        count % self.every == 0
    }

    /// Processing rate in million items per second since the tick was created.
    #[inline]
    pub(crate) fn rate_mps(&self, count: u64) -> f64 {
        const ONE_MILLION: f64 = 1_000_000.0;

        let elapsed = self.start.elapsed().as_secs_f64().max(1e-9);

        (count as f64) / ONE_MILLION / elapsed
    }
}

/// Average time spent per 100 000 objects.
pub(crate) fn per_100k(elapsed: Duration, objects: u64) -> Duration {
    if objects == 0 {
        return Duration::ZERO;
    }

    Duration::from_secs_f64(elapsed.as_secs_f64() * 100_000.0 / objects as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_on_multiples_only() {
        let tick = Tick::new(100_000);
        assert!(!tick.should(1));
        assert!(!tick.should(99_999));
        assert!(tick.should(100_000));
        assert!(!tick.should(100_001));
        assert!(tick.should(300_000));
    }

    #[test]
    fn zero_interval_fires_always() {
        let tick = Tick::new(0);
        assert!(tick.should(1));
        assert!(tick.should(7));
    }

    #[test]
    fn scales_duration_to_100k_objects() {
        assert_eq!(per_100k(Duration::from_secs(10), 0), Duration::ZERO);
        assert_eq!(per_100k(Duration::from_secs(10), 1_000_000), Duration::from_secs(1));
    }
}

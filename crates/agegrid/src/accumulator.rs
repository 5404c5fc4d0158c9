/// Running age statistics for one grid cell.
///
/// Only the aggregates are kept, so a cell costs the same whether it saw one
/// object or millions. The minimum stays `None` until the first age arrives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellStats {
    count: u64,
    age_min: Option<u32>,
    age_max: u32,
    age_avg: f64,
}

impl CellStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one age (in whole days) into the statistics.
    #[inline]
    pub fn add(&mut self, age_in_days: u32) {
        self.age_min = Some(match self.age_min {
            Some(min) => min.min(age_in_days),
            None => age_in_days,
        });
        self.age_max = self.age_max.max(age_in_days);

        let n = self.count as f64;
        self.age_avg = (self.age_avg * n + age_in_days as f64) / (n + 1.0);
        self.count += 1;
    }

    /// Number of ages folded in so far.
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    #[inline]
    pub fn age_min(&self) -> Option<u32> {
        self.age_min
    }

    #[inline]
    pub fn age_max(&self) -> u32 {
        self.age_max
    }

    #[inline]
    pub fn age_avg(&self) -> f64 {
        self.age_avg
    }

    /// Mean age rounded half away from zero (`2.5 -> 3`).
    #[inline]
    pub fn rounded_avg(&self) -> u64 {
        self.age_avg.round() as u64
    }
}

//! Records handed to the grid by a decoder, and the clock that turns their
//! timestamps into ages.

use chrono::{DateTime, Utc};

/// A single located object, e.g. an OSM node.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
    pub timestamp: DateTime<Utc>,
}

/// A line-like object, e.g. an OSM way. Every vertex is aged with the line's
/// own timestamp, not with the timestamps of the nodes it references.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub timestamp: DateTime<Utc>,
    /// `[lon, lat]` per vertex, in order.
    pub vertices: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Point(Point),
    Line(Line),
    /// An object the grid does not aggregate (an OSM relation). PBF files
    /// store these last, so the first one ends ingestion.
    Area,
}

/// The instant every age in a run is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeClock {
    instant: DateTime<Utc>,
}

impl AgeClock {
    /// Capture the current wall-clock time once for the whole run.
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    #[inline]
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// Whole days between `timestamp` and the observation instant. Timestamps
    /// after the instant count as age 0.
    #[inline]
    pub fn age_in_days(&self, timestamp: DateTime<Utc>) -> u32 {
        let days = (self.instant - timestamp).num_days();
        u32::try_from(days.max(0)).unwrap_or(u32::MAX)
    }
}

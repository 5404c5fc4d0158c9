//! Pull loop that folds decoded records into an [`AgeGrid`].

use std::time::{Duration, Instant};

use log::{debug, info};

use crate::progress::{per_100k, Tick};
use crate::record::{AgeClock, Record};
use crate::store::AgeGrid;

/// Progress lines are written every this many points and every this many lines.
pub const DEFAULT_LOG_EVERY: u64 = 100_000;

#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    pub log_every: u64,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            log_every: DEFAULT_LOG_EVERY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestSummary {
    /// Point records folded in.
    pub points: u64,
    /// Line records folded in.
    pub lines: u64,
    /// Vertices contributed by those lines.
    pub vertices: u64,
    /// `true` if ingestion ended on an area record rather than end of input.
    pub stopped_at_area: bool,
    pub elapsed: Duration,
}

impl IngestSummary {
    pub fn objects(&self) -> u64 {
        self.points + self.lines
    }

    /// Observations handed to the grid: one per point plus one per line vertex.
    pub fn observations(&self) -> u64 {
        self.points + self.vertices
    }
}

/// Progress tick of one record kind, started on its first record.
fn started<'t>(tick: &'t mut Option<Tick>, every: u64, kind: &str) -> &'t Tick {
    tick.get_or_insert_with(|| {
        info!("Start processing {kind}");
        Tick::new(every)
    })
}

/// Fold `records` into `grid`, one at a time, until the input ends or an
/// [`Record::Area`] shows up. The remaining input is not drained in the
/// latter case. The first decode error aborts ingestion and is returned as is.
pub fn ingest<I, E>(
    records: I,
    grid: &mut AgeGrid,
    clock: &AgeClock,
    options: &IngestOptions,
) -> Result<IngestSummary, E>
where
    I: IntoIterator<Item = Result<Record, E>>,
{
    let start_time = Instant::now();
    let mut summary = IngestSummary::default();
    let mut point_tick = None;
    let mut line_tick = None;

    debug!(
        "Ingesting into {} grid ({} snapping), ages relative to {}",
        grid.cell_size(),
        grid.snap(),
        clock.instant()
    );

    for record in records {
        match record? {
            Record::Point(point) => {
                let tick = started(&mut point_tick, options.log_every, "points");
                grid.observe(point.lon, point.lat, clock.age_in_days(point.timestamp));

                summary.points += 1;
                if tick.should(summary.points) {
                    info!(
                        "Processed {} points ({:.2} M/s, {} cells)",
                        summary.points,
                        tick.rate_mps(summary.points),
                        grid.len()
                    );
                }
            }
            Record::Line(line) => {
                let tick = started(&mut line_tick, options.log_every, "lines");
                let age = clock.age_in_days(line.timestamp);
                for &[lon, lat] in &line.vertices {
                    grid.observe(lon, lat, age);
                }

                summary.lines += 1;
                summary.vertices += line.vertices.len() as u64;
                if tick.should(summary.lines) {
                    info!(
                        "Processed {} lines ({:.2} M/s, {} cells)",
                        summary.lines,
                        tick.rate_mps(summary.lines),
                        grid.len()
                    );
                }
            }
            Record::Area => {
                info!("Reached area records, skipping them and ending ingestion");
                summary.stopped_at_area = true;
                break;
            }
        }
    }

    summary.elapsed = start_time.elapsed();
    info!(
        "End processing {} objects after {:?} ({:?} / 100k objects)",
        summary.objects(),
        summary.elapsed,
        per_100k(summary.elapsed, summary.objects())
    );

    Ok(summary)
}

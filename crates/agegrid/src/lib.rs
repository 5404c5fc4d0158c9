//! AGEGRID: folds a stream of timestamped lon/lat objects into a fixed-size
//! degree grid of age statistics.
//!
//! - Cell `(x, y)` is the square `[x*s, (x+1)*s] x [y*s, (y+1)*s]` for cell size `s`;
//!   [`Snap`] decides which cell a coordinate falls into.
//! - Each cell keeps count, min, max and running mean of object ages in days.
//! - Ages are measured against one instant captured per run ([`AgeClock`]).
//! - Memory grows with the number of distinct cells, not with the input.
//!
//! Pipeline: decoder -> [`ingest()`] -> [`AgeGrid::observe`] -> [`geojson`].

pub mod accumulator;
pub mod cell;
pub mod error;
pub mod geojson;
pub mod ingest;
mod progress;
pub mod record;
pub mod store;

pub use accumulator::CellStats;
pub use cell::{CellId, CellSize, Snap};
pub use error::GridError;
pub use ingest::{ingest, IngestOptions, IngestSummary, DEFAULT_LOG_EVERY};
pub use record::{AgeClock, Line, Point, Record};
pub use store::AgeGrid;

mod pbf;

use std::path::PathBuf;

use agegrid::{geojson, ingest, AgeClock, AgeGrid, CellSize, IngestOptions, Snap, DEFAULT_LOG_EVERY};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use log::{debug, info};

use crate::pbf::PbfRecords;

/// How coordinates are snapped onto the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SnapMode {
    /// Round toward zero; cells next to the equator/prime meridian also
    /// collect the objects from the adjacent negative cell.
    Truncate,
    /// Round down; every cell polygon contains its objects.
    Floor,
}

impl std::fmt::Display for SnapMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SnapMode::Truncate => "truncate",
            SnapMode::Floor => "floor",
        };

        f.write_str(s)
    }
}

impl From<SnapMode> for Snap {
    fn from(mode: SnapMode) -> Self {
        match mode {
            SnapMode::Truncate => Snap::Truncate,
            SnapMode::Floor => Snap::Floor,
        }
    }
}

/// Aggregate the age of OSM nodes and way vertices into a grid of GeoJSON cells.
///
/// Every cell carries the number of objects in it and the minimum, maximum and
/// average age of those objects in days.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "osm2agegrid",
    version,
    after_help = "Example: osm2agegrid hamburg-latest.osm.pbf 0.002\n\
                  Download extracts from https://download.geofabrik.de/"
)]
struct Args {
    /// OSM .pbf file to read. Ways need node locations
    /// (`osmium add-locations-to-ways`) unless --index-way-nodes is given.
    pbf_path: PathBuf,

    /// Size of the output cells in degree (e.g. '1' means one degree of
    /// longitude wide and one degree of latitude high).
    cell_size: CellSize,

    /// Where to write the GeoJSON FeatureCollection.
    #[arg(long, short, default_value = "output.geojson")]
    output: PathBuf,

    /// Either truncate toward zero (classic) or floor scaled coordinates.
    #[arg(long, value_enum, default_value_t = SnapMode::Truncate)]
    snap: SnapMode,

    /// Log a progress line every N nodes and every N ways.
    #[arg(long, default_value_t = DEFAULT_LOG_EVERY)]
    log_every: u64,

    /// Remember node coordinates to locate ways stored without node locations.
    /// Memory grows with the number of nodes in the file.
    #[arg(long, default_value_t = false)]
    index_way_nodes: bool,

    /// Measure ages against this RFC 3339 instant instead of the start time.
    #[arg(long)]
    now: Option<DateTime<Utc>>,
}

fn run(args: &Args) -> Result<()> {
    let clock = args.now.map_or_else(AgeClock::now, AgeClock::at);
    let mut grid = AgeGrid::new(args.cell_size, args.snap.into());

    info!(
        "Aggregating {} into {} cells ({} snapping), ages relative to {}",
        args.pbf_path.display(),
        args.cell_size,
        args.snap,
        clock.instant()
    );

    let mut records = PbfRecords::open(&args.pbf_path, args.index_way_nodes)?;

    debug!("Start reading OSM data");
    let summary = ingest(
        &mut records,
        &mut grid,
        &clock,
        &IngestOptions {
            log_every: args.log_every,
        },
    )
    .with_context(|| format!("Unable to read OSM data from {}", args.pbf_path.display()))?;

    records.stats().report();
    if args.index_way_nodes {
        debug!("Way-node index held {} nodes", records.indexed_nodes());
    }
    drop(records);

    info!(
        "Folded {} observations ({} nodes, {} ways with {} vertices) into {} cells",
        summary.observations(),
        summary.points,
        summary.lines,
        summary.vertices,
        grid.len()
    );

    let written = geojson::write_file(&args.output, &grid)
        .with_context(|| format!("Unable to write GeoJSON output {}", args.output.display()))?;

    info!("Wrote {} cells to {}", written, args.output.display());
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging; default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    run(&args)?;

    info!("Done");
    Ok(())
}

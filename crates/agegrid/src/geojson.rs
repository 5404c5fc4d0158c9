//! GeoJSON output: one polygon feature per cell.
//!
//! Layout:
//!   {"type": "FeatureCollection","features": [
//!   {"type":"Feature","geometry":{...},"properties":{...}},
//!   ...
//!   {"type":"Feature","geometry":{...},"properties":{...}}
//!   ]}
//!
//! Coordinates carry exactly four decimals. Properties are `numberOfObjects`,
//! `ageMin`, `ageMax` and `ageAvg` (days; the mean rounded half away from
//! zero). Features are ordered by cell so the same grid always renders to the
//! same bytes.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::accumulator::CellStats;
use crate::cell::{CellId, CellSize};
use crate::store::AgeGrid;

const HEADER: &str = "{\"type\": \"FeatureCollection\",\"features\": [\n";
const FOOTER: &str = "]}";

fn write_feature<W: Write>(
    w: &mut W,
    id: CellId,
    stats: &CellStats,
    cell_size: CellSize,
) -> io::Result<()> {
    w.write_all(b"{\"type\":\"Feature\",\"geometry\":{\"type\":\"Polygon\",\"coordinates\":[[")?;

    for (i, [lon, lat]) in id.footprint(cell_size).iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        write!(w, "[{:.4},{:.4}]", lon, lat)?;
    }

    write!(
        w,
        "]]}},\"properties\":{{\"numberOfObjects\":{},\"ageMin\":{},\"ageMax\":{},\"ageAvg\":{}}}}}",
        stats.count(),
        stats.age_min().unwrap_or(0),
        stats.age_max(),
        stats.rounded_avg(),
    )
}

/// Render `grid` as a FeatureCollection into `w`. Returns the number of
/// features written.
pub fn write_feature_collection<W: Write>(grid: &AgeGrid, mut w: W) -> io::Result<usize> {
    let cells = grid.cells();

    w.write_all(HEADER.as_bytes())?;

    for (i, (id, stats)) in cells.iter().enumerate() {
        write_feature(&mut w, *id, stats, grid.cell_size())?;

        // The last feature must not carry a trailing separator.
        if i + 1 < cells.len() {
            w.write_all(b",\n")?;
        } else {
            w.write_all(b"\n")?;
        }
    }

    w.write_all(FOOTER.as_bytes())?;
    w.flush()?;

    Ok(cells.len())
}

/// Create (or truncate) `path` and write the FeatureCollection into it.
pub fn write_file<P: AsRef<Path>>(path: P, grid: &AgeGrid) -> io::Result<usize> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let written = write_feature_collection(grid, &mut writer)?;
    writer.flush()?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Snap;

    fn render(grid: &AgeGrid) -> String {
        let mut out = Vec::new();
        write_feature_collection(grid, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn empty_grid_is_an_empty_collection() {
        let grid = AgeGrid::new(CellSize::new(1.0).unwrap(), Snap::Truncate);
        let text = render(&grid);

        assert_eq!(text, "{\"type\": \"FeatureCollection\",\"features\": [\n]}");

        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["features"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn renders_one_feature_per_line() {
        let mut grid = AgeGrid::new(CellSize::new(0.5).unwrap(), Snap::Floor);
        grid.observe(-0.2, 1.2, 3);
        grid.observe(-0.1, 1.3, 4);
        grid.observe(2.2, 0.1, 9);

        let expected = concat!(
            "{\"type\": \"FeatureCollection\",\"features\": [\n",
            "{\"type\":\"Feature\",\"geometry\":{\"type\":\"Polygon\",\"coordinates\":",
            "[[[-0.5000,1.0000],[-0.5000,1.5000],[0.0000,1.5000],[0.0000,1.0000],[-0.5000,1.0000]]]},",
            "\"properties\":{\"numberOfObjects\":2,\"ageMin\":3,\"ageMax\":4,\"ageAvg\":4}},\n",
            "{\"type\":\"Feature\",\"geometry\":{\"type\":\"Polygon\",\"coordinates\":",
            "[[[2.0000,0.0000],[2.0000,0.5000],[2.5000,0.5000],[2.5000,0.0000],[2.0000,0.0000]]]},",
            "\"properties\":{\"numberOfObjects\":1,\"ageMin\":9,\"ageMax\":9,\"ageAvg\":9}}\n",
            "]}",
        );

        assert_eq!(render(&grid), expected);
    }

    #[test]
    fn output_parses_as_geojson() {
        let mut grid = AgeGrid::new(CellSize::new(0.01).unwrap(), Snap::Truncate);
        for i in 0..250u32 {
            grid.observe(9.9 + i as f64 * 0.003, 53.5 + i as f64 * 0.001, i);
        }

        let doc: serde_json::Value = serde_json::from_str(&render(&grid)).unwrap();
        assert_eq!(doc["type"], "FeatureCollection");

        let features = doc["features"].as_array().unwrap();
        assert_eq!(features.len(), grid.len());

        let mut total = 0;
        for feature in features {
            let ring = feature["geometry"]["coordinates"][0].as_array().unwrap();
            assert_eq!(ring.len(), 5);
            assert_eq!(ring[0], ring[4]);

            let props = &feature["properties"];
            let min = props["ageMin"].as_u64().unwrap();
            let avg = props["ageAvg"].as_u64().unwrap();
            let max = props["ageMax"].as_u64().unwrap();
            assert!(min <= avg && avg <= max);
            total += props["numberOfObjects"].as_u64().unwrap();
        }
        assert_eq!(total, 250);
    }

    #[test]
    fn rendering_twice_is_byte_identical() {
        let mut grid = AgeGrid::new(CellSize::new(0.1).unwrap(), Snap::Truncate);
        for i in 0..100u32 {
            grid.observe((i % 17) as f64 * 0.13, (i % 11) as f64 * 0.07, i);
        }

        assert_eq!(render(&grid), render(&grid));
    }

    #[test]
    fn writes_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.geojson");

        let mut grid = AgeGrid::new(CellSize::new(1.0).unwrap(), Snap::Truncate);
        grid.observe(0.5, 0.5, 1);

        assert_eq!(write_file(&path, &grid).unwrap(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), render(&grid));
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("output.geojson");
        let grid = AgeGrid::new(CellSize::new(1.0).unwrap(), Snap::Truncate);

        assert!(write_file(&path, &grid).is_err());
    }
}

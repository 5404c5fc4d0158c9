//! Cell index: maps a lon/lat pair onto integer grid coordinates.

use std::fmt;
use std::str::FromStr;

use crate::error::GridError;

/// Edge length of a grid cell in degrees. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSize(f64);

impl CellSize {
    pub fn new(degrees: f64) -> Result<Self, GridError> {
        if degrees.is_finite() && degrees > 0.0 {
            Ok(Self(degrees))
        } else {
            Err(GridError::InvalidCellSize(degrees))
        }
    }

    #[inline]
    pub fn degrees(self) -> f64 {
        self.0
    }
}

impl FromStr for CellSize {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let degrees: f64 = s
            .trim()
            .parse()
            .map_err(|_| GridError::UnparsableCellSize(s.to_owned()))?;

        Self::new(degrees)
    }
}

impl fmt::Display for CellSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// How a scaled coordinate is turned into an integer cell coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Snap {
    /// Round toward zero. Cell 0 collects everything in `(-s, s)`, twice the
    /// width of any other cell. A negative cell `-n` holds the points of
    /// `(-(n+1)*s, -n*s]` but its footprint is drawn at `[-n*s, (-n+1)*s)`,
    /// one cell east (or north) of those points. Along each axis only
    /// positive cells contain every point they count.
    #[default]
    Truncate,
    /// Round toward negative infinity. Cell `n` holds exactly the coordinates
    /// `v` with `n*s <= v < (n+1)*s` as computed in `f64`, the same products
    /// [`CellId::footprint`] draws, so every footprint contains its points,
    /// including those sitting on a grid line.
    Floor,
}

impl Snap {
    #[inline]
    fn apply(self, v: f64, size: f64) -> i64 {
        match self {
            Snap::Truncate => (v / size) as i64,
            Snap::Floor => {
                // `v / size` may round across a grid line; settle on the
                // footprint products instead.
                let n = (v / size).floor() as i64;
                if (n + 1) as f64 * size <= v {
                    n + 1
                } else if n as f64 * size > v {
                    n - 1
                } else {
                    n
                }
            }
        }
    }
}

impl fmt::Display for Snap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Snap::Truncate => "truncate",
            Snap::Floor => "floor",
        };

        f.write_str(s)
    }
}

/// Integer grid coordinates of one cell; `x` follows longitude, `y` latitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId {
    pub x: i64,
    pub y: i64,
}

impl CellId {
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Cell containing `(lon, lat)` for the given grid.
    #[inline]
    pub fn locate(lon: f64, lat: f64, cell_size: CellSize, snap: Snap) -> Self {
        let size = cell_size.degrees();
        Self {
            x: snap.apply(lon, size),
            y: snap.apply(lat, size),
        }
    }

    /// Closed outer ring of the cell square as `[lon, lat]` pairs, starting and
    /// ending at the south-west corner.
    pub fn footprint(self, cell_size: CellSize) -> [[f64; 2]; 5] {
        let size = cell_size.degrees();
        let min_x = self.x as f64 * size;
        let min_y = self.y as f64 * size;
        let max_x = (self.x + 1) as f64 * size;
        let max_y = (self.y + 1) as f64 * size;

        [
            [min_x, min_y],
            [min_x, max_y],
            [max_x, max_y],
            [max_x, min_y],
            [min_x, min_y],
        ]
    }
}

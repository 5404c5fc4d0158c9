use hashbrown::HashMap;

use crate::accumulator::CellStats;
use crate::cell::{CellId, CellSize, Snap};

/// Aggregation store: owns one [`CellStats`] per cell that has seen at least
/// one observation. Cells are created on first touch and never removed.
#[derive(Debug, Clone)]
pub struct AgeGrid {
    cell_size: CellSize,
    snap: Snap,
    cells: HashMap<CellId, CellStats>,
}

impl AgeGrid {
    pub fn new(cell_size: CellSize, snap: Snap) -> Self {
        Self {
            cell_size,
            snap,
            cells: HashMap::new(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> CellSize {
        self.cell_size
    }

    #[inline]
    pub fn snap(&self) -> Snap {
        self.snap
    }

    /// Route one observation to its cell and fold the age into it.
    #[inline]
    pub fn observe(&mut self, lon: f64, lat: f64, age_in_days: u32) -> CellId {
        let id = CellId::locate(lon, lat, self.cell_size, self.snap);
        self.cells.entry(id).or_default().add(age_in_days);
        id
    }

    /// Number of distinct cells observed.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, id: CellId) -> Option<&CellStats> {
        self.cells.get(&id)
    }

    /// Sum of the per-cell counts.
    pub fn total_observations(&self) -> u64 {
        self.cells.values().map(CellStats::count).sum()
    }

    /// All cells ordered by `(x, y)`.
    pub fn cells(&self) -> Vec<(CellId, &CellStats)> {
        let mut cells: Vec<_> = self.cells.iter().map(|(id, stats)| (*id, stats)).collect();
        cells.sort_unstable_by_key(|(id, _)| *id);
        cells
    }
}

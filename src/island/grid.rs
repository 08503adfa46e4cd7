//! Destructible cell grid backing one island.

use crate::core::types::Vec2;
use crate::math::Quad;

/// One destructible occupancy unit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cell {
    pub active: bool,
    pub health: f32,
}

impl Cell {
    pub const EMPTY: Self = Self { active: false, health: 0.0 };

    pub fn solid(health: f32) -> Self {
        Self { active: true, health }
    }

    /// Subtract `amount` from an active cell. Returns true if the cell was destroyed.
    pub fn damage(&mut self, amount: f32) -> bool {
        if !self.active {
            return false;
        }
        self.health -= amount;
        if self.health <= 0.0 {
            self.active = false;
            return true;
        }
        false
    }
}

/// Inclusive-exclusive range of cell indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRange {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CellRange {
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Grow by one cell on every side, clamped to the grid.
    pub fn grown(&self, width: u32, height: u32) -> CellRange {
        CellRange {
            x0: self.x0.saturating_sub(1),
            y0: self.y0.saturating_sub(1),
            x1: (self.x1 + 1).min(width),
            y1: (self.y1 + 1).min(height),
        }
    }
}

/// Row-major grid of cells, index = y * width + x.
#[derive(Clone, Debug, PartialEq)]
pub struct CellGrid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl CellGrid {
    /// Grid with every cell inactive.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; (width * height) as usize],
        }
    }

    /// Grid with every cell active at `health`.
    pub fn filled(width: u32, height: u32, health: f32) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::solid(health); (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(self.index(x, y))
    }

    pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        self.cells.get_mut(i)
    }

    pub fn cell(&self, flat_index: usize) -> Option<&Cell> {
        self.cells.get(flat_index)
    }

    pub fn cell_mut(&mut self, flat_index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(flat_index)
    }

    /// (x, y) of a flat index
    pub fn coords(&self, flat_index: usize) -> (u32, u32) {
        let i = flat_index as u32;
        (i % self.width, i / self.width)
    }

    /// Occupancy at signed coordinates, clamped to the grid edge.
    #[inline]
    pub fn active_clamped(&self, x: i32, y: i32) -> bool {
        if self.cells.is_empty() {
            return false;
        }
        let cx = x.clamp(0, self.width as i32 - 1) as u32;
        let cy = y.clamp(0, self.height as i32 - 1) as u32;
        self.cells[self.index(cx, cy)].active
    }

    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|c| c.active).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Cells whose centres fall inside `rect` (local pixel space).
    ///
    /// A rect too small to contain any centre still maps to the cell under its
    /// own centre, so small probes are never silently empty. Rects fully outside
    /// the grid yield an empty range.
    pub fn range_for(&self, rect: &Quad, cell_size: f32) -> CellRange {
        let extent = Vec2::new(self.width as f32, self.height as f32) * cell_size;
        let grid_quad = Quad::new(Vec2::ZERO, extent);
        let Some(clipped) = rect.intersection(&grid_quad) else {
            return CellRange { x0: 0, y0: 0, x1: 0, y1: 0 };
        };

        let to_index = |v: f32, limit: u32| (v / cell_size).round().clamp(0.0, limit as f32) as u32;
        let mut range = CellRange {
            x0: to_index(clipped.min.x, self.width),
            y0: to_index(clipped.min.y, self.height),
            x1: to_index(clipped.max.x, self.width),
            y1: to_index(clipped.max.y, self.height),
        };

        let centre = clipped.center() / cell_size;
        if range.x0 >= range.x1 {
            range.x0 = (centre.x.floor() as u32).min(self.width - 1);
            range.x1 = range.x0 + 1;
        }
        if range.y0 >= range.y1 {
            range.y0 = (centre.y.floor() as u32).min(self.height - 1);
            range.y1 = range.y0 + 1;
        }
        range
    }

    /// Flat index of the cell containing a local pixel-space point.
    pub fn index_at(&self, p: Vec2, cell_size: f32) -> Option<usize> {
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let x = (p.x / cell_size) as u32;
        let y = (p.y / cell_size) as u32;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.index(x, y))
    }
}

//! Fixed-size occupancy grid holding the items currently on display.

use grinch_smasher_core::{CellIndex, CellSnapshot, GridView, ItemKind};
use thiserror::Error;

/// Precondition violations raised while mutating the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The requested cell lies outside the grid.
    #[error("cell {0} lies outside the grid")]
    InvalidIndex(CellIndex),
    /// The requested cell already holds an item.
    #[error("cell {0} is already occupied")]
    Occupied(CellIndex),
}

/// Single slot of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    index: CellIndex,
    item: Option<ItemKind>,
}

impl Cell {
    const fn empty(index: CellIndex) -> Self {
        Self { index, item: None }
    }

    /// Stable identity of the cell.
    #[must_use]
    pub const fn index(&self) -> CellIndex {
        self.index
    }

    /// Item currently shown in the cell, if any.
    #[must_use]
    pub const fn item(&self) -> Option<ItemKind> {
        self.item
    }

    /// Reports whether the cell holds an item.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.item.is_some()
    }

    fn snapshot(&self) -> CellSnapshot {
        CellSnapshot {
            index: self.index,
            item: self.item,
        }
    }
}

/// Ordered, fixed-size collection of cells.
///
/// Cells are never destroyed, only reset. A cleared cell carries no item kind,
/// so occupancy and visibility cannot disagree.
#[derive(Clone, Debug)]
pub struct Grid {
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid of `size` empty cells.
    #[must_use]
    pub fn new(size: usize) -> Self {
        let cells = (0..size)
            .map(|offset| Cell::empty(CellIndex::new(u32::try_from(offset).unwrap_or(u32::MAX))))
            .collect();
        Self { cells }
    }

    /// Number of cells in the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the grid has no cells at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Read access to a single cell.
    #[must_use]
    pub fn cell_at(&self, index: CellIndex) -> Option<&Cell> {
        self.cells.get(index.as_usize())
    }

    /// Places an item into an empty cell.
    pub fn occupy(&mut self, index: CellIndex, kind: ItemKind) -> Result<(), GridError> {
        let cell = self
            .cells
            .get_mut(index.as_usize())
            .ok_or(GridError::InvalidIndex(index))?;
        if cell.is_occupied() {
            return Err(GridError::Occupied(index));
        }
        cell.item = Some(kind);
        Ok(())
    }

    /// Empties a cell, returning the item it held.
    ///
    /// Clearing an empty or unknown cell is a no-op.
    pub fn clear(&mut self, index: CellIndex) -> Option<ItemKind> {
        self.cells
            .get_mut(index.as_usize())
            .and_then(|cell| cell.item.take())
    }

    /// Empties every cell.
    pub fn clear_all(&mut self) {
        for cell in &mut self.cells {
            cell.item = None;
        }
    }

    /// Indices of all cells that hold no item, in index order.
    #[must_use]
    pub fn empty_cells(&self) -> Vec<CellIndex> {
        self.cells
            .iter()
            .filter(|cell| !cell.is_occupied())
            .map(Cell::index)
            .collect()
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_occupied()).count()
    }

    /// Captures a read-only view of every cell.
    #[must_use]
    pub fn view(&self) -> GridView {
        GridView::from_snapshots(self.cells.iter().map(Cell::snapshot).collect())
    }
}

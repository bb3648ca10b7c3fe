use block_contract::BlockId;
use serde::{Deserialize, Serialize};

/// Column count of the default dashboard layout.
pub const DEFAULT_COLUMNS: u32 = 3;

/// A `(row, column)` grid coordinate.
///
/// Ordering is row-major: `(0,0) < (0,1) < ... < (1,0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Zero-based row; rows grow without bound.
    pub row: u32,
    /// Zero-based column, below the grid's column count.
    pub col: u32,
}

impl Cell {
    /// The top-left cell, used as the drag-origin fallback.
    pub const ORIGIN: Cell = Cell { row: 0, col: 0 };

    /// Creates a cell.
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// A block placement record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Placed block.
    pub block_id: BlockId,
    /// Cell the block occupies.
    pub cell: Cell,
}

/// Notification that a block now occupies `cell`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionChange {
    /// Block whose cell changed.
    pub block_id: BlockId,
    /// New cell.
    pub cell: Cell,
}

impl PositionChange {
    pub(crate) fn new(block_id: &BlockId, cell: Cell) -> Self {
        Self {
            block_id: block_id.clone(),
            cell,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn cells_order_row_major() {
        let mut cells = vec![
            Cell::new(1, 0),
            Cell::new(0, 2),
            Cell::new(0, 0),
            Cell::new(0, 1),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                Cell::new(0, 0),
                Cell::new(0, 1),
                Cell::new(0, 2),
                Cell::new(1, 0)
            ]
        );
    }

    #[test]
    fn cell_displays_as_row_col_pair() {
        assert_eq!(Cell::new(2, 1).to_string(), "(2,1)");
    }
}

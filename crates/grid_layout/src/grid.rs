use std::collections::BTreeMap;

use block_contract::BlockId;

use crate::{Cell, LayoutError, Placement, PositionChange, DEFAULT_COLUMNS};

/// Authoritative mapping of blocks to grid cells.
///
/// Both directions are indexed so that `position_of` and `occupant_of` are lookups, and every
/// mutation keeps the two indexes in agreement: at most one cell per block and at most one block
/// per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridModel {
    columns: u32,
    by_block: BTreeMap<BlockId, Cell>,
    by_cell: BTreeMap<Cell, BlockId>,
}

impl Default for GridModel {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS)
    }
}

impl GridModel {
    /// Creates an empty grid with `columns` columns (at least one).
    pub fn new(columns: u32) -> Self {
        Self {
            columns: columns.max(1),
            by_block: BTreeMap::new(),
            by_cell: BTreeMap::new(),
        }
    }

    /// Builds a grid from persisted placements.
    ///
    /// Placements are honoured in row-major order. A placement whose cell is outside the
    /// columns, already taken, or whose block was already placed earlier is relocated to
    /// [`GridModel::first_free_cell`] with `overflow_rows`; the relocations are returned so the
    /// caller can persist them.
    pub fn hydrate(
        columns: u32,
        placements: impl IntoIterator<Item = Placement>,
        overflow_rows: u32,
    ) -> (Self, Vec<PositionChange>) {
        let mut grid = Self::new(columns);
        let mut requested: Vec<Placement> = placements.into_iter().collect();
        requested.sort_by(|a, b| a.cell.cmp(&b.cell).then_with(|| a.block_id.cmp(&b.block_id)));

        let mut displaced = Vec::new();
        for placement in requested {
            if grid.by_block.contains_key(&placement.block_id) {
                continue;
            }
            if grid.contains_cell(placement.cell) && grid.occupant_of(placement.cell).is_none() {
                grid.place(placement.block_id, placement.cell);
            } else {
                displaced.push(placement.block_id);
            }
        }

        let mut relocations = Vec::new();
        for block_id in displaced {
            if grid.by_block.contains_key(&block_id) {
                continue;
            }
            let cell = grid.first_free_cell(overflow_rows);
            relocations.push(PositionChange::new(&block_id, cell));
            grid.place(block_id, cell);
        }
        (grid, relocations)
    }

    /// Column count.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Returns `true` when `cell` lies within the grid's columns.
    pub fn contains_cell(&self, cell: Cell) -> bool {
        cell.col < self.columns
    }

    /// Assigns `block_id` to `cell`.
    ///
    /// Any previous cell of `block_id` becomes empty. Any other block occupying `cell` loses its
    /// placement record and is returned; callers that need it visible must relocate it first.
    pub fn place(&mut self, block_id: BlockId, cell: Cell) -> Option<BlockId> {
        if let Some(previous) = self.by_block.remove(&block_id) {
            self.by_cell.remove(&previous);
        }
        let evicted = self.by_cell.insert(cell, block_id.clone());
        if let Some(evicted) = evicted.as_ref() {
            self.by_block.remove(evicted);
        }
        self.by_block.insert(block_id, cell);
        evicted
    }

    /// Current cell of `block_id`.
    pub fn position_of(&self, block_id: &BlockId) -> Option<Cell> {
        self.by_block.get(block_id).copied()
    }

    /// Block occupying `cell`.
    pub fn occupant_of(&self, cell: Cell) -> Option<&BlockId> {
        self.by_cell.get(&cell)
    }

    /// Deletes the placement record of `block_id`, returning the cell it vacated.
    pub fn remove(&mut self, block_id: &BlockId) -> Option<Cell> {
        let cell = self.by_block.remove(block_id)?;
        self.by_cell.remove(&cell);
        Some(cell)
    }

    /// First empty cell scanning row-major through `max_rows` rows.
    ///
    /// Returns the overflow cell `(max_rows, 0)` when every scanned cell is occupied.
    pub fn first_free_cell(&self, max_rows: u32) -> Cell {
        (0..max_rows)
            .flat_map(|row| (0..self.columns).map(move |col| Cell::new(row, col)))
            .find(|cell| !self.by_cell.contains_key(cell))
            .unwrap_or(Cell::new(max_rows, 0))
    }

    /// Empty cells in row-major order across at least `min_rows` rows and every occupied row.
    pub fn empty_cells(&self, min_rows: u32) -> Vec<Cell> {
        let rows = self.row_count().max(min_rows);
        (0..rows)
            .flat_map(|row| (0..self.columns).map(move |col| Cell::new(row, col)))
            .filter(|cell| !self.by_cell.contains_key(cell))
            .collect()
    }

    /// Number of rows spanned by placements (last occupied row + 1).
    pub fn row_count(&self) -> u32 {
        self.by_cell
            .keys()
            .next_back()
            .map_or(0, |cell| cell.row.saturating_add(1))
    }

    /// Placement records in row-major order.
    pub fn placements(&self) -> Vec<Placement> {
        self.by_cell
            .iter()
            .map(|(cell, block_id)| Placement {
                block_id: block_id.clone(),
                cell: *cell,
            })
            .collect()
    }

    /// Number of placed blocks.
    pub fn len(&self) -> usize {
        self.by_block.len()
    }

    /// Returns `true` when no block is placed.
    pub fn is_empty(&self) -> bool {
        self.by_block.is_empty()
    }

    /// Verifies that both indexes agree and no cell holds two blocks.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::ConsistencyFault`] describing the first violation found.
    pub fn check_consistency(&self) -> Result<(), LayoutError> {
        if self.by_block.len() != self.by_cell.len() {
            return Err(LayoutError::ConsistencyFault {
                detail: format!(
                    "{} placement records for {} occupied cells",
                    self.by_block.len(),
                    self.by_cell.len()
                ),
            });
        }
        for (block_id, cell) in &self.by_block {
            match self.by_cell.get(cell) {
                Some(occupant) if occupant == block_id => {}
                Some(occupant) => {
                    return Err(LayoutError::ConsistencyFault {
                        detail: format!("`{block_id}` and `{occupant}` both claim cell {cell}"),
                    })
                }
                None => {
                    return Err(LayoutError::ConsistencyFault {
                        detail: format!("`{block_id}` claims cell {cell} which records no occupant"),
                    })
                }
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn corrupt_for_test(&mut self, block_id: BlockId, cell: Cell) {
        self.by_block.insert(block_id, cell);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn id(raw: &str) -> BlockId {
        BlockId::trusted(raw)
    }

    fn grid_with(placements: &[(&str, u32, u32)]) -> GridModel {
        let mut grid = GridModel::default();
        for (block, row, col) in placements {
            grid.place(id(block), Cell::new(*row, *col));
        }
        grid
    }

    #[test]
    fn place_then_query_both_directions() {
        let grid = grid_with(&[("clock", 0, 0), ("weather", 0, 1)]);

        assert_eq!(grid.position_of(&id("clock")), Some(Cell::new(0, 0)));
        assert_eq!(grid.occupant_of(Cell::new(0, 1)), Some(&id("weather")));
        assert_eq!(grid.occupant_of(Cell::new(1, 1)), None);
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn place_moves_block_and_frees_previous_cell() {
        let mut grid = grid_with(&[("clock", 0, 0)]);
        grid.place(id("clock"), Cell::new(2, 2));

        assert_eq!(grid.position_of(&id("clock")), Some(Cell::new(2, 2)));
        assert_eq!(grid.occupant_of(Cell::new(0, 0)), None);
        grid.check_consistency().expect("consistent");
    }

    #[test]
    fn place_on_occupied_cell_leaves_old_occupant_placement_less() {
        let mut grid = grid_with(&[("clock", 0, 0), ("weather", 0, 1)]);
        let evicted = grid.place(id("clock"), Cell::new(0, 1));

        assert_eq!(evicted, Some(id("weather")));
        assert_eq!(grid.position_of(&id("weather")), None);
        assert_eq!(grid.occupant_of(Cell::new(0, 1)), Some(&id("clock")));
        assert_eq!(grid.occupant_of(Cell::new(0, 0)), None);
        grid.check_consistency().expect("consistent");
    }

    #[test]
    fn place_on_own_cell_evicts_nothing() {
        let mut grid = grid_with(&[("clock", 1, 1)]);
        assert_eq!(grid.place(id("clock"), Cell::new(1, 1)), None);
        assert_eq!(grid.position_of(&id("clock")), Some(Cell::new(1, 1)));
    }

    #[test]
    fn remove_is_noop_for_unknown_block() {
        let mut grid = grid_with(&[("clock", 0, 0)]);
        let before = grid.clone();

        assert_eq!(grid.remove(&id("movies")), None);
        assert_eq!(grid, before);
        assert_eq!(grid.remove(&id("clock")), Some(Cell::new(0, 0)));
        assert!(grid.is_empty());
    }

    #[test]
    fn first_free_cell_scans_row_major() {
        let grid = grid_with(&[("clock", 0, 0), ("weather", 0, 1)]);
        assert_eq!(grid.first_free_cell(5), Cell::new(0, 2));

        let grid = grid_with(&[("clock", 0, 0), ("weather", 0, 1), ("movies", 0, 2)]);
        assert_eq!(grid.first_free_cell(5), Cell::new(1, 0));
    }

    #[test]
    fn first_free_cell_overflows_one_row_past_scan_limit() {
        let mut grid = GridModel::default();
        for row in 0..5 {
            for col in 0..3 {
                grid.place(id(&format!("b{row}_{col}")), Cell::new(row, col));
            }
        }
        assert_eq!(grid.first_free_cell(5), Cell::new(5, 0));
        assert_eq!(grid.first_free_cell(0), Cell::new(0, 0));
    }

    #[test]
    fn empty_cells_cover_minimum_rows_and_occupied_rows() {
        let grid = grid_with(&[("clock", 0, 0), ("jobs", 3, 2)]);
        let empty = grid.empty_cells(3);

        assert_eq!(empty.len(), 4 * 3 - 2);
        assert_eq!(empty.first(), Some(&Cell::new(0, 1)));
        assert_eq!(empty.last(), Some(&Cell::new(3, 1)));
        assert_eq!(grid.row_count(), 4);
    }

    #[test]
    fn hydrate_relocates_collisions_and_out_of_bounds_entries() {
        let entries = vec![
            Placement {
                block_id: id("weather"),
                cell: Cell::new(0, 0),
            },
            Placement {
                block_id: id("clock"),
                cell: Cell::new(0, 0),
            },
            Placement {
                block_id: id("movies"),
                cell: Cell::new(0, 7),
            },
            Placement {
                block_id: id("emails"),
                cell: Cell::new(0, 1),
            },
        ];

        let (grid, relocations) = GridModel::hydrate(3, entries, 5);

        assert_eq!(grid.position_of(&id("clock")), Some(Cell::new(0, 0)));
        assert_eq!(grid.position_of(&id("emails")), Some(Cell::new(0, 1)));
        assert_eq!(
            relocations,
            vec![
                PositionChange::new(&id("weather"), Cell::new(0, 2)),
                PositionChange::new(&id("movies"), Cell::new(1, 0)),
            ]
        );
        grid.check_consistency().expect("consistent");
    }

    #[test]
    fn hydrate_keeps_row_major_first_record_of_duplicated_block() {
        let entries = vec![
            Placement {
                block_id: id("clock"),
                cell: Cell::new(1, 0),
            },
            Placement {
                block_id: id("clock"),
                cell: Cell::new(0, 2),
            },
        ];
        let (grid, relocations) = GridModel::hydrate(3, entries, 5);

        assert_eq!(grid.position_of(&id("clock")), Some(Cell::new(0, 2)));
        assert_eq!(grid.len(), 1);
        assert!(relocations.is_empty());
    }

    #[test]
    fn consistency_check_detects_disagreeing_indexes() {
        let mut grid = grid_with(&[("clock", 0, 0), ("weather", 0, 1)]);
        grid.corrupt_for_test(id("weather"), Cell::new(0, 0));

        let err = grid.check_consistency().expect_err("corruption detected");
        assert!(matches!(err, LayoutError::ConsistencyFault { .. }));
    }
}

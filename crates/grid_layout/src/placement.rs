use block_contract::BlockId;

use crate::{Cell, DragSession, DragSlot, GridModel, LayoutError, PositionChange};

/// Outcome of a drop resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationResult {
    /// Position-changed notifications in emission order: the displaced occupant (swap case)
    /// first, then the dragged block. Empty for a no-op drop.
    pub changes: Vec<PositionChange>,
    /// Cell left empty by the drop, to be rendered as a drop zone.
    pub vacated: Option<Cell>,
}

impl RelocationResult {
    /// Returns `true` when the drop changed nothing.
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Instruction to re-show a dragged card at its unchanged cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreSignal {
    /// Block whose card should reappear.
    pub block_id: BlockId,
    /// Cell to render it in.
    pub cell: Cell,
}

/// How a drag gesture ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragConclusion {
    /// A drop was accepted; the grid already reflects it.
    Accepted {
        /// Block that was dragged.
        block_id: BlockId,
    },
    /// No drop was accepted; the grid is untouched and the card must be restored.
    Restored(RestoreSignal),
}

/// Resolves drag gestures against the grid it owns.
///
/// The grid is only mutated here, so every reachable state satisfies the placement invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementEngine {
    grid: GridModel,
    drag: DragSlot,
}

impl PlacementEngine {
    /// Creates an engine around an existing grid.
    pub fn new(grid: GridModel) -> Self {
        Self {
            grid,
            drag: DragSlot::default(),
        }
    }

    /// Read access to the authoritative grid.
    pub fn grid(&self) -> &GridModel {
        &self.grid
    }

    /// The in-progress drag session, if any.
    pub fn active_drag(&self) -> Option<&DragSession> {
        self.drag.active()
    }

    /// Replaces the grid, for example after loading a persisted layout.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidState`] while a drag is in progress.
    pub fn reset_grid(&mut self, grid: GridModel) -> Result<(), LayoutError> {
        if self.drag.active().is_some() {
            return Err(LayoutError::InvalidState(
                "cannot replace the grid during a drag",
            ));
        }
        self.grid = grid;
        Ok(())
    }

    /// Starts dragging `block_id`; the origin falls back to [`Cell::ORIGIN`] for unplaced blocks.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidState`] when another drag is active.
    pub fn begin_drag(&mut self, block_id: BlockId) -> Result<&DragSession, LayoutError> {
        self.drag.start(&self.grid, block_id, Cell::ORIGIN)
    }

    /// Resolves dropping `dragged` onto `target`.
    ///
    /// Dropping onto the block's own cell is a no-op. Dropping onto another block swaps the two
    /// (the occupant moves to the drag origin). Dropping onto an empty cell leaves the origin
    /// empty. The session is marked accepted in every successful case, and a repeated drop
    /// within an already-accepted session changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NoActiveDrag`] or [`LayoutError::DragMismatch`] when no session for
    /// `dragged` is active, and [`LayoutError::OutOfBounds`] for a target outside the columns.
    /// Returns [`LayoutError::ConsistencyFault`] if the resolution would break the placement
    /// invariants; the grid is then restored to its state before the call.
    pub fn resolve_drop(
        &mut self,
        dragged: &BlockId,
        target: Cell,
    ) -> Result<RelocationResult, LayoutError> {
        let session = self.session_for(dragged)?;
        if !self.grid.contains_cell(target) {
            return Err(LayoutError::OutOfBounds {
                cell: target,
                columns: self.grid.columns(),
            });
        }
        if session.is_accepted() {
            return Ok(RelocationResult::default());
        }
        let origin = session.origin();

        let displaced = self.grid.occupant_of(target).cloned();
        if displaced.as_ref() == Some(dragged) {
            self.drag.mark_accepted()?;
            return Ok(RelocationResult::default());
        }

        let last_known_good = self.grid.clone();
        let dragged_at_origin = self.grid.position_of(dragged) == Some(origin);
        match self.relocate(dragged, displaced, origin, target, dragged_at_origin) {
            Ok(result) => {
                self.drag.mark_accepted()?;
                Ok(result)
            }
            Err(err) => {
                self.grid = last_known_good;
                Err(err)
            }
        }
    }

    fn relocate(
        &mut self,
        dragged: &BlockId,
        displaced: Option<BlockId>,
        origin: Cell,
        target: Cell,
        dragged_at_origin: bool,
    ) -> Result<RelocationResult, LayoutError> {
        let mut changes = Vec::with_capacity(2);
        let vacated = match displaced {
            Some(displaced) => {
                if let Some(evicted) = self.grid.place(displaced.clone(), origin) {
                    if &evicted != dragged {
                        return Err(LayoutError::ConsistencyFault {
                            detail: format!(
                                "swap partner `{displaced}` would displace `{evicted}` at {origin}"
                            ),
                        });
                    }
                }
                changes.push(PositionChange::new(&displaced, origin));
                None
            }
            None => dragged_at_origin.then_some(origin),
        };

        if let Some(evicted) = self.grid.place(dragged.clone(), target) {
            return Err(LayoutError::ConsistencyFault {
                detail: format!("`{evicted}` still occupied {target} after relocation"),
            });
        }
        changes.push(PositionChange::new(dragged, target));

        self.grid.check_consistency()?;
        Ok(RelocationResult { changes, vacated })
    }

    /// Ends the drag of `block_id` after a gesture that may not have produced a drop.
    ///
    /// Returns a [`RestoreSignal`] when no drop was accepted, and `None` when the drop was
    /// accepted or the session already ended. The grid is never mutated.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::DragMismatch`] when a session for another block is active.
    pub fn cancel_drag(&mut self, block_id: &BlockId) -> Result<Option<RestoreSignal>, LayoutError> {
        match self.drag.active() {
            None => return Ok(None),
            Some(session) if session.block_id() != block_id => {
                return Err(LayoutError::DragMismatch {
                    active: session.block_id().clone(),
                    requested: block_id.clone(),
                })
            }
            Some(_) => {}
        }
        Ok(match self.end_drag()? {
            DragConclusion::Accepted { .. } => None,
            DragConclusion::Restored(signal) => Some(signal),
        })
    }

    /// Ends the active drag.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NoActiveDrag`] when no session is active.
    pub fn end_drag(&mut self) -> Result<DragConclusion, LayoutError> {
        let ended = self.drag.end()?;
        if ended.accepted {
            return Ok(DragConclusion::Accepted {
                block_id: ended.block_id,
            });
        }
        let cell = self.grid.position_of(&ended.block_id).unwrap_or(ended.origin);
        Ok(DragConclusion::Restored(RestoreSignal {
            block_id: ended.block_id,
            cell,
        }))
    }

    /// Places a newly enabled block and returns its cell.
    ///
    /// The remembered cell is used when it is inside the grid and empty; otherwise the block
    /// goes to the first free cell within `max_rows`. Existing placements are never moved, and an
    /// already placed block keeps its cell.
    pub fn activate_block(
        &mut self,
        block_id: BlockId,
        remembered: Option<Cell>,
        max_rows: u32,
    ) -> Cell {
        if let Some(cell) = self.grid.position_of(&block_id) {
            return cell;
        }
        let cell = remembered
            .filter(|cell| self.grid.contains_cell(*cell) && self.grid.occupant_of(*cell).is_none())
            .unwrap_or_else(|| self.grid.first_free_cell(max_rows));
        self.grid.place(block_id, cell);
        cell
    }

    /// Removes a disabled block, returning the cell it vacated.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidState`] when the block is being dragged.
    pub fn deactivate_block(&mut self, block_id: &BlockId) -> Result<Option<Cell>, LayoutError> {
        if self
            .drag
            .active()
            .is_some_and(|session| session.block_id() == block_id)
        {
            return Err(LayoutError::InvalidState(
                "cannot remove the block being dragged",
            ));
        }
        Ok(self.grid.remove(block_id))
    }

    fn session_for(&self, block_id: &BlockId) -> Result<DragSession, LayoutError> {
        let session = self.drag.active().ok_or(LayoutError::NoActiveDrag)?;
        if session.block_id() != block_id {
            return Err(LayoutError::DragMismatch {
                active: session.block_id().clone(),
                requested: block_id.clone(),
            });
        }
        Ok(session.clone())
    }

    #[cfg(test)]
    pub(crate) fn grid_mut_for_test(&mut self) -> &mut GridModel {
        &mut self.grid
    }
}

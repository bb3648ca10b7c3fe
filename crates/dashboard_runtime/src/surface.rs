//! Pointer-gesture controller that turns press/move/hover/release input into placement-engine
//! calls and render instructions.
//!
//! [`DashboardSurface`] is plain data with no DOM access, so the full drag lifecycle can be driven
//! from tests. The Leptos components only translate DOM events into the calls below and render
//! [`DashboardSurface::cells`].

use block_contract::BlockId;
use grid_layout::{
    Cell, DragConclusion, GridModel, LayoutError, Placement, PlacementEngine, PositionChange,
    ACTIVATION_SCAN_ROWS,
};
use serde::{Deserialize, Serialize};

/// Manhattan distance in pixels a pressed pointer must travel before a drag starts.
pub const DRAG_THRESHOLD_PX: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Viewport pointer coordinates in CSS pixels.
pub struct PointerPosition {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl PointerPosition {
    /// Creates a pointer position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn manhattan_distance(self, other: Self) -> i32 {
        (self.x - other.x).abs().saturating_add((self.y - other.y).abs())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Gesture {
    Idle,
    Pressed {
        block_id: BlockId,
        start: PointerPosition,
    },
    Dragging {
        block_id: BlockId,
        pointer: PointerPosition,
        hover: Option<Cell>,
    },
}

/// Render instruction for one grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellView {
    /// A block card.
    Card {
        /// Block shown in the cell.
        block_id: BlockId,
        /// Cell position.
        cell: Cell,
    },
    /// The origin cell of the block being dragged; rendered as a drop zone until the drag ends.
    Placeholder {
        /// Block being dragged.
        block_id: BlockId,
        /// Cell position.
        cell: Cell,
    },
    /// An empty cell accepting drops.
    DropZone(Cell),
}

impl CellView {
    /// Cell this view occupies.
    pub fn cell(&self) -> Cell {
        match self {
            Self::Card { cell, .. } | Self::Placeholder { cell, .. } => *cell,
            Self::DropZone(cell) => *cell,
        }
    }
}

/// Side effect requested by a gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEffect {
    /// Store the block's new cell in the configuration document.
    PersistPosition {
        /// Moved block.
        block_id: BlockId,
        /// Its new cell.
        cell: Cell,
    },
    /// A cell became empty and now renders as a drop zone.
    ShowDropZone(Cell),
    /// A drag ended without an accepted drop; the card reappears at `cell`.
    RestoreCard {
        /// Dragged block.
        block_id: BlockId,
        /// Unchanged cell.
        cell: Cell,
    },
}

impl From<PositionChange> for SurfaceEffect {
    fn from(change: PositionChange) -> Self {
        Self::PersistPosition {
            block_id: change.block_id,
            cell: change.cell,
        }
    }
}

/// Drag-and-drop controller over a [`PlacementEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSurface {
    engine: PlacementEngine,
    gesture: Gesture,
}

impl Default for DashboardSurface {
    fn default() -> Self {
        Self::new(PlacementEngine::default())
    }
}

impl DashboardSurface {
    /// Creates an idle surface around `engine`.
    pub fn new(engine: PlacementEngine) -> Self {
        Self {
            engine,
            gesture: Gesture::Idle,
        }
    }

    /// Authoritative grid.
    pub fn grid(&self) -> &GridModel {
        self.engine.grid()
    }

    /// Block currently being dragged.
    pub fn dragging(&self) -> Option<&BlockId> {
        match &self.gesture {
            Gesture::Dragging { block_id, .. } => Some(block_id),
            _ => None,
        }
    }

    /// Pointer position of the in-progress drag, for the floating card.
    pub fn drag_pointer(&self) -> Option<PointerPosition> {
        match &self.gesture {
            Gesture::Dragging { pointer, .. } => Some(*pointer),
            _ => None,
        }
    }

    /// Cell currently under the dragged card.
    pub fn hover_target(&self) -> Option<Cell> {
        match &self.gesture {
            Gesture::Dragging { hover, .. } => *hover,
            _ => None,
        }
    }

    /// Returns `true` while a press or drag is in progress.
    pub fn is_busy(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// Rebuilds the grid from persisted placements.
    ///
    /// Any unmoved press is dropped. Returns one [`SurfaceEffect::PersistPosition`] per placement
    /// that had to be relocated to keep cells unique.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidState`] while a drag is in progress.
    pub fn hydrate(
        &mut self,
        columns: u32,
        placements: Vec<Placement>,
    ) -> Result<Vec<SurfaceEffect>, LayoutError> {
        let (grid, relocations) = GridModel::hydrate(columns, placements, ACTIVATION_SCAN_ROWS);
        self.engine.reset_grid(grid)?;
        if matches!(self.gesture, Gesture::Pressed { .. }) {
            self.gesture = Gesture::Idle;
        }
        Ok(relocations.into_iter().map(SurfaceEffect::from).collect())
    }

    /// Records a press on a placed card.
    ///
    /// Presses are ignored during a drag and on blocks without a cell. Returns `true` when the
    /// press was recorded.
    pub fn press(&mut self, block_id: BlockId, pointer: PointerPosition) -> bool {
        if matches!(self.gesture, Gesture::Dragging { .. })
            || self.grid().position_of(&block_id).is_none()
        {
            return false;
        }
        self.gesture = Gesture::Pressed {
            block_id,
            start: pointer,
        };
        true
    }

    /// Tracks pointer movement.
    ///
    /// Starts the drag once a pressed pointer has travelled [`DRAG_THRESHOLD_PX`]. Returns
    /// `true` when this move started the drag.
    ///
    /// # Errors
    ///
    /// Propagates [`PlacementEngine::begin_drag`] failures; the press is discarded.
    pub fn pointer_moved(&mut self, pointer: PointerPosition) -> Result<bool, LayoutError> {
        match &mut self.gesture {
            Gesture::Idle => Ok(false),
            Gesture::Dragging { pointer: last, .. } => {
                *last = pointer;
                Ok(false)
            }
            Gesture::Pressed { block_id, start } => {
                if start.manhattan_distance(pointer) < DRAG_THRESHOLD_PX {
                    return Ok(false);
                }
                let block_id = block_id.clone();
                self.gesture = Gesture::Idle;
                self.engine.begin_drag(block_id.clone())?;
                self.gesture = Gesture::Dragging {
                    block_id,
                    pointer,
                    hover: None,
                };
                Ok(true)
            }
        }
    }

    /// Records the cell under the dragged card; cells outside the columns clear the target.
    pub fn hover(&mut self, cell: Option<Cell>) {
        let columns = self.grid().columns();
        if let Gesture::Dragging { hover, .. } = &mut self.gesture {
            *hover = cell.filter(|cell| cell.col < columns);
        }
    }

    /// Ends the gesture at the current hover target.
    ///
    /// A press that never moved is a click and produces nothing. A drag over a cell drops there;
    /// a drag released elsewhere restores the card.
    ///
    /// # Errors
    ///
    /// See [`DashboardSurface::drop_on`].
    pub fn release(&mut self) -> Result<Vec<SurfaceEffect>, LayoutError> {
        match &self.gesture {
            Gesture::Idle => Ok(Vec::new()),
            Gesture::Pressed { .. } => {
                self.gesture = Gesture::Idle;
                Ok(Vec::new())
            }
            Gesture::Dragging { hover: Some(cell), .. } => {
                let cell = *cell;
                self.drop_on(cell)
            }
            Gesture::Dragging { hover: None, .. } => self.abort(),
        }
    }

    #[cfg(test)]
    pub(crate) fn engine_mut_for_test(&mut self) -> &mut PlacementEngine {
        &mut self.engine
    }

    /// Drops the dragged card on `cell` and ends the drag.
    ///
    /// Outside a drag this does nothing. A cell outside the columns is treated as a cancel.
    ///
    /// # Errors
    ///
    /// Returns the engine's error when the drop cannot be resolved (for example
    /// [`LayoutError::ConsistencyFault`]). The drag is ended and the grid left at its
    /// last-known-good state before the error is returned.
    pub fn drop_on(&mut self, cell: Cell) -> Result<Vec<SurfaceEffect>, LayoutError> {
        let Gesture::Dragging { block_id, .. } = &self.gesture else {
            return Ok(Vec::new());
        };
        if !self.grid().contains_cell(cell) {
            return self.abort();
        }
        let block_id = block_id.clone();
        self.gesture = Gesture::Idle;

        let relocation = match self.engine.resolve_drop(&block_id, cell) {
            Ok(relocation) => relocation,
            Err(err) => {
                self.engine.cancel_drag(&block_id)?;
                return Err(err);
            }
        };
        let mut effects: Vec<SurfaceEffect> = relocation
            .changes
            .into_iter()
            .map(SurfaceEffect::from)
            .collect();
        effects.extend(relocation.vacated.map(SurfaceEffect::ShowDropZone));
        if let DragConclusion::Restored(signal) = self.engine.end_drag()? {
            effects.push(SurfaceEffect::RestoreCard {
                block_id: signal.block_id,
                cell: signal.cell,
            });
        }
        Ok(effects)
    }

    /// Cancels the gesture; an in-progress drag restores its card.
    ///
    /// # Errors
    ///
    /// Propagates [`PlacementEngine::cancel_drag`] failures.
    pub fn abort(&mut self) -> Result<Vec<SurfaceEffect>, LayoutError> {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        let Gesture::Dragging { block_id, .. } = gesture else {
            return Ok(Vec::new());
        };
        Ok(self
            .engine
            .cancel_drag(&block_id)?
            .map(|signal| SurfaceEffect::RestoreCard {
                block_id: signal.block_id,
                cell: signal.cell,
            })
            .into_iter()
            .collect())
    }

    /// Shows or hides a block.
    ///
    /// Enabling places the block at `remembered` when that cell is free, otherwise at the first
    /// free cell, and reports the cell as a position to persist. Disabling vacates its cell.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidState`] when disabling the block being dragged.
    pub fn toggle_block(
        &mut self,
        block_id: BlockId,
        enabled: bool,
        remembered: Option<Cell>,
    ) -> Result<Vec<SurfaceEffect>, LayoutError> {
        if enabled {
            let cell = self
                .engine
                .activate_block(block_id.clone(), remembered, ACTIVATION_SCAN_ROWS);
            return Ok(vec![SurfaceEffect::PersistPosition { block_id, cell }]);
        }

        let vacated = self.engine.deactivate_block(&block_id)?;
        if matches!(&self.gesture, Gesture::Pressed { block_id: pressed, .. } if pressed == &block_id)
        {
            self.gesture = Gesture::Idle;
        }
        Ok(vacated.map(SurfaceEffect::ShowDropZone).into_iter().collect())
    }

    /// Render instructions in row-major order covering at least `min_rows` rows and every
    /// occupied row.
    pub fn cells(&self, min_rows: u32) -> Vec<CellView> {
        let grid = self.grid();
        let rows = grid.row_count().max(min_rows);
        let dragging = self.dragging();
        (0..rows)
            .flat_map(|row| (0..grid.columns()).map(move |col| Cell::new(row, col)))
            .map(|cell| match grid.occupant_of(cell) {
                Some(block_id) if Some(block_id) == dragging => CellView::Placeholder {
                    block_id: block_id.clone(),
                    cell,
                },
                Some(block_id) => CellView::Card {
                    block_id: block_id.clone(),
                    cell,
                },
                None => CellView::DropZone(cell),
            })
            .collect()
    }
}

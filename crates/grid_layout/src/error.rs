use block_contract::BlockId;
use thiserror::Error;

use crate::Cell;

/// Errors raised by grid and drag-session operations.
///
/// `InvalidState`, `NoActiveDrag`, and `DragMismatch` signal a drag-session call outside its
/// lifecycle. They are programming errors in the calling surface, not user-facing conditions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A drag-session operation was invoked in a state that does not allow it.
    #[error("invalid drag state: {0}")]
    InvalidState(&'static str),
    /// An operation required an active drag session and none exists.
    #[error("no drag session is active")]
    NoActiveDrag,
    /// The operation names a different block than the active drag session.
    #[error("drag session is active for `{active}`, not `{requested}`")]
    DragMismatch {
        /// Block of the active session.
        active: BlockId,
        /// Block named by the caller.
        requested: BlockId,
    },
    /// A target cell lies outside the grid's columns.
    #[error("cell {cell} is outside a {columns}-column grid")]
    OutOfBounds {
        /// Rejected cell.
        cell: Cell,
        /// Column count of the grid.
        columns: u32,
    },
    /// The block has no placement record.
    #[error("block `{0}` is not placed on the grid")]
    UnknownBlock(BlockId),
    /// The placement invariants were found violated; the model was reset to its last-known-good
    /// state.
    #[error("grid consistency fault: {detail}")]
    ConsistencyFault {
        /// Description of the violated invariant.
        detail: String,
    },
}

//! Drag-and-drop grid layout engine for dashboard blocks.
//!
//! [`GridModel`] is the authoritative block-to-cell mapping, [`DragSlot`] tracks the single
//! in-progress [`DragSession`], and [`PlacementEngine`] resolves drops by swapping with (at most)
//! one displaced occupant. Everything here is synchronous and side-effect free; callers render
//! and persist the [`PositionChange`] notifications the engine returns.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod cell;
mod error;
mod grid;
mod placement;
mod session;

pub use cell::{Cell, Placement, PositionChange, DEFAULT_COLUMNS};
pub use error::LayoutError;
pub use grid::GridModel;
pub use placement::{DragConclusion, PlacementEngine, RelocationResult, RestoreSignal};
pub use session::{DragEnd, DragSession, DragSlot};

/// Row scan limit used when activating a block without a usable remembered cell.
pub const ACTIVATION_SCAN_ROWS: u32 = 5;

/// Number of rows always offered as drop targets, even when empty.
pub const PLACEHOLDER_ROWS: u32 = 3;

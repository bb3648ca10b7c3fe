use block_contract::BlockId;

use crate::{Cell, GridModel, LayoutError};

/// Ephemeral state of one in-progress drag gesture. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    block_id: BlockId,
    origin: Cell,
    accepted: bool,
}

impl DragSession {
    /// Block being dragged.
    pub fn block_id(&self) -> &BlockId {
        &self.block_id
    }

    /// Cell the block occupied when the drag started.
    pub fn origin(&self) -> Cell {
        self.origin
    }

    /// Whether a drop has been accepted during this session.
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }
}

/// Result of ending a drag session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEnd {
    /// Block that was dragged.
    pub block_id: BlockId,
    /// Cell captured at drag start.
    pub origin: Cell,
    /// Whether a drop was accepted; `false` means the caller must restore the card at `origin`.
    pub accepted: bool,
}

/// Holder for the single active [`DragSession`] (single-pointer interaction model).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragSlot {
    active: Option<DragSession>,
}

impl DragSlot {
    /// Starts a session for `block_id`.
    ///
    /// The origin is the block's current cell in `grid`, or `fallback` when the block is not
    /// placed.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidState`] when a session is already active; the existing
    /// session is left untouched.
    pub fn start(
        &mut self,
        grid: &GridModel,
        block_id: BlockId,
        fallback: Cell,
    ) -> Result<&DragSession, LayoutError> {
        if self.active.is_some() {
            return Err(LayoutError::InvalidState("a drag session is already active"));
        }
        let origin = grid.position_of(&block_id).unwrap_or(fallback);
        Ok(&*self.active.insert(DragSession {
            block_id,
            origin,
            accepted: false,
        }))
    }

    /// The active session, if any.
    pub fn active(&self) -> Option<&DragSession> {
        self.active.as_ref()
    }

    /// Flags the active session as accepted.
    ///
    /// Returns `true` when this call flipped the flag and `false` when it was already set, so
    /// duplicate drop events are harmless.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NoActiveDrag`] when no session is active.
    pub fn mark_accepted(&mut self) -> Result<bool, LayoutError> {
        let session = self.active.as_mut().ok_or(LayoutError::NoActiveDrag)?;
        if session.accepted {
            return Ok(false);
        }
        session.accepted = true;
        Ok(true)
    }

    /// Destroys the active session and reports whether a drop was accepted.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NoActiveDrag`] when no session is active.
    pub fn end(&mut self) -> Result<DragEnd, LayoutError> {
        let session = self.active.take().ok_or(LayoutError::NoActiveDrag)?;
        Ok(DragEnd {
            block_id: session.block_id,
            origin: session.origin,
            accepted: session.accepted,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn id(raw: &str) -> BlockId {
        BlockId::trusted(raw)
    }

    fn grid() -> GridModel {
        let mut grid = GridModel::default();
        grid.place(id("clock"), Cell::new(1, 2));
        grid
    }

    #[test]
    fn start_captures_current_cell_as_origin() {
        let mut slot = DragSlot::default();
        let session = slot
            .start(&grid(), id("clock"), Cell::ORIGIN)
            .expect("start drag");

        assert_eq!(session.origin(), Cell::new(1, 2));
        assert!(!session.is_accepted());
    }

    #[test]
    fn start_falls_back_when_block_is_not_placed() {
        let mut slot = DragSlot::default();
        let session = slot
            .start(&grid(), id("movies"), Cell::ORIGIN)
            .expect("start drag");
        assert_eq!(session.origin(), Cell::ORIGIN);
    }

    #[test]
    fn second_start_is_rejected_and_keeps_existing_session() {
        let grid = grid();
        let mut slot = DragSlot::default();
        slot.start(&grid, id("clock"), Cell::ORIGIN)
            .expect("first drag");
        slot.mark_accepted().expect("accept");
        let before = slot.clone();

        let err = slot
            .start(&grid, id("movies"), Cell::ORIGIN)
            .expect_err("concurrent drag rejected");

        assert!(matches!(err, LayoutError::InvalidState(_)));
        assert_eq!(slot, before);
        assert_eq!(slot.active().map(DragSession::block_id), Some(&id("clock")));
    }

    #[test]
    fn mark_accepted_is_idempotent() {
        let mut slot = DragSlot::default();
        slot.start(&grid(), id("clock"), Cell::ORIGIN)
            .expect("start drag");

        assert_eq!(slot.mark_accepted(), Ok(true));
        assert_eq!(slot.mark_accepted(), Ok(false));
        assert!(slot.active().is_some_and(DragSession::is_accepted));
    }

    #[test]
    fn end_reports_acceptance_and_clears_slot() {
        let mut slot = DragSlot::default();
        slot.start(&grid(), id("clock"), Cell::ORIGIN)
            .expect("start drag");

        let ended = slot.end().expect("end drag");
        assert_eq!(
            ended,
            DragEnd {
                block_id: id("clock"),
                origin: Cell::new(1, 2),
                accepted: false,
            }
        );
        assert!(slot.active().is_none());
        assert_eq!(slot.end(), Err(LayoutError::NoActiveDrag));
        assert_eq!(slot.mark_accepted(), Err(LayoutError::NoActiveDrag));
    }
}

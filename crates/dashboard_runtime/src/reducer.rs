//! Reducer actions, side-effect intents, and transition logic for the dashboard runtime.

use std::collections::BTreeSet;

use block_contract::{BlockDescriptor, BlockId};
use grid_layout::{Cell, LayoutError, DEFAULT_COLUMNS};
use platform_host::{BlockEntry, DashboardConfig};
use serde_json::Value;
use thiserror::Error;

use crate::{
    model::DashboardState,
    surface::{PointerPosition, SurfaceEffect},
};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_dashboard`] to mutate [`DashboardState`].
pub enum DashboardAction {
    /// Replace the configuration document and rebuild the grid from it.
    HydrateConfig {
        /// Loaded document.
        config: DashboardConfig,
    },
    /// Replace the block catalog.
    CatalogLoaded {
        /// Descriptors advertised by the host.
        catalog: Vec<BlockDescriptor>,
    },
    /// Mark boot hydration as finished.
    BootComplete,
    /// Primary pointer pressed on a card header.
    PointerDown {
        /// Pressed card.
        block_id: BlockId,
        /// Pointer position.
        pointer: PointerPosition,
    },
    /// Pointer moved anywhere over the dashboard.
    PointerMove {
        /// Pointer position.
        pointer: PointerPosition,
    },
    /// Pointer entered a cell (`Some`) or left the grid (`None`).
    HoverCell {
        /// Cell under the pointer.
        cell: Option<Cell>,
    },
    /// Pointer released.
    PointerUp,
    /// Drop on an explicit cell.
    DropOnCell {
        /// Target cell.
        cell: Cell,
    },
    /// Abort the current gesture (pointer cancel or Escape).
    CancelDrag,
    /// Show or hide a block.
    ToggleBlock {
        /// Block to toggle.
        block_id: BlockId,
        /// New visibility.
        enabled: bool,
    },
    /// Request a fetch for a block unless one is already in flight.
    RefreshRequested {
        /// Block to fetch.
        block_id: BlockId,
    },
    /// Fresh block data arrived from a fetch or the push channel.
    BlockDataReceived {
        /// Updated block.
        block_id: BlockId,
        /// Block payload.
        data: Value,
        /// Unix milliseconds of arrival.
        at_ms: u64,
    },
    /// A block fetch failed.
    BlockFetchFailed {
        /// Failed block.
        block_id: BlockId,
        /// User-facing error message.
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Side-effect intents emitted by the reducer and executed by the runtime host layer.
pub enum RuntimeEffect {
    /// Save the configuration document.
    PersistConfig,
    /// Fetch one block's data.
    FetchBlock(BlockId),
    /// Begin refreshing a block on its own cadence.
    StartPolling(BlockId),
    /// Stop refreshing a block.
    StopPolling(BlockId),
    /// A drop could not be resolved; the grid kept its last-known-good state.
    ReportLayoutFault(LayoutError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reducer errors for invalid actions.
pub enum ReducerError {
    /// A grid operation was invoked outside its lifecycle.
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// The action names a block that is neither configured nor in the catalog.
    #[error("block `{0}` is not in the catalog")]
    UnknownBlock(BlockId),
}

/// Applies a [`DashboardAction`] to the dashboard state and collects resulting side effects.
///
/// # Errors
///
/// Returns [`ReducerError::Layout`] when the grid rejects an operation and
/// [`ReducerError::UnknownBlock`] when toggling a block the host does not know. The caller
/// discards the partially updated state in both cases.
pub fn reduce_dashboard(
    state: &mut DashboardState,
    action: DashboardAction,
) -> Result<Vec<RuntimeEffect>, ReducerError> {
    let mut effects = Vec::new();
    match action {
        DashboardAction::HydrateConfig { config } => {
            let previously_enabled = enabled_ids(&state.config);
            state.config = config;
            let relocations = state
                .surface
                .hydrate(DEFAULT_COLUMNS, state.config.layout_entries())?;
            if apply_surface_effects(state, relocations) {
                effects.push(RuntimeEffect::PersistConfig);
            }

            let now_enabled = enabled_ids(&state.config);
            effects.extend(
                previously_enabled
                    .difference(&now_enabled)
                    .cloned()
                    .map(RuntimeEffect::StopPolling),
            );
            effects.extend(now_enabled.into_iter().map(RuntimeEffect::StartPolling));
        }
        DashboardAction::CatalogLoaded { catalog } => {
            state.catalog = catalog;
        }
        DashboardAction::BootComplete => {
            state.booted = true;
        }
        DashboardAction::PointerDown { block_id, pointer } => {
            state.surface.press(block_id, pointer);
        }
        DashboardAction::PointerMove { pointer } => {
            state.surface.pointer_moved(pointer)?;
        }
        DashboardAction::HoverCell { cell } => {
            state.surface.hover(cell);
        }
        DashboardAction::PointerUp => {
            let outcome = state.surface.release();
            finish_gesture(state, outcome, &mut effects);
        }
        DashboardAction::DropOnCell { cell } => {
            let outcome = state.surface.drop_on(cell);
            finish_gesture(state, outcome, &mut effects);
        }
        DashboardAction::CancelDrag => {
            let surface_effects = state.surface.abort()?;
            apply_surface_effects(state, surface_effects);
        }
        DashboardAction::ToggleBlock { block_id, enabled } => {
            if state.config.entry(&block_id).is_none() && state.descriptor(&block_id).is_none() {
                return Err(ReducerError::UnknownBlock(block_id));
            }
            if !state.config.set_enabled(&block_id, enabled) {
                return Ok(effects);
            }
            let remembered = state.config.entry(&block_id).map(BlockEntry::cell);
            let surface_effects = state
                .surface
                .toggle_block(block_id.clone(), enabled, remembered)?;
            apply_surface_effects(state, surface_effects);

            effects.push(RuntimeEffect::PersistConfig);
            effects.push(if enabled {
                RuntimeEffect::StartPolling(block_id)
            } else {
                RuntimeEffect::StopPolling(block_id)
            });
        }
        DashboardAction::RefreshRequested { block_id } => {
            if !state.is_enabled(&block_id) {
                return Ok(effects);
            }
            let status = state.blocks.entry(block_id.clone()).or_default();
            if !status.in_flight {
                status.in_flight = true;
                effects.push(RuntimeEffect::FetchBlock(block_id));
            }
        }
        DashboardAction::BlockDataReceived {
            block_id,
            data,
            at_ms,
        } => {
            let status = state.blocks.entry(block_id).or_default();
            status.data = Some(data);
            status.error = None;
            status.in_flight = false;
            status.updated_at_ms = Some(at_ms);
        }
        DashboardAction::BlockFetchFailed { block_id, error } => {
            let status = state.blocks.entry(block_id).or_default();
            status.error = Some(error);
            status.in_flight = false;
        }
    }

    Ok(effects)
}

fn enabled_ids(config: &DashboardConfig) -> BTreeSet<BlockId> {
    config
        .blocks
        .iter()
        .filter(|entry| entry.enabled)
        .map(|entry| entry.id.clone())
        .collect()
}

fn finish_gesture(
    state: &mut DashboardState,
    outcome: Result<Vec<SurfaceEffect>, LayoutError>,
    effects: &mut Vec<RuntimeEffect>,
) {
    match outcome {
        Ok(surface_effects) => {
            if apply_surface_effects(state, surface_effects) {
                effects.push(RuntimeEffect::PersistConfig);
            }
        }
        Err(err) => effects.push(RuntimeEffect::ReportLayoutFault(err)),
    }
}

/// Writes position changes into the configuration; returns `true` when any were recorded.
fn apply_surface_effects(state: &mut DashboardState, surface_effects: Vec<SurfaceEffect>) -> bool {
    let mut persisted = false;
    for effect in surface_effects {
        if let SurfaceEffect::PersistPosition { block_id, cell } = effect {
            persisted |= state.config.update_block_position(&block_id, cell);
        }
    }
    persisted
}

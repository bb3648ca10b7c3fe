//! Dashboard state held by the runtime signal.

use std::collections::BTreeMap;

use block_contract::{BlockDescriptor, BlockId};
use platform_host::DashboardConfig;
use serde_json::Value;

use crate::surface::DashboardSurface;

#[derive(Debug, Clone, PartialEq, Default)]
/// Fetch status of one block card.
pub struct BlockStatus {
    /// Last payload received successfully; kept across failed refreshes.
    pub data: Option<Value>,
    /// Message of the most recent failure, cleared by the next success.
    pub error: Option<String>,
    /// Whether a fetch is outstanding. At most one fetch per block runs at a time.
    pub in_flight: bool,
    /// Unix milliseconds of the last successful update.
    pub updated_at_ms: Option<u64>,
}

impl BlockStatus {
    /// Returns `true` when the card should show its error indicator.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Everything the dashboard shell renders.
pub struct DashboardState {
    /// Persisted configuration document.
    pub config: DashboardConfig,
    /// Grid and in-progress pointer gesture.
    pub surface: DashboardSurface,
    /// Blocks the host can fetch, in catalog order.
    pub catalog: Vec<BlockDescriptor>,
    /// Per-block fetch status.
    pub blocks: BTreeMap<BlockId, BlockStatus>,
    /// Set once boot hydration has finished.
    pub booted: bool,
}

impl DashboardState {
    /// Catalog descriptor for `block_id`.
    pub fn descriptor(&self, block_id: &BlockId) -> Option<&BlockDescriptor> {
        self.catalog.iter().find(|descriptor| &descriptor.id == block_id)
    }

    /// Whether `block_id` is enabled in the configuration.
    pub fn is_enabled(&self, block_id: &BlockId) -> bool {
        self.config
            .entry(block_id)
            .is_some_and(|entry| entry.enabled)
    }

    /// Fetch status for `block_id`; blocks never fetched report the default status.
    pub fn status(&self, block_id: &BlockId) -> BlockStatus {
        self.blocks.get(block_id).cloned().unwrap_or_default()
    }

    /// Card title for `block_id`, falling back to the raw id before the catalog loads.
    pub fn title_of(&self, block_id: &BlockId) -> String {
        self.descriptor(block_id)
            .map(|descriptor| descriptor.title.clone())
            .unwrap_or_else(|| block_id.to_string())
    }
}

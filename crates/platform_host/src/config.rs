//! Persisted dashboard configuration document.

use block_contract::{BlockId, BlockSettings};
use grid_layout::{Cell, Placement};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Storage key for the browser-persisted configuration document.
pub const DASHBOARD_CONFIG_KEY: &str = "bubble.dashboard.config.v1";

/// Window geometry and chrome preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowPrefs {
    /// Left edge in screen pixels.
    pub x: i32,
    /// Top edge in screen pixels.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Window opacity in `0.0..=1.0`.
    pub opacity: f64,
    /// Whether the window stays above others.
    pub always_on_top: bool,
}

impl Default for WindowPrefs {
    fn default() -> Self {
        Self {
            x: 50,
            y: 50,
            width: 1100,
            height: 700,
            opacity: 0.95,
            always_on_top: true,
        }
    }
}

/// One block's persisted state: visibility, grid cell and per-block settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockEntry {
    /// Block id.
    pub id: BlockId,
    /// Whether the block is shown on the grid.
    #[serde(default)]
    pub enabled: bool,
    /// Persisted row.
    #[serde(default)]
    pub grid_row: u32,
    /// Persisted column.
    #[serde(default)]
    pub grid_col: u32,
    /// Block settings handed to the block factory.
    #[serde(default)]
    pub config: BlockSettings,
}

impl BlockEntry {
    fn new(id: &str, enabled: bool, cell: Cell, config: serde_json::Value) -> Self {
        Self {
            id: BlockId::trusted(id),
            enabled,
            grid_row: cell.row,
            grid_col: cell.col,
            config: BlockSettings::from_value(config),
        }
    }

    /// Persisted cell.
    pub const fn cell(&self) -> Cell {
        Cell::new(self.grid_row, self.grid_col)
    }
}

/// Full persisted configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Window preferences.
    #[serde(default)]
    pub window: WindowPrefs,
    /// Known blocks, in catalog order.
    #[serde(default)]
    pub blocks: Vec<BlockEntry>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            window: WindowPrefs::default(),
            blocks: vec![
                BlockEntry::new("clock", true, Cell::new(0, 0), json!({})),
                BlockEntry::new(
                    "weather",
                    false,
                    Cell::new(0, 1),
                    json!({"city": "Paris", "api_key": "YOUR_OPENWEATHER_KEY"}),
                ),
                BlockEntry::new(
                    "emails",
                    false,
                    Cell::new(1, 0),
                    json!({
                        "imap_host": "imap.gmail.com",
                        "email": "YOUR_EMAIL",
                        "password": "YOUR_APP_PASSWORD",
                        "max_display": 5
                    }),
                ),
                BlockEntry::new(
                    "jobs",
                    false,
                    Cell::new(1, 1),
                    json!({"keywords": ["rust", "developer"], "location": "Paris"}),
                ),
                BlockEntry::new(
                    "movies",
                    false,
                    Cell::new(0, 2),
                    json!({"tmdb_api_key": "YOUR_TMDB_KEY", "language": "en-US"}),
                ),
            ],
        }
    }
}

impl DashboardConfig {
    /// Looks up a block entry.
    pub fn entry(&self, id: &BlockId) -> Option<&BlockEntry> {
        self.blocks.iter().find(|entry| &entry.id == id)
    }

    fn entry_mut(&mut self, id: &BlockId) -> Option<&mut BlockEntry> {
        self.blocks.iter_mut().find(|entry| &entry.id == id)
    }

    /// Records a block's new cell. Returns `false` when the block has no entry.
    pub fn update_block_position(&mut self, id: &BlockId, cell: Cell) -> bool {
        let Some(entry) = self.entry_mut(id) else {
            return false;
        };
        entry.grid_row = cell.row;
        entry.grid_col = cell.col;
        true
    }

    /// Records a block's visibility, adding an entry for catalog blocks that have none yet.
    ///
    /// Returns `true` when the stored value changed.
    pub fn set_enabled(&mut self, id: &BlockId, enabled: bool) -> bool {
        match self.entry_mut(id) {
            Some(entry) if entry.enabled == enabled => false,
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => {
                self.blocks.push(BlockEntry {
                    id: id.clone(),
                    enabled,
                    grid_row: 0,
                    grid_col: 0,
                    config: BlockSettings::default(),
                });
                true
            }
        }
    }

    /// Enabled blocks sorted by `(row, col)`.
    pub fn enabled_blocks(&self) -> Vec<&BlockEntry> {
        let mut enabled: Vec<&BlockEntry> =
            self.blocks.iter().filter(|entry| entry.enabled).collect();
        enabled.sort_by_key(|entry| entry.cell());
        enabled
    }

    /// Placements of enabled blocks for grid hydration.
    pub fn layout_entries(&self) -> Vec<Placement> {
        self.enabled_blocks()
            .into_iter()
            .map(|entry| Placement {
                block_id: entry.id.clone(),
                cell: entry.cell(),
            })
            .collect()
    }

    /// Settings for `id`, empty when the block has no entry.
    pub fn settings_for(&self, id: &BlockId) -> BlockSettings {
        self.entry(id)
            .map(|entry| entry.config.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn id(raw: &str) -> BlockId {
        BlockId::trusted(raw)
    }

    #[test]
    fn default_document_enables_only_clock() {
        let config = DashboardConfig::default();
        let enabled: Vec<&str> = config
            .enabled_blocks()
            .iter()
            .map(|entry| entry.id.as_str())
            .collect();
        assert_eq!(enabled, vec!["clock"]);
        assert_eq!(config.window.width, 1100);
        assert!(config.window.always_on_top);
    }

    #[test]
    fn enabled_blocks_sort_row_major() {
        let mut config = DashboardConfig::default();
        for raw in ["movies", "emails", "weather"] {
            config.set_enabled(&id(raw), true);
        }

        let order: Vec<&str> = config
            .enabled_blocks()
            .iter()
            .map(|entry| entry.id.as_str())
            .collect();
        assert_eq!(order, vec!["clock", "weather", "movies", "emails"]);
    }

    #[test]
    fn update_block_position_reports_unknown_ids() {
        let mut config = DashboardConfig::default();
        assert!(config.update_block_position(&id("jobs"), Cell::new(3, 2)));
        assert_eq!(
            config.entry(&id("jobs")).map(BlockEntry::cell),
            Some(Cell::new(3, 2))
        );
        assert!(!config.update_block_position(&id("stocks"), Cell::ORIGIN));
    }

    #[test]
    fn set_enabled_adds_missing_entries_and_reports_changes() {
        let mut config = DashboardConfig::default();
        assert!(!config.set_enabled(&id("clock"), true));
        assert!(config.set_enabled(&id("clock"), false));
        assert!(config.set_enabled(&id("notes"), true));
        assert_eq!(
            config.entry(&id("notes")).map(|entry| entry.enabled),
            Some(true)
        );
    }

    #[test]
    fn sparse_documents_fill_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{"blocks":[{"id":"clock","enabled":true}],"window":{"x":10}}"#)
                .expect("parse sparse config");

        assert_eq!(config.window.x, 10);
        assert_eq!(config.window.height, 700);
        assert_eq!(
            config.layout_entries(),
            vec![Placement {
                block_id: id("clock"),
                cell: Cell::ORIGIN,
            }]
        );
    }

    #[test]
    fn settings_for_returns_block_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.settings_for(&id("weather")).str("city"), Some("Paris"));
        assert!(config.settings_for(&id("stocks")).is_empty());
    }
}

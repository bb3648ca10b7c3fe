//! Typed Tauri command handlers backing the dashboard's configuration store and block feed.

use std::sync::{Mutex, MutexGuard};

use block_contract::{BlockDescriptor, BlockId, BlockRegistry, BlockResponse};
use platform_host::DashboardConfig;

use crate::config_store::{ConfigFileStore, WindowGeometry};

/// Host state shared by every command: the block registry and the configuration document.
pub(crate) struct DashboardHost {
    registry: BlockRegistry,
    store: ConfigFileStore,
    config: Mutex<DashboardConfig>,
}

impl DashboardHost {
    pub(crate) fn new(
        registry: BlockRegistry,
        store: ConfigFileStore,
        config: DashboardConfig,
    ) -> Self {
        Self {
            registry,
            store,
            config: Mutex::new(config),
        }
    }

    fn config(&self) -> Result<MutexGuard<'_, DashboardConfig>, String> {
        self.config
            .lock()
            .map_err(|_| "dashboard config lock poisoned".to_string())
    }

    pub(crate) fn record_geometry(&self, geometry: WindowGeometry) -> Result<(), String> {
        let updated = self.store.record_geometry(geometry)?;
        *self.config()? = updated;
        Ok(())
    }
}

/// Loads the configuration document.
#[tauri::command]
pub fn dashboard_config_load(
    host: tauri::State<'_, DashboardHost>,
) -> Result<Option<DashboardConfig>, String> {
    Ok(Some(host.config()?.clone()))
}

/// Saves the configuration document.
#[tauri::command]
pub fn dashboard_config_save(
    host: tauri::State<'_, DashboardHost>,
    config: DashboardConfig,
) -> Result<(), String> {
    host.store.save(&config)?;
    *host.config()? = config;
    Ok(())
}

/// Lists the built-in blocks in catalog order.
#[tauri::command]
pub fn block_catalog(host: tauri::State<'_, DashboardHost>) -> Vec<BlockDescriptor> {
    host.registry.descriptors()
}

/// Fetches one block on a blocking worker thread.
///
/// Block failures are returned inside the envelope; the command itself only fails when the
/// worker cannot be joined.
#[tauri::command]
pub async fn block_fetch(
    host: tauri::State<'_, DashboardHost>,
    block_id: String,
) -> Result<BlockResponse, String> {
    let block_id = match BlockId::new(block_id) {
        Ok(block_id) => block_id,
        Err(err) => return Ok(BlockResponse::failure(err)),
    };
    let settings = host.config()?.settings_for(&block_id);
    let Some(source) = host.registry.build(&block_id, &settings) else {
        return Ok(BlockResponse::failure(format!("unknown block `{block_id}`")));
    };

    let result = tauri::async_runtime::spawn_blocking(move || source.fetch())
        .await
        .map_err(|err| format!("block `{block_id}` worker failed: {err}"))?;
    if let Err(err) = &result {
        tracing::warn!(block = %block_id, error = %err, "block fetch failed");
    }
    Ok(BlockResponse::from(result))
}

/// Closes the dashboard window; the close handler writes the geometry back first.
#[tauri::command]
pub fn dashboard_window_close(window: tauri::WebviewWindow) -> Result<(), String> {
    window
        .close()
        .map_err(|err| format!("failed to close window: {err}"))
}

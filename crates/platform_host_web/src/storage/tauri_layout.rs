//! Tauri command-backed configuration store.
//!
//! The desktop host keeps the document as YAML under its app config directory; this adapter only
//! moves it across the IPC boundary.

use platform_host::{DashboardConfig, LayoutStore, LayoutStoreFuture};

#[derive(Debug, Clone, Copy, Default)]
/// Desktop configuration store backed by the `dashboard_config_*` commands.
pub struct TauriLayoutStore;

impl LayoutStore for TauriLayoutStore {
    fn load_layout<'a>(&'a self) -> LayoutStoreFuture<'a, Result<Option<DashboardConfig>, String>> {
        Box::pin(async move { crate::bridge::tauri_config_load().await })
    }

    fn save_layout<'a>(
        &'a self,
        config: &'a DashboardConfig,
    ) -> LayoutStoreFuture<'a, Result<(), String>> {
        Box::pin(async move { crate::bridge::tauri_config_save(config).await })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_tauri_store_matches_bridge_fallback_behavior() {
        let store: &dyn LayoutStore = &TauriLayoutStore;
        assert_eq!(block_on(store.load_layout()).expect("load"), None);
        block_on(store.save_layout(&DashboardConfig::default())).expect("save");
    }
}

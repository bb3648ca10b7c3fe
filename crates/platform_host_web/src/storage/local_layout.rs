//! `localStorage`-backed configuration store.
//!
//! The browser API is synchronous; the [`LayoutStore`] futures resolve immediately.

use platform_host::{
    decode_config_json, encode_config_json, DashboardConfig, LayoutStore, LayoutStoreFuture,
    DASHBOARD_CONFIG_KEY,
};

#[derive(Debug, Clone, Copy, Default)]
/// Browser configuration store backed by `window.localStorage`.
pub struct WebLayoutStore;

impl WebLayoutStore {
    /// Loads the raw JSON document.
    pub fn load_json(self) -> Option<String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = web_sys::window()?.local_storage().ok().flatten()?;
            storage.get_item(DASHBOARD_CONFIG_KEY).ok().flatten()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            None
        }
    }

    /// Saves the raw JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error when localStorage is unavailable or the write fails.
    pub fn save_json(self, raw_json: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok().flatten())
                .ok_or_else(|| "localStorage unavailable".to_string())?;
            storage
                .set_item(DASHBOARD_CONFIG_KEY, raw_json)
                .map_err(|e| format!("localStorage set_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = raw_json;
            Ok(())
        }
    }
}

impl LayoutStore for WebLayoutStore {
    fn load_layout<'a>(&'a self) -> LayoutStoreFuture<'a, Result<Option<DashboardConfig>, String>> {
        let store = *self;
        Box::pin(async move { store.load_json().as_deref().map(decode_config_json).transpose() })
    }

    fn save_layout<'a>(
        &'a self,
        config: &'a DashboardConfig,
    ) -> LayoutStoreFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.save_json(&encode_config_json(config)?) })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_local_store_is_empty_and_accepts_saves() {
        let store: &dyn LayoutStore = &WebLayoutStore;
        assert_eq!(block_on(store.load_layout()).expect("load"), None);
        block_on(store.save_layout(&DashboardConfig::default())).expect("save");
    }
}

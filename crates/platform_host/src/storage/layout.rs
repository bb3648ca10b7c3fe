//! Configuration-store contract and in-process adapters.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

use crate::DashboardConfig;

/// Object-safe boxed future used by [`LayoutStore`] async methods.
pub type LayoutStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service that loads and saves the dashboard configuration document.
pub trait LayoutStore {
    /// Loads the persisted document, or `None` when nothing has been saved yet.
    fn load_layout<'a>(&'a self) -> LayoutStoreFuture<'a, Result<Option<DashboardConfig>, String>>;

    /// Replaces the persisted document. Last write wins.
    fn save_layout<'a>(
        &'a self,
        config: &'a DashboardConfig,
    ) -> LayoutStoreFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Store that persists nothing; used on hosts without storage and in baseline tests.
pub struct NoopLayoutStore;

impl LayoutStore for NoopLayoutStore {
    fn load_layout<'a>(&'a self) -> LayoutStoreFuture<'a, Result<Option<DashboardConfig>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_layout<'a>(
        &'a self,
        _config: &'a DashboardConfig,
    ) -> LayoutStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory store; clones share the same document.
pub struct MemoryLayoutStore {
    inner: Rc<RefCell<Option<DashboardConfig>>>,
}

impl MemoryLayoutStore {
    /// Creates a store pre-seeded with `config`.
    pub fn with_config(config: DashboardConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Some(config))),
        }
    }

    /// Returns the currently stored document.
    pub fn snapshot(&self) -> Option<DashboardConfig> {
        self.inner.borrow().clone()
    }
}

impl LayoutStore for MemoryLayoutStore {
    fn load_layout<'a>(&'a self) -> LayoutStoreFuture<'a, Result<Option<DashboardConfig>, String>> {
        Box::pin(async move { Ok(self.inner.borrow().clone()) })
    }

    fn save_layout<'a>(
        &'a self,
        config: &'a DashboardConfig,
    ) -> LayoutStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            *self.inner.borrow_mut() = Some(config.clone());
            Ok(())
        })
    }
}

/// Loads the document through `store`, falling back to [`DashboardConfig::default`] when none
/// has been saved.
///
/// # Errors
///
/// Returns an error when the store fails to load.
pub async fn load_layout_or_default<S: LayoutStore + ?Sized>(
    store: &S,
) -> Result<DashboardConfig, String> {
    Ok(store.load_layout().await?.unwrap_or_default())
}

/// Decodes a JSON document as written by text-backed stores.
///
/// # Errors
///
/// Returns an error when `raw` is not a valid configuration document.
pub fn decode_config_json(raw: &str) -> Result<DashboardConfig, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid dashboard config: {e}"))
}

/// Encodes a document as JSON for text-backed stores.
///
/// # Errors
///
/// Returns an error when serialization fails.
pub fn encode_config_json(config: &DashboardConfig) -> Result<String, String> {
    serde_json::to_string(config).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use block_contract::BlockId;
    use futures::executor::block_on;
    use grid_layout::Cell;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn memory_store_round_trip_is_shared_between_clones() {
        let store = MemoryLayoutStore::default();
        let other = store.clone();
        let store_obj: &dyn LayoutStore = &store;

        assert_eq!(block_on(store_obj.load_layout()).expect("load"), None);

        let mut config = DashboardConfig::default();
        config.update_block_position(&BlockId::trusted("clock"), Cell::new(2, 1));
        block_on(store_obj.save_layout(&config)).expect("save");

        assert_eq!(other.snapshot(), Some(config));
    }

    #[test]
    fn load_or_default_falls_back_for_empty_store() {
        let loaded = block_on(load_layout_or_default(&NoopLayoutStore)).expect("load");
        assert_eq!(loaded, DashboardConfig::default());

        let seeded = MemoryLayoutStore::with_config(DashboardConfig {
            blocks: Vec::new(),
            ..DashboardConfig::default()
        });
        let loaded = block_on(load_layout_or_default(&seeded)).expect("load");
        assert!(loaded.blocks.is_empty());
    }

    #[test]
    fn noop_store_accepts_saves() {
        let store = NoopLayoutStore;
        block_on(store.save_layout(&DashboardConfig::default())).expect("save");
    }

    #[test]
    fn json_codec_reports_invalid_documents() {
        let raw = encode_config_json(&DashboardConfig::default()).expect("encode");
        assert_eq!(
            decode_config_json(&raw).expect("decode"),
            DashboardConfig::default()
        );
        let err = decode_config_json("{\"blocks\": 3}").expect_err("invalid");
        assert!(err.starts_with("invalid dashboard config"));
    }
}

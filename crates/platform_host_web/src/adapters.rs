use block_contract::{BlockDescriptor, BlockId, BlockResponse};
use platform_host::{
    BlockFeed, BlockFeedFuture, DashboardConfig, HostStrategy, LayoutStore, LayoutStoreFuture,
    MemoryLayoutStore, NoopBlockFeed, UpdateSink,
};

use crate::{ServerBlockFeed, TauriBlockFeed, TauriLayoutStore, WebLayoutStore};

#[cfg(all(feature = "desktop-host-stub", feature = "desktop-host-tauri"))]
compile_error!(
    "features `desktop-host-stub` and `desktop-host-tauri` are mutually exclusive; enable only one"
);

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(feature = "desktop-host-tauri")]
    {
        HostStrategy::DesktopTauri
    }

    #[cfg(feature = "desktop-host-stub")]
    {
        HostStrategy::DesktopStub
    }

    #[cfg(not(any(feature = "desktop-host-stub", feature = "desktop-host-tauri")))]
    {
        HostStrategy::Browser
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    selected_host_strategy().as_str()
}

/// Adapter enum that erases the concrete configuration backend behind [`LayoutStore`].
#[derive(Debug, Clone)]
pub enum LayoutStoreAdapter {
    /// Browser `localStorage` persistence.
    Browser(WebLayoutStore),
    /// YAML file owned by the Tauri host.
    DesktopTauri(TauriLayoutStore),
    /// In-memory document for the stub desktop build; lost on reload.
    DesktopStub(MemoryLayoutStore),
}

impl LayoutStore for LayoutStoreAdapter {
    fn load_layout<'a>(&'a self) -> LayoutStoreFuture<'a, Result<Option<DashboardConfig>, String>> {
        match self {
            Self::Browser(store) => store.load_layout(),
            Self::DesktopTauri(store) => store.load_layout(),
            Self::DesktopStub(store) => store.load_layout(),
        }
    }

    fn save_layout<'a>(
        &'a self,
        config: &'a DashboardConfig,
    ) -> LayoutStoreFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(store) => store.save_layout(config),
            Self::DesktopTauri(store) => store.save_layout(config),
            Self::DesktopStub(store) => store.save_layout(config),
        }
    }
}

/// Adapter enum that erases the concrete block-data backend behind [`BlockFeed`].
#[derive(Debug, Clone)]
pub enum BlockFeedAdapter {
    /// Dashboard server over HTTP and SSE.
    Browser(ServerBlockFeed),
    /// Tauri commands running the blocks natively.
    DesktopTauri(TauriBlockFeed),
    /// Empty catalog for the stub desktop build.
    DesktopStub(NoopBlockFeed),
}

impl BlockFeed for BlockFeedAdapter {
    fn catalog<'a>(&'a self) -> BlockFeedFuture<'a, Result<Vec<BlockDescriptor>, String>> {
        match self {
            Self::Browser(feed) => feed.catalog(),
            Self::DesktopTauri(feed) => feed.catalog(),
            Self::DesktopStub(feed) => feed.catalog(),
        }
    }

    fn fetch_block<'a>(
        &'a self,
        block_id: &'a BlockId,
    ) -> BlockFeedFuture<'a, Result<BlockResponse, String>> {
        match self {
            Self::Browser(feed) => feed.fetch_block(block_id),
            Self::DesktopTauri(feed) => feed.fetch_block(block_id),
            Self::DesktopStub(feed) => feed.fetch_block(block_id),
        }
    }

    fn subscribe(&self, sink: UpdateSink) -> Result<bool, String> {
        match self {
            Self::Browser(feed) => feed.subscribe(sink),
            Self::DesktopTauri(feed) => feed.subscribe(sink),
            Self::DesktopStub(feed) => feed.subscribe(sink),
        }
    }
}

/// Builds the configuration store for the compile-time selected host strategy.
pub fn layout_store() -> LayoutStoreAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => LayoutStoreAdapter::Browser(WebLayoutStore),
        HostStrategy::DesktopTauri => LayoutStoreAdapter::DesktopTauri(TauriLayoutStore),
        HostStrategy::DesktopStub => {
            LayoutStoreAdapter::DesktopStub(MemoryLayoutStore::default())
        }
    }
}

/// Builds the block feed for the compile-time selected host strategy.
pub fn block_feed() -> BlockFeedAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => BlockFeedAdapter::Browser(ServerBlockFeed::default()),
        HostStrategy::DesktopTauri => BlockFeedAdapter::DesktopTauri(TauriBlockFeed),
        HostStrategy::DesktopStub => BlockFeedAdapter::DesktopStub(NoopBlockFeed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(any(feature = "desktop-host-stub", feature = "desktop-host-tauri")))]
    #[test]
    fn default_build_selects_browser_adapters() {
        assert_eq!(selected_host_strategy(), HostStrategy::Browser);
        assert_eq!(host_strategy_name(), "browser");
        assert!(matches!(layout_store(), LayoutStoreAdapter::Browser(_)));
        assert!(matches!(block_feed(), BlockFeedAdapter::Browser(_)));
    }

    #[cfg(feature = "desktop-host-tauri")]
    #[test]
    fn tauri_feature_selects_desktop_adapters() {
        assert_eq!(selected_host_strategy(), HostStrategy::DesktopTauri);
        assert!(matches!(block_feed(), BlockFeedAdapter::DesktopTauri(_)));
    }
}

//! Typed host-domain contracts shared by the dashboard runtime and its host adapters.
//!
//! This crate owns the persisted configuration document, the configuration-store and block-feed
//! service traits, and in-memory adapters for tests. Browser and Tauri adapters live in
//! `platform_host_web`; the native desktop transport lives in `desktop_tauri`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod feed;
pub mod host;
pub mod storage;
pub mod time;

pub use config::{BlockEntry, DashboardConfig, WindowPrefs, DASHBOARD_CONFIG_KEY};
pub use feed::{BlockFeed, BlockFeedFuture, MemoryBlockFeed, NoopBlockFeed, UpdateSink};
pub use host::HostStrategy;
pub use storage::layout::{
    decode_config_json, encode_config_json, load_layout_or_default, LayoutStore,
    LayoutStoreFuture, MemoryLayoutStore, NoopLayoutStore,
};
pub use time::unix_time_ms_now;

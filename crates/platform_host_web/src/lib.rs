//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! This crate wires the dashboard runtime to its host: `localStorage` or Tauri commands for the
//! configuration document, and Tauri commands or the dashboard server's HTTP/SSE surface for
//! block data.
//!
//! Bridge bindings are split by domain under `bridge/`:
//! - `bridge::config`
//! - `bridge::blocks`
//! - `bridge::server`
//! - `bridge::window`
//! - `bridge::interop` (shared wasm/non-wasm transport glue)

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time host-strategy selection and concrete adapter factories for runtime wiring.
pub mod adapters;
mod bridge;
pub mod feed;
pub mod storage;
pub mod window;

pub use adapters::{
    block_feed, host_strategy_name, layout_store, selected_host_strategy, BlockFeedAdapter,
    LayoutStoreAdapter,
};
pub use feed::server_feed::{parse_update, ServerBlockFeed, DEFAULT_API_BASE, UPDATE_EVENT};
pub use feed::tauri_feed::TauriBlockFeed;
pub use storage::local_layout::WebLayoutStore;
pub use storage::tauri_layout::TauriLayoutStore;
pub use window::close_desktop_window;

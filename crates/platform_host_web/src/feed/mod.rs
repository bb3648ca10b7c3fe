//! Block-data feed adapters.

pub mod server_feed;
pub mod tauri_feed;

//! Host transport bridge for `platform_host_web` adapters.
//!
//! Organized by domain (`config`, `blocks`, `server`, `window`) over a shared `interop` layer that has a
//! `wasm32` implementation and a non-wasm fallback shim.

mod blocks;
mod config;
mod interop;
mod server;
mod window;

pub use blocks::{tauri_block_catalog, tauri_block_fetch};
pub use config::{tauri_config_load, tauri_config_save};
pub use server::{server_get_json, server_open_events};
pub use window::tauri_window_close;

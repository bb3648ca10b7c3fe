//! Configuration-store adapters.

pub mod local_layout;
pub mod tauri_layout;

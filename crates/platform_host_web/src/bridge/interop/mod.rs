//! Shared transport interop for bridge domains.
//!
//! Routes calls to target-specific implementations behind a uniform API.

use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde_json::Value;

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use non_wasm as imp;
#[cfg(target_arch = "wasm32")]
use wasm as imp;

pub async fn tauri_invoke<T: DeserializeOwned>(command: &str, args: Value) -> Result<T, String> {
    imp::tauri_invoke(command, args).await
}

pub async fn tauri_invoke_optional<T: DeserializeOwned>(
    command: &str,
    args: Value,
) -> Result<Option<T>, String> {
    imp::tauri_invoke_optional(command, args).await
}

pub async fn tauri_invoke_unit(command: &str, args: Value) -> Result<(), String> {
    imp::tauri_invoke_unit(command, args).await
}

pub async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    imp::fetch_json(url).await
}

pub fn open_event_stream(
    url: &str,
    event: &str,
    on_message: Rc<dyn Fn(String)>,
) -> Result<(), String> {
    imp::open_event_stream(url, event, on_message)
}

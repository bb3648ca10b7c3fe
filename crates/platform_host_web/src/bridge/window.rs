use serde_json::json;

pub async fn tauri_window_close() -> Result<(), String> {
    super::interop::tauri_invoke_unit("dashboard_window_close", json!({})).await
}

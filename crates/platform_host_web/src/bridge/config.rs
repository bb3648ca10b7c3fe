use platform_host::DashboardConfig;
use serde_json::json;

pub async fn tauri_config_load() -> Result<Option<DashboardConfig>, String> {
    super::interop::tauri_invoke_optional("dashboard_config_load", json!({})).await
}

pub async fn tauri_config_save(config: &DashboardConfig) -> Result<(), String> {
    super::interop::tauri_invoke_unit("dashboard_config_save", json!({ "config": config })).await
}

use super::*;

fn unsupported() -> String {
    "host transport is only available when compiled for wasm32".to_string()
}

pub async fn tauri_invoke<T: DeserializeOwned>(command: &str, _args: Value) -> Result<T, String> {
    Err(format!("`{command}`: {}", unsupported()))
}

pub async fn tauri_invoke_optional<T: DeserializeOwned>(
    _command: &str,
    _args: Value,
) -> Result<Option<T>, String> {
    Ok(None)
}

pub async fn tauri_invoke_unit(_command: &str, _args: Value) -> Result<(), String> {
    Ok(())
}

pub async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    Err(format!("GET {url}: {}", unsupported()))
}

pub fn open_event_stream(
    url: &str,
    _event: &str,
    _on_message: Rc<dyn Fn(String)>,
) -> Result<(), String> {
    Err(format!("event stream {url}: {}", unsupported()))
}

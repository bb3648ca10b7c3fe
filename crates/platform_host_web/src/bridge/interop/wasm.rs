use js_sys::Promise;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::*;

#[wasm_bindgen(inline_js = r#"
function tauriCore() {
  const tauri = globalThis.__TAURI__;
  if (!tauri || !tauri.core || typeof tauri.core.invoke !== 'function') {
    throw new Error('Tauri IPC is unavailable in this context');
  }
  return tauri.core;
}

export function jsTauriInvoke(command, args) {
  return Promise.resolve().then(() => tauriCore().invoke(command, args || {}));
}

export async function jsFetchJson(url) {
  const response = await fetch(url, { headers: { Accept: 'application/json' } });
  let body = null;
  try {
    body = await response.json();
  } catch (_) {
    body = null;
  }
  if (body === null) {
    throw new Error(`GET ${url} failed with HTTP ${response.status}`);
  }
  return body;
}

export function jsOpenEventStream(url, eventName, onMessage) {
  if (typeof EventSource === 'undefined') {
    throw new Error('EventSource is unavailable in this browser context');
  }
  const source = new EventSource(url);
  source.addEventListener(eventName, (event) => onMessage(String(event.data)));
  return source;
}
"#)]
extern "C" {
    #[wasm_bindgen(js_name = jsTauriInvoke)]
    fn js_tauri_invoke(command: &str, args: JsValue) -> Promise;
    #[wasm_bindgen(js_name = jsFetchJson)]
    fn js_fetch_json(url: &str) -> Promise;
    #[wasm_bindgen(catch, js_name = jsOpenEventStream)]
    fn js_open_event_stream(
        url: &str,
        event_name: &str,
        on_message: &Closure<dyn FnMut(String)>,
    ) -> Result<JsValue, JsValue>;
}

async fn await_promise(promise: Promise) -> Result<JsValue, String> {
    JsFuture::from(promise).await.map_err(js_error_to_string)
}

fn js_error_to_string(err: JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    if let Ok(message) = js_sys::Reflect::get(&err, &JsValue::from_str("message")) {
        if let Some(text) = message.as_string() {
            return text;
        }
    }
    format!("{err:?}")
}

fn to_js(args: &Value) -> Result<JsValue, String> {
    args.serialize(&Serializer::json_compatible())
        .map_err(|e| e.to_string())
}

pub async fn tauri_invoke<T: DeserializeOwned>(command: &str, args: Value) -> Result<T, String> {
    let value = await_promise(js_tauri_invoke(command, to_js(&args)?)).await?;
    from_value(value).map_err(|e| format!("`{command}` returned an unexpected payload: {e}"))
}

pub async fn tauri_invoke_optional<T: DeserializeOwned>(
    command: &str,
    args: Value,
) -> Result<Option<T>, String> {
    let value = await_promise(js_tauri_invoke(command, to_js(&args)?)).await?;
    if value.is_null() || value.is_undefined() {
        Ok(None)
    } else {
        from_value(value)
            .map(Some)
            .map_err(|e| format!("`{command}` returned an unexpected payload: {e}"))
    }
}

pub async fn tauri_invoke_unit(command: &str, args: Value) -> Result<(), String> {
    let _ = await_promise(js_tauri_invoke(command, to_js(&args)?)).await?;
    Ok(())
}

pub async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    let value = await_promise(js_fetch_json(url)).await?;
    from_value(value).map_err(|e| format!("GET {url} returned an unexpected payload: {e}"))
}

pub fn open_event_stream(
    url: &str,
    event: &str,
    on_message: Rc<dyn Fn(String)>,
) -> Result<(), String> {
    let closure = Closure::<dyn FnMut(String)>::new(move |data: String| on_message(data));
    js_open_event_stream(url, event, &closure).map_err(js_error_to_string)?;
    // The listener lives as long as the page.
    closure.forget();
    Ok(())
}

use std::rc::Rc;

use serde::de::DeserializeOwned;

pub async fn server_get_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    super::interop::fetch_json(url).await
}

pub fn server_open_events(
    url: &str,
    event: &str,
    on_message: Rc<dyn Fn(String)>,
) -> Result<(), String> {
    super::interop::open_event_stream(url, event, on_message)
}

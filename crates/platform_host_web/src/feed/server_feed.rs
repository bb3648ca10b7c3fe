//! Block feed for the browser front end of the dashboard server.
//!
//! Data is seeded with `GET /api/{id}` and kept fresh through the `/events` SSE stream.

use std::rc::Rc;

use block_contract::{BlockDescriptor, BlockId, BlockResponse, BlockUpdate};
use platform_host::{BlockFeed, BlockFeedFuture, UpdateSink};

/// Server address used when the build does not set `BUBBLE_API_BASE`.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// SSE event name carrying [`BlockUpdate`] payloads.
pub const UPDATE_EVENT: &str = "update";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Block feed talking to a `dashboard_server` instance.
pub struct ServerBlockFeed {
    base_url: String,
}

impl Default for ServerBlockFeed {
    fn default() -> Self {
        Self::new(option_env!("BUBBLE_API_BASE").unwrap_or(DEFAULT_API_BASE))
    }
}

impl ServerBlockFeed {
    /// Creates a feed for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Catalog endpoint.
    pub fn catalog_url(&self) -> String {
        format!("{}/api/blocks", self.base_url)
    }

    /// Data endpoint for one block.
    pub fn block_url(&self, block_id: &BlockId) -> String {
        format!("{}/api/{}", self.base_url, block_id)
    }

    /// SSE endpoint.
    pub fn events_url(&self) -> String {
        format!("{}/events", self.base_url)
    }
}

/// Decodes one SSE `update` payload.
///
/// # Errors
///
/// Returns an error when the payload is not a `{"block": .., "data": ..}` object.
pub fn parse_update(raw: &str) -> Result<BlockUpdate, String> {
    serde_json::from_str(raw).map_err(|e| format!("malformed block update: {e}"))
}

impl BlockFeed for ServerBlockFeed {
    fn catalog<'a>(&'a self) -> BlockFeedFuture<'a, Result<Vec<BlockDescriptor>, String>> {
        Box::pin(async move { crate::bridge::server_get_json(&self.catalog_url()).await })
    }

    fn fetch_block<'a>(
        &'a self,
        block_id: &'a BlockId,
    ) -> BlockFeedFuture<'a, Result<BlockResponse, String>> {
        Box::pin(async move { crate::bridge::server_get_json(&self.block_url(block_id)).await })
    }

    fn subscribe(&self, sink: UpdateSink) -> Result<bool, String> {
        let on_message = Rc::new(move |raw: String| match parse_update(&raw) {
            Ok(update) => sink(update),
            Err(err) => warn_console(&err),
        });
        crate::bridge::server_open_events(&self.events_url(), UPDATE_EVENT, on_message)?;
        Ok(true)
    }
}

fn warn_console(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&message.into());

    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn endpoints_are_derived_from_trimmed_base() {
        let feed = ServerBlockFeed::new("http://localhost:8000/");
        assert_eq!(feed.catalog_url(), "http://localhost:8000/api/blocks");
        assert_eq!(
            feed.block_url(&BlockId::trusted("weather")),
            "http://localhost:8000/api/weather"
        );
        assert_eq!(feed.events_url(), "http://localhost:8000/events");
    }

    #[test]
    fn parse_update_reads_broadcast_payload() {
        let update = parse_update(r#"{"block":"clock","data":{"time":"10:00:00"}}"#)
            .expect("valid update");
        assert_eq!(
            update,
            BlockUpdate {
                block: BlockId::trusted("clock"),
                data: json!({"time": "10:00:00"}),
            }
        );
        assert!(parse_update("{\"data\":1}").is_err());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_subscribe_fails_so_runtime_falls_back_to_polling() {
        let feed = ServerBlockFeed::default();
        assert!(feed.subscribe(Rc::new(|_| {})).is_err());
    }
}

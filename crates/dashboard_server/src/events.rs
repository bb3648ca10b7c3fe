//! Server-Sent-Events push channel.
//!
//! Every `/events` connection registers a listener with the [`EventHub`]. Broadcasts are
//! queued on each listener's channel and written by the connection's own thread, so a slow
//! client never stalls the scheduler. A listener whose connection is gone is dropped on the
//! next broadcast.

use std::io::{self, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use block_contract::{BlockId, BlockUpdate};
use serde_json::Value;

use crate::cache::BlockCache;

/// SSE event name carrying `{"block": id, "data": ...}` payloads.
pub const UPDATE_EVENT: &str = "update";

/// Interval between keepalive comments on an idle stream.
pub const KEEPALIVE: Duration = Duration::from_secs(15);

const RECONNECT_MS: u64 = 3000;
const POLL: Duration = Duration::from_millis(250);

/// One serialized update ready to be written to a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFrame {
    /// Monotonic event id.
    pub id: u64,
    /// JSON-encoded [`BlockUpdate`].
    pub data: String,
}

/// Fan-out of block updates to connected SSE listeners.
#[derive(Debug, Default)]
pub struct EventHub {
    listeners: Mutex<Vec<Sender<EventFrame>>>,
    next_id: AtomicU64,
}

impl EventHub {
    /// Creates a hub with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    fn frame(&self, block: BlockId, data: Value) -> Option<EventFrame> {
        let payload = serde_json::to_string(&BlockUpdate { block, data }).ok()?;
        Some(EventFrame {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            data: payload,
        })
    }

    /// Registers a listener.
    pub fn subscribe(&self) -> Receiver<EventFrame> {
        let (tx, rx) = mpsc::channel();
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Number of live listeners as of the last broadcast.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Sends an update to every listener and drops the ones that are gone.
    pub fn broadcast(&self, block: &BlockId, data: &Value) {
        let Some(frame) = self.frame(block.clone(), data.clone()) else {
            return;
        };
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|listener| listener.send(frame.clone()).is_ok());
    }

    /// Frames replaying every cached entry, for a listener that just connected.
    pub fn replay(&self, cache: &BlockCache) -> Vec<EventFrame> {
        cache
            .snapshot()
            .into_iter()
            .filter_map(|(block, data)| self.frame(block, data))
            .collect()
    }
}

/// Writes one SSE event.
///
/// # Errors
///
/// Returns the socket error when the client is gone.
pub fn write_sse_event(
    stream: &mut impl Write,
    id: Option<&str>,
    event: &str,
    data: &str,
) -> io::Result<()> {
    let mut out = String::new();
    if let Some(id) = id {
        out.push_str("id: ");
        out.push_str(id);
        out.push('\n');
    }
    out.push_str("event: ");
    out.push_str(event);
    out.push('\n');
    for line in data.lines() {
        out.push_str("data: ");
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
    stream.write_all(out.as_bytes())?;
    stream.flush()
}

fn write_frame(stream: &mut impl Write, frame: &EventFrame) -> io::Result<()> {
    write_sse_event(stream, Some(&frame.id.to_string()), UPDATE_EVENT, &frame.data)
}

fn write_stream_headers(stream: &mut impl Write) -> io::Result<()> {
    let headers = concat!(
        "HTTP/1.1 200 OK\r\n",
        "Content-Type: text/event-stream\r\n",
        "Cache-Control: no-store\r\n",
        "Connection: keep-alive\r\n",
        "Access-Control-Allow-Origin: *\r\n",
        "X-Accel-Buffering: no\r\n",
        "\r\n",
    );
    stream.write_all(headers.as_bytes())?;
    stream.write_all(format!("retry: {RECONNECT_MS}\n\n").as_bytes())?;
    stream.flush()
}

/// Serves one `/events` connection until the client leaves or the server shuts down.
///
/// The listener is registered before the cache is replayed so no refresh can slip between
/// the replay and the live stream; a block may arrive twice, never zero times.
///
/// # Errors
///
/// Returns the socket error that ended the stream.
pub fn serve_event_stream(
    mut stream: TcpStream,
    hub: &EventHub,
    cache: &BlockCache,
    shutdown: &AtomicBool,
) -> io::Result<()> {
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let updates = hub.subscribe();
    write_stream_headers(&mut stream)?;
    for frame in hub.replay(cache) {
        write_frame(&mut stream, &frame)?;
    }

    let mut last_write = Instant::now();
    while !shutdown.load(Ordering::Relaxed) {
        match updates.recv_timeout(POLL) {
            Ok(frame) => {
                write_frame(&mut stream, &frame)?;
                last_write = Instant::now();
            }
            Err(RecvTimeoutError::Timeout) => {
                if last_write.elapsed() >= KEEPALIVE {
                    stream.write_all(b": keepalive\n\n")?;
                    stream.flush()?;
                    last_write = Instant::now();
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn sse_event_frames_id_event_and_each_data_line() {
        let mut out = Vec::new();
        write_sse_event(&mut out, Some("7"), "update", "{\"a\":1}\n{\"b\":2}").expect("write");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "id: 7\nevent: update\ndata: {\"a\":1}\ndata: {\"b\":2}\n\n"
        );
    }

    #[test]
    fn broadcast_reaches_listeners_and_drops_dead_ones() {
        let hub = EventHub::new();
        let live = hub.subscribe();
        drop(hub.subscribe());
        assert_eq!(hub.listener_count(), 2);

        hub.broadcast(&BlockId::trusted("clock"), &json!({"time": "09:00:00"}));

        assert_eq!(hub.listener_count(), 1);
        let frame = live.try_recv().expect("frame");
        assert_eq!(frame.id, 1);
        assert_eq!(frame.data, r#"{"block":"clock","data":{"time":"09:00:00"}}"#);
    }

    #[test]
    fn replay_covers_every_cached_block_in_id_order() {
        let hub = EventHub::new();
        let cache = BlockCache::new();
        cache.insert(BlockId::trusted("weather"), json!({"temp": 18}));
        cache.insert(BlockId::trusted("clock"), json!({"time": "09:00:00"}));

        let frames = hub.replay(&cache);
        let blocks: Vec<String> = frames
            .iter()
            .map(|frame| {
                let update: BlockUpdate = serde_json::from_str(&frame.data).expect("update");
                update.block.to_string()
            })
            .collect();
        assert_eq!(blocks, vec!["clock", "weather"]);
        assert_eq!(frames[1].id, 2);
    }
}

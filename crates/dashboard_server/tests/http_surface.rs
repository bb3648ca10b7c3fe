use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use block_contract::{
    BlockDescriptor, BlockId, BlockRegistry, BlockSettings, BlockSource, BlockUpdate, FetchError,
};
use dashboard_server::{DashboardServer, ServerState};
use platform_host::DashboardConfig;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

struct Greeting(BlockDescriptor);

impl BlockSource for Greeting {
    fn descriptor(&self) -> &BlockDescriptor {
        &self.0
    }

    fn fetch(&self) -> Result<Value, FetchError> {
        Ok(json!({"text": "hello"}))
    }
}

struct Offline(BlockDescriptor);

impl BlockSource for Offline {
    fn descriptor(&self) -> &BlockDescriptor {
        &self.0
    }

    fn fetch(&self) -> Result<Value, FetchError> {
        Err(FetchError::Http("upstream unreachable".to_string()))
    }
}

fn greeting_descriptor() -> BlockDescriptor {
    BlockDescriptor::new("greeting", "Greeting", "GRT-01", 3600)
}

fn offline_descriptor() -> BlockDescriptor {
    BlockDescriptor::new("offline", "Offline", "OFF-02", 3600)
}

fn build_greeting(_: &BlockSettings) -> Box<dyn BlockSource> {
    Box::new(Greeting(greeting_descriptor()))
}

fn build_offline(_: &BlockSettings) -> Box<dyn BlockSource> {
    Box::new(Offline(offline_descriptor()))
}

struct RunningServer {
    addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RunningServer {
    fn start() -> Self {
        let mut registry = BlockRegistry::new();
        registry
            .register(greeting_descriptor(), build_greeting)
            .expect("register greeting");
        registry
            .register(offline_descriptor(), build_offline)
            .expect("register offline");
        let state = ServerState::new(registry, &DashboardConfig::default());
        let server = DashboardServer::bind("127.0.0.1:0", state).expect("bind ephemeral port");
        let addr = server.local_addr().expect("local addr");
        let shutdown = Arc::new(AtomicBool::new(false));
        let run_shutdown = Arc::clone(&shutdown);
        let handle = thread::spawn(move || {
            server.run(run_shutdown).expect("server run");
        });
        Self {
            addr,
            shutdown,
            handle: Some(handle),
        }
    }

    fn get(&self, path: &str) -> (u16, String, Value) {
        let mut stream = TcpStream::connect(self.addr).expect("connect");
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("read timeout");
        write!(stream, "GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n").expect("send");
        let mut raw = String::new();
        stream.read_to_string(&mut raw).expect("read response");

        let (head, body) = raw.split_once("\r\n\r\n").expect("header terminator");
        let status = head
            .split_whitespace()
            .nth(1)
            .and_then(|code| code.parse().ok())
            .expect("status code");
        let body = serde_json::from_str(body).expect("json body");
        (status, head.to_string(), body)
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[test]
fn status_lists_cached_blocks_after_first_fetch() {
    let server = RunningServer::start();

    let (status, _, body) = server.get("/api/status");
    assert_eq!(status, 200);
    assert_eq!(body, json!({"status": "ok", "cached_blocks": []}));

    let (status, head, body) = server.get("/api/greeting");
    assert_eq!(status, 200);
    assert!(head.contains("Access-Control-Allow-Origin: *"));
    assert_eq!(body, json!({"ok": true, "data": {"text": "hello"}}));

    let (_, _, body) = server.get("/api/status");
    assert_eq!(body, json!({"status": "ok", "cached_blocks": ["greeting"]}));
}

#[test]
fn catalog_lists_registered_blocks_in_order() {
    let server = RunningServer::start();
    let (status, _, body) = server.get("/api/blocks");
    assert_eq!(status, 200);
    let catalog: Vec<BlockDescriptor> = serde_json::from_value(body).expect("catalog");
    assert_eq!(catalog, vec![greeting_descriptor(), offline_descriptor()]);
}

#[test]
fn unknown_block_is_404_and_failing_block_is_500() {
    let server = RunningServer::start();

    let (status, _, body) = server.get("/api/nope");
    assert_eq!(status, 404);
    assert_eq!(body, json!({"ok": false, "error": "unknown block `nope`"}));

    let (status, _, body) = server.get("/api/offline");
    assert_eq!(status, 500);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["error"], json!("request failed: upstream unreachable"));

    let (_, _, body) = server.get("/api/status");
    assert_eq!(body["cached_blocks"], json!([]));
}

#[test]
fn event_stream_replays_cached_blocks_on_connect() {
    let server = RunningServer::start();
    server.get("/api/greeting");

    let mut stream = TcpStream::connect(server.addr).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("read timeout");
    write!(stream, "GET /events HTTP/1.1\r\nHost: localhost\r\n\r\n").expect("send");

    let mut reader = BufReader::new(stream);
    let mut event = None;
    let mut data = None;
    let mut line = String::new();
    while data.is_none() {
        line.clear();
        let read = reader.read_line(&mut line).expect("read line");
        assert!(read > 0, "stream closed before an update arrived");
        if let Some(name) = line.trim_end().strip_prefix("event: ") {
            event = Some(name.to_string());
        }
        if let Some(payload) = line.trim_end().strip_prefix("data: ") {
            data = Some(payload.to_string());
        }
    }

    assert_eq!(event.as_deref(), Some("update"));
    let update: BlockUpdate = serde_json::from_str(&data.expect("data")).expect("update");
    assert_eq!(
        update,
        BlockUpdate {
            block: BlockId::trusted("greeting"),
            data: json!({"text": "hello"}),
        }
    );
}

//! Minimal HTTP/1.1 handling for the JSON API.
//!
//! Every response closes the connection except `/events`, which stays open as an SSE stream.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use block_contract::BlockResponse;
use serde_json::{json, Value};

use crate::events::serve_event_stream;
use crate::state::{LookupError, ServerState};

const MAX_HEADER_BYTES: usize = 8192;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HttpRequest {
    pub(crate) method: String,
    pub(crate) path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Route {
    Status,
    Catalog,
    Block(String),
    Events,
    Preflight,
    MethodNotAllowed,
    NotFound,
}

pub(crate) fn read_request(stream: &mut impl Read) -> io::Result<Option<HttpRequest>> {
    let mut buf = [0u8; 1024];
    let mut data = Vec::<u8>::new();
    loop {
        let read = match stream.read(&mut buf) {
            Ok(read) => read,
            Err(err)
                if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
            {
                break;
            }
            Err(err) => return Err(err),
        };
        if read == 0 {
            break;
        }
        data.extend_from_slice(&buf[..read]);
        if data.windows(4).any(|w| w == b"\r\n\r\n") || data.len() > MAX_HEADER_BYTES {
            break;
        }
    }
    if data.is_empty() {
        return Ok(None);
    }

    let header_text = String::from_utf8_lossy(&data);
    let Some(request_line) = header_text.split("\r\n").next() else {
        return Ok(None);
    };
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_ascii_uppercase();
    let path = parts.next().unwrap_or("/").to_string();
    if method.is_empty() {
        return Ok(None);
    }
    Ok(Some(HttpRequest { method, path }))
}

fn normalize_path(raw: &str) -> &str {
    let raw = raw.trim();
    let raw = raw.split(['?', '#']).next().unwrap_or(raw);
    let raw = raw.trim_end_matches('/');
    if raw.is_empty() {
        "/"
    } else {
        raw
    }
}

pub(crate) fn route(method: &str, path: &str) -> Route {
    match method {
        "OPTIONS" => return Route::Preflight,
        "GET" | "HEAD" => {}
        _ => return Route::MethodNotAllowed,
    }
    match normalize_path(path) {
        "/api/status" => Route::Status,
        "/api/blocks" => Route::Catalog,
        "/events" => Route::Events,
        other => match other.strip_prefix("/api/") {
            Some(id) if !id.is_empty() && !id.contains('/') => Route::Block(id.to_string()),
            _ => Route::NotFound,
        },
    }
}

pub(crate) fn write_response(
    stream: &mut impl Write,
    status: &str,
    content_type: &str,
    body: &[u8],
    head_only: bool,
) -> io::Result<()> {
    let mut headers = String::new();
    headers.push_str("HTTP/1.1 ");
    headers.push_str(status);
    headers.push_str("\r\n");
    headers.push_str("Content-Type: ");
    headers.push_str(content_type);
    headers.push_str("\r\n");
    headers.push_str("Cache-Control: no-store\r\n");
    headers.push_str("Access-Control-Allow-Origin: *\r\n");
    headers.push_str("Access-Control-Allow-Methods: GET, HEAD, OPTIONS\r\n");
    headers.push_str("Access-Control-Allow-Headers: *\r\n");
    headers.push_str("Connection: close\r\n");
    headers.push_str("Content-Length: ");
    headers.push_str(&body.len().to_string());
    headers.push_str("\r\n\r\n");

    stream.write_all(headers.as_bytes())?;
    if !head_only {
        stream.write_all(body)?;
    }
    stream.flush()
}

fn write_json(
    stream: &mut impl Write,
    status: &str,
    body: &Value,
    head_only: bool,
) -> io::Result<()> {
    write_response(
        stream,
        status,
        "application/json; charset=utf-8",
        body.to_string().as_bytes(),
        head_only,
    )
}

fn write_envelope(
    stream: &mut impl Write,
    status: &str,
    envelope: BlockResponse,
    head_only: bool,
) -> io::Result<()> {
    let body = serde_json::to_value(envelope).unwrap_or(Value::Null);
    write_json(stream, status, &body, head_only)
}

pub(crate) fn handle_connection(
    mut stream: TcpStream,
    state: &ServerState,
    shutdown: &AtomicBool,
) -> io::Result<()> {
    let _ = stream.set_nonblocking(false);
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(request) = read_request(&mut stream)? else {
        return Ok(());
    };
    let head_only = request.method == "HEAD";

    match route(&request.method, &request.path) {
        Route::Preflight => write_response(&mut stream, "204 No Content", "text/plain", b"", false),
        Route::MethodNotAllowed => write_envelope(
            &mut stream,
            "405 Method Not Allowed",
            BlockResponse::failure("method not allowed"),
            head_only,
        ),
        Route::NotFound => write_envelope(
            &mut stream,
            "404 Not Found",
            BlockResponse::failure(format!("no route for {}", request.path)),
            head_only,
        ),
        Route::Status => {
            let body = json!({"status": "ok", "cached_blocks": state.cache().ids()});
            write_json(&mut stream, "200 OK", &body, head_only)
        }
        Route::Catalog => {
            let body = serde_json::to_value(state.catalog()).unwrap_or(Value::Null);
            write_json(&mut stream, "200 OK", &body, head_only)
        }
        Route::Block(raw_id) => match state.lookup(&raw_id) {
            Ok(data) => write_envelope(&mut stream, "200 OK", BlockResponse::success(data), head_only),
            Err(err @ LookupError::Unknown(_)) => write_envelope(
                &mut stream,
                "404 Not Found",
                BlockResponse::failure(err.to_string()),
                head_only,
            ),
            Err(LookupError::Fetch(err)) => {
                tracing::warn!(block = %raw_id, error = %err, "block fetch failed");
                write_envelope(
                    &mut stream,
                    "500 Internal Server Error",
                    BlockResponse::failure(err.to_string()),
                    head_only,
                )
            }
        },
        Route::Events => serve_event_stream(stream, state.hub(), state.cache(), shutdown),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn request_line_is_parsed_and_method_uppercased() {
        let mut raw: &[u8] = b"get /api/status?x=1 HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let request = read_request(&mut raw).expect("read").expect("request");
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/api/status?x=1");
    }

    #[test]
    fn empty_connection_yields_no_request() {
        let mut raw: &[u8] = b"";
        assert_eq!(read_request(&mut raw).expect("read"), None);
    }

    #[test]
    fn routes_resolve_fixed_endpoints_before_block_ids() {
        assert_eq!(route("GET", "/api/status"), Route::Status);
        assert_eq!(route("GET", "/api/blocks/"), Route::Catalog);
        assert_eq!(route("HEAD", "/events?lastEventId=3"), Route::Events);
        assert_eq!(route("GET", "/api/weather"), Route::Block("weather".to_string()));
        assert_eq!(route("GET", "/api/a/b"), Route::NotFound);
        assert_eq!(route("GET", "/"), Route::NotFound);
        assert_eq!(route("OPTIONS", "/api/clock"), Route::Preflight);
        assert_eq!(route("POST", "/api/clock"), Route::MethodNotAllowed);
    }

    #[test]
    fn responses_carry_cors_and_length_headers() {
        let mut out = Vec::new();
        write_response(&mut out, "200 OK", "application/json", b"{}", false).expect("write");
        let text = String::from_utf8(out).expect("utf8");

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Access-Control-Allow-Origin: *\r\n"));
        assert!(text.contains("Content-Length: 2\r\n"));
        assert!(text.ends_with("\r\n\r\n{}"));
    }

    #[test]
    fn head_responses_omit_the_body() {
        let mut out = Vec::new();
        write_response(&mut out, "200 OK", "application/json", b"{}", true).expect("write");
        assert!(String::from_utf8(out).expect("utf8").ends_with("\r\n\r\n"));
    }
}

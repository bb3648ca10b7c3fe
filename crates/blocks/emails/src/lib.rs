//! Unread inbox summary over IMAPS.

use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use block_contract::{BlockDescriptor, BlockSettings, BlockSource, FetchError};
use mailparse::MailHeaderMap;
use serde::Serialize;
use serde_json::Value;

/// Registry id of the emails block.
pub const BLOCK_ID: &str = "emails";

const IMAPS_PORT: u16 = 993;
const SOCKET_TIMEOUT: Duration = Duration::from_secs(15);

/// Static descriptor: refreshed every two minutes.
pub fn descriptor() -> BlockDescriptor {
    BlockDescriptor::new(BLOCK_ID, "Emails", "EML-02", 120)
}

/// One unread message header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailSummary {
    /// Sender display name.
    pub from: String,
    /// Decoded subject.
    pub subject: String,
    /// Relative receive time.
    pub date: String,
    /// Always `true`; only unseen messages are listed.
    pub unread: bool,
}

/// Emails payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inbox {
    /// Most recent unread messages, newest first.
    pub emails: Vec<EmailSummary>,
    /// Total unread count in the inbox.
    pub total: usize,
    /// Always `None` on success; failures travel as [`FetchError`].
    pub error: Option<String>,
}

/// Extracts a display name from a `From` header value.
///
/// `"Jane Doe" <jane@x.io>` yields `Jane Doe`; a bare address yields its local part.
pub fn extract_name(from: &str) -> String {
    let from = from.trim();
    if from.is_empty() {
        return "Unknown".to_string();
    }
    if let Some((display, _)) = from.split_once('<') {
        let display = display.trim().trim_matches('"').trim();
        if !display.is_empty() {
            return display.to_string();
        }
    }
    let local: String = from
        .chars()
        .take_while(|c| *c != '@' && *c != '<' && !c.is_whitespace())
        .collect();
    if local.is_empty() {
        from.split('@').next().unwrap_or(from).to_string()
    } else {
        local
    }
}

/// Formats the age of a message given `now` and the message's `Date` header, both as unix
/// seconds and raw header text respectively.
///
/// Unparseable dates are returned verbatim.
pub fn relative_date(now: i64, date_header: &str) -> String {
    if date_header.trim().is_empty() {
        return String::new();
    }
    let Ok(sent) = mailparse::dateparse(date_header) else {
        return date_header.trim().to_string();
    };
    let seconds = now.saturating_sub(sent).max(0);
    match seconds {
        s if s < 3_600 => {
            let minutes = s / 60;
            if minutes > 1 {
                format!("{minutes}min ago")
            } else {
                "just now".to_string()
            }
        }
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s if s < 172_800 => "yesterday".to_string(),
        s => format!("{}d ago", s / 86_400),
    }
}

/// Builds a summary from raw RFC 822 header bytes.
///
/// # Errors
///
/// Returns [`FetchError::Parse`] when the header block is malformed.
pub fn summarize_headers(now: i64, raw: &[u8]) -> Result<EmailSummary, FetchError> {
    let (headers, _) =
        mailparse::parse_headers(raw).map_err(|e| FetchError::Parse(e.to_string()))?;
    let from = headers.get_first_value("From").unwrap_or_default();
    let subject = headers
        .get_first_value("Subject")
        .map(|subject| subject.trim().to_string())
        .filter(|subject| !subject.is_empty())
        .unwrap_or_else(|| "(no subject)".to_string());
    let date = headers.get_first_value("Date").unwrap_or_default();
    Ok(EmailSummary {
        from: extract_name(&from),
        subject,
        date: relative_date(now, &date),
        unread: true,
    })
}

type TlsStream = rustls::StreamOwned<rustls::ClientConnection, TcpStream>;

fn connect_tls(host: &str) -> Result<TlsStream, FetchError> {
    let roots = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };
    let config = rustls::ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| FetchError::Other(format!("tls setup failed: {e}")))?
    .with_root_certificates(roots)
    .with_no_client_auth();
    let server_name = rustls::pki_types::ServerName::try_from(host.to_string())
        .map_err(|e| FetchError::NotConfigured(format!("invalid imap host `{host}`: {e}")))?;
    let connection = rustls::ClientConnection::new(Arc::new(config), server_name)
        .map_err(|e| FetchError::Other(format!("tls setup failed: {e}")))?;

    let tcp = TcpStream::connect((host, IMAPS_PORT))
        .map_err(|e| FetchError::Http(format!("connect to {host}:{IMAPS_PORT} failed: {e}")))?;
    tcp.set_read_timeout(Some(SOCKET_TIMEOUT))
        .and_then(|()| tcp.set_write_timeout(Some(SOCKET_TIMEOUT)))
        .map_err(|e| FetchError::Http(e.to_string()))?;
    Ok(rustls::StreamOwned::new(connection, tcp))
}

fn imap_error(err: imap::Error) -> FetchError {
    FetchError::Http(err.to_string())
}

/// Emails data source.
#[derive(Debug, Clone)]
pub struct EmailsBlock {
    descriptor: BlockDescriptor,
    host: String,
    address: Option<String>,
    password: Option<String>,
    max: usize,
}

impl EmailsBlock {
    /// Creates a source from block settings (`imap_host`, `email`, `password`, `max_display`).
    pub fn from_settings(settings: &BlockSettings) -> Self {
        Self {
            descriptor: descriptor(),
            host: settings.str_or("imap_host", "imap.gmail.com").to_string(),
            address: settings.secret("email").map(str::to_string),
            password: settings.secret("password").map(str::to_string),
            max: settings.u64_or("max_display", 6) as usize,
        }
    }

    fn read_inbox(&self, address: &str, password: &str) -> Result<Inbox, FetchError> {
        let stream = connect_tls(&self.host)?;
        let mut client = imap::Client::new(stream);
        client.read_greeting().map_err(imap_error)?;
        let mut session = client
            .login(address, password)
            .map_err(|(err, _)| FetchError::Auth(err.to_string()))?;

        session.select("INBOX").map_err(imap_error)?;
        let mut unseen: Vec<u32> = session
            .search("UNSEEN")
            .map_err(imap_error)?
            .into_iter()
            .collect();
        unseen.sort_unstable();
        let total = unseen.len();

        let now = chrono::Utc::now().timestamp();
        let mut emails = Vec::with_capacity(self.max.min(total));
        for seq in unseen.iter().rev().take(self.max) {
            let fetches = session
                .fetch(seq.to_string(), "RFC822.HEADER")
                .map_err(imap_error)?;
            for header in fetches.iter().filter_map(imap::types::Fetch::header) {
                match summarize_headers(now, header) {
                    Ok(summary) => emails.push(summary),
                    Err(err) => tracing::warn!(seq, error = %err, "skipping unreadable message"),
                }
            }
        }

        if let Err(err) = session.logout() {
            tracing::debug!(error = %err, "imap logout failed");
        }
        Ok(Inbox {
            emails,
            total,
            error: None,
        })
    }
}

impl BlockSource for EmailsBlock {
    fn descriptor(&self) -> &BlockDescriptor {
        &self.descriptor
    }

    fn fetch(&self) -> Result<Value, FetchError> {
        let (Some(address), Some(password)) = (self.address.as_deref(), self.password.as_deref())
        else {
            return Err(FetchError::NotConfigured(
                "email and password are required".to_string(),
            ));
        };
        tracing::debug!(host = %self.host, "checking unread mail");
        let inbox = self.read_inbox(address, password)?;
        serde_json::to_value(inbox).map_err(|e| FetchError::Other(e.to_string()))
    }
}

/// Registry factory.
pub fn build(settings: &BlockSettings) -> Box<dyn BlockSource> {
    Box::new(EmailsBlock::from_settings(settings))
}

//! Append-only activity log.
//!
//! Requests never touch the file. They push lines into an unbounded channel
//! and a single writer task appends them, so concurrent requests cannot
//! interleave partial lines. Write failures are reported through `tracing`
//! and otherwise ignored.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use quiz_core::{EventSink, QuizEvent};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const SESSION_PREFIX_LEN: usize = 8;

/// One rendered log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLine {
    pub timestamp: NaiveDateTime,
    pub client_ip: Option<IpAddr>,
    pub session_id: Option<String>,
    pub event: QuizEvent,
}

impl ActivityLine {
    /// `[timestamp] [ip] [session prefix] KIND: message`
    pub fn render(&self) -> String {
        let ip = self
            .client_ip
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let session = self
            .session_id
            .as_deref()
            .map(|id| id.chars().take(SESSION_PREFIX_LEN).collect::<String>())
            .unwrap_or_else(|| "no-session".to_string());

        format!(
            "[{}] [{}] [{}] {}: {}\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            ip,
            session,
            self.event.kind(),
            escape_controls(&self.event.message())
        )
    }
}

/// Escape control characters so visitor text cannot break or forge lines.
fn escape_controls(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_control() {
            escaped.extend(c.escape_default());
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Handle for queueing activity lines.
#[derive(Clone)]
pub struct ActivityLog {
    tx: mpsc::UnboundedSender<ActivityLine>,
}

impl ActivityLog {
    /// Start the writer task for `path`.
    ///
    /// The task exits once every handle is dropped, after writing whatever is
    /// still queued.
    pub fn spawn(path: PathBuf) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_writer(path, rx));
        (Self { tx }, handle)
    }

    /// Events attributed to one request.
    pub fn scope(&self, client_ip: Option<IpAddr>, session_id: Option<&str>) -> RequestEvents {
        RequestEvents {
            log: self.clone(),
            client_ip,
            session_id: session_id.map(str::to_string),
        }
    }

    fn push(&self, line: ActivityLine) {
        if self.tx.send(line).is_err() {
            warn!("Activity log writer is gone, dropping event");
        }
    }
}

/// [`EventSink`] that stamps events with the request's origin.
pub struct RequestEvents {
    log: ActivityLog,
    client_ip: Option<IpAddr>,
    session_id: Option<String>,
}

impl EventSink for RequestEvents {
    fn record(&self, event: QuizEvent) {
        debug!(kind = event.kind(), "{}", event.message());
        self.log.push(ActivityLine {
            timestamp: Local::now().naive_local(),
            client_ip: self.client_ip,
            session_id: self.session_id.clone(),
            event,
        });
    }
}

async fn run_writer(path: PathBuf, mut rx: mpsc::UnboundedReceiver<ActivityLine>) {
    let mut file: Option<File> = None;

    while let Some(line) = rx.recv().await {
        if file.is_none() {
            match open_append(&path).await {
                Ok(f) => file = Some(f),
                Err(e) => {
                    warn!("Failed to open activity log {}: {}", path.display(), e);
                    continue;
                }
            }
        }

        if let Some(f) = file.as_mut() {
            let rendered = line.render();
            let written = async {
                f.write_all(rendered.as_bytes()).await?;
                f.flush().await
            }
            .await;
            if let Err(e) = written {
                warn!("Failed to write activity log {}: {}", path.display(), e);
                // Reopen on the next line.
                file = None;
            }
        }
    }

    info!("Activity log writer stopped");
}

async fn open_append(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path).await
}

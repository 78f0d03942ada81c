//! Transport to a backend child process over newline-delimited JSON.
//!
//! Each call is written to the backend's stdin as one [`Request`] line and
//! answered by one [`Reply`] line on its stdout. Replies carry the request id,
//! so several calls may be in flight and answered in any order.
//!
//! # Wire Format
//!
//! ```text
//! → {"id":7,"call":{"command":"get_bugs_by_product","args":{"productIds":[1,2]}}}
//! ← {"id":7,"outcome":{"ok":[...]}}
//! ← {"id":8,"outcome":{"err":"Token expired"}}
//! ```

use super::command::{Command, Invocation, TraceContext};
use super::failure::Failure;
use super::transport::Transport;
use crate::domain::{DeskError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Failure text for calls that cannot complete because the backend is gone.
pub const BACKEND_CLOSED: &str = "backend connection closed";

/// One call sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    pub call: Command,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_context: Option<TraceContext>,
}

/// The backend's answer to the request with the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: u64,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Ok(Value),
    Err(Value),
}

/// Calls waiting for a reply. Once `closed`, no new call is accepted.
#[derive(Default)]
struct PendingCalls {
    waiting: HashMap<u64, oneshot::Sender<Outcome>>,
    closed: bool,
}

fn lock(pending: &Mutex<PendingCalls>) -> MutexGuard<'_, PendingCalls> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// [`Transport`] speaking to the backend over a byte stream pair.
///
/// A background task reads replies and routes them to the waiting calls. When
/// the backend's output ends, every pending call and every later call fails
/// with [`BACKEND_CLOSED`]. There is no timeout: a backend that never answers
/// leaves the call pending.
pub struct ProcessTransport {
    writer: tokio::sync::Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    pending: Arc<Mutex<PendingCalls>>,
    next_id: AtomicU64,
    reader: JoinHandle<()>,
    child: Mutex<Option<tokio::process::Child>>,
}

impl ProcessTransport {
    /// Starts the backend program and connects to its stdin and stdout.
    ///
    /// The child inherits stderr and is killed when the transport is dropped.
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Transport`] if the program cannot be started.
    pub fn spawn(program: &str, args: &[String]) -> Result<Self> {
        tracing::debug!(program = %program, args = ?args, "starting backend process");

        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DeskError::Transport(format!("failed to start backend `{program}`: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DeskError::Transport("backend stdin is not piped".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DeskError::Transport("backend stdout is not piped".to_string()))?;

        let transport = Self::from_io(stdout, stdin);
        *transport.child.lock().unwrap_or_else(PoisonError::into_inner) = Some(child);
        Ok(transport)
    }

    /// Connects to a backend reachable through any reader/writer pair.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn from_io<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let pending = Arc::new(Mutex::new(PendingCalls::default()));
        let reader = tokio::spawn(read_replies(BufReader::new(reader), Arc::clone(&pending)));
        let writer: Box<dyn AsyncWrite + Send + Unpin> = Box::new(writer);

        Self {
            writer: tokio::sync::Mutex::new(writer),
            pending,
            next_id: AtomicU64::new(1),
            reader,
            child: Mutex::new(None),
        }
    }

    /// Number of calls waiting for a reply.
    #[must_use]
    pub fn pending(&self) -> usize {
        lock(&self.pending).waiting.len()
    }
}

/// Withdraws a call from the pending set when the call ends, including when
/// its future is dropped before the reply arrives.
struct Waiting<'a> {
    pending: &'a Mutex<PendingCalls>,
    id: u64,
}

impl Drop for Waiting<'_> {
    fn drop(&mut self) {
        if lock(self.pending).waiting.remove(&self.id).is_some() {
            tracing::trace!(id = self.id, "call withdrawn before its reply");
        }
    }
}

/// Routes each reply line to its waiting call until the stream ends.
async fn read_replies<R>(reader: R, pending: Arc<Mutex<PendingCalls>>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<Reply>(&line) {
                    Ok(reply) => {
                        let waiter = lock(&pending).waiting.remove(&reply.id);
                        match waiter {
                            Some(sender) => {
                                // The caller may have given up on the call.
                                let _ = sender.send(reply.outcome);
                            }
                            None => tracing::warn!(id = reply.id, "reply for unknown call"),
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "discarding malformed backend reply"),
                }
            }
            Ok(None) => {
                tracing::debug!("backend closed its output");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read from backend");
                break;
            }
        }
    }

    let mut calls = lock(&pending);
    calls.closed = true;
    if !calls.waiting.is_empty() {
        tracing::warn!(pending = calls.waiting.len(), "failing calls left without a reply");
    }
    // Dropping the senders wakes every waiter with a closed channel.
    calls.waiting.clear();
}

#[async_trait]
impl Transport for ProcessTransport {
    async fn invoke(&self, invocation: Invocation) -> std::result::Result<Value, Failure> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name = invocation.command.name();
        let (sender, receiver) = oneshot::channel();

        {
            let mut calls = lock(&self.pending);
            if calls.closed {
                return Err(Failure::message(BACKEND_CLOSED));
            }
            calls.waiting.insert(id, sender);
        }
        let _waiting = Waiting {
            pending: &self.pending,
            id,
        };

        let request = Request {
            id,
            call: invocation.command,
            trace_context: invocation.trace_context,
        };
        let mut line = serde_json::to_string(&request)
            .map_err(|e| Failure::message(format!("failed to encode {name}: {e}")))?;
        line.push('\n');

        {
            let mut writer = self.writer.lock().await;
            let sent = match writer.write_all(line.as_bytes()).await {
                Ok(()) => writer.flush().await,
                Err(e) => Err(e),
            };
            if let Err(e) = sent {
                tracing::debug!(id = id, command = name, error = %e, "failed to send request");
                return Err(Failure::message(format!("failed to send {name} to backend: {e}")));
            }
        }

        tracing::trace!(id = id, command = name, "request sent");

        match receiver.await {
            Ok(Outcome::Ok(value)) => Ok(value),
            Ok(Outcome::Err(value)) => Err(Failure::new(value)),
            Err(_) => Err(Failure::message(BACKEND_CLOSED)),
        }
    }
}

impl Drop for ProcessTransport {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl std::fmt::Debug for ProcessTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessTransport")
            .field("next_id", &self.next_id)
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

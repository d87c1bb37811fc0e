//! Stdio transport to a single MCP server process
//!
//! Owns the child process and both pipe ends. Messages are framed as one
//! JSON object per line. A request holds the I/O lock from write through
//! read, so turns on one transport never interleave.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::protocol::{McpRequest, McpResponse};
use crate::error::{Error, Result};

/// How long a server gets to exit on its own after stdin is closed
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Both pipe ends, locked together for a request/response turn
struct Io {
    writer: Option<ChildStdin>,
    reader: BufReader<ChildStdout>,
}

impl Io {
    async fn send(&mut self, server: &str, message: &McpRequest) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| closed_transport(server))?;

        // Compact serde_json output escapes newlines inside strings, so the
        // encoded message is always exactly one line.
        let mut line = serde_json::to_string(message)?;
        debug!(server = %server, id = message.id, "MCP request -> {}", line);
        line.push('\n');

        writer.write_all(line.as_bytes()).await.map_err(|e| Error::Transport {
            server: server.to_string(),
            reason: format!("failed to write to stdin: {}", e),
        })?;
        writer.flush().await.map_err(|e| Error::Transport {
            server: server.to_string(),
            reason: format!("failed to flush stdin: {}", e),
        })
    }

    async fn receive(&mut self, server: &str) -> Result<McpResponse> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).await.map_err(|e| Error::Transport {
            server: server.to_string(),
            reason: format!("failed to read from stdout: {}", e),
        })?;

        if read == 0 {
            return Err(Error::Protocol {
                server: server.to_string(),
                reason: "closed".to_string(),
            });
        }

        let line = line.trim_end();
        debug!(server = %server, "MCP response <- {}", line);

        serde_json::from_str(line).map_err(|e| Error::Protocol {
            server: server.to_string(),
            reason: format!("failed to parse response: {} (raw: {})", e, line),
        })
    }
}

fn closed_transport(server: &str) -> Error {
    Error::Transport {
        server: server.to_string(),
        reason: "transport is closed".to_string(),
    }
}

/// Bi-directional JSON-RPC transport over a child process's stdio
pub struct StdioTransport {
    server: String,
    child: Mutex<Option<Child>>,
    io: Mutex<Io>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl StdioTransport {
    /// Spawn `command` with `args` and take ownership of its stdio.
    ///
    /// Must be called from within a Tokio runtime. The child's stderr is
    /// drained into the debug log.
    pub fn open(
        server: &str,
        command: &str,
        args: &[String],
        env: &HashMap<String, String>,
    ) -> Result<Self> {
        debug!(server = %server, "Spawning MCP server: {} {:?}", command, args);

        let mut child = Command::new(command)
            .args(args)
            .envs(env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Spawn {
                server: server.to_string(),
                reason: format!("{}: {}", command, e),
            })?;

        let stdin = child.stdin.take().ok_or_else(|| Error::Spawn {
            server: server.to_string(),
            reason: "failed to capture stdin".to_string(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| Error::Spawn {
            server: server.to_string(),
            reason: "failed to capture stdout".to_string(),
        })?;

        if let Some(stderr) = child.stderr.take() {
            let name = server.to_string();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(server = %name, "stderr: {}", line);
                }
            });
        }

        Ok(StdioTransport {
            server: server.to_string(),
            child: Mutex::new(Some(child)),
            io: Mutex::new(Io {
                writer: Some(stdin),
                reader: BufReader::new(stdout),
            }),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        })
    }

    /// Logical server name this transport belongs to
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Allocate the next request id; never reused while the transport lives
    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Write one framed message
    pub async fn send_message(&self, message: &McpRequest) -> Result<()> {
        self.ensure_open()?;
        self.io.lock().await.send(&self.server, message).await
    }

    /// Read and decode exactly one line
    pub async fn receive_message(&self) -> Result<McpResponse> {
        self.io.lock().await.receive(&self.server).await
    }

    /// One full request/response turn.
    ///
    /// The id is allocated inside the turn and handed to `build`. Server
    /// notifications and requests read before the reply are skipped. A
    /// response carrying a different id is a protocol error.
    pub async fn request<F>(&self, build: F) -> Result<McpResponse>
    where
        F: FnOnce(u64) -> McpRequest,
    {
        self.ensure_open()?;
        let mut io = self.io.lock().await;

        let request = build(self.next_id());
        io.send(&self.server, &request).await?;
        let response = loop {
            let message = io.receive(&self.server).await?;
            if let Some(method) = message.method.as_deref() {
                debug!(server = %self.server, "Skipping server message '{}'", method);
                continue;
            }
            break message;
        };

        if !response.answers(request.id) {
            return Err(Error::Protocol {
                server: self.server.clone(),
                reason: format!(
                    "response id {:?} does not match request id {}",
                    response.id, request.id
                ),
            });
        }

        Ok(response)
    }

    /// Whether the transport is open and the process has not exited
    pub fn is_open(&self) -> bool {
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }

        // A busy lock means someone is tearing down or probing; treat as alive.
        match self.child.try_lock() {
            Ok(mut child) => match child.as_mut() {
                Some(child) => matches!(child.try_wait(), Ok(None)),
                None => false,
            },
            Err(_) => true,
        }
    }

    /// Release the process and both stream ends. Idempotent.
    ///
    /// Never waits for an in-flight turn: the process is killed, which makes
    /// the pending read see end-of-stream.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        if let Ok(mut io) = self.io.try_lock() {
            // Dropping stdin lets a well-behaved server exit on EOF.
            io.writer.take();
        }

        let child = self.child.lock().await.take();
        let Some(mut child) = child else {
            return Ok(());
        };

        match tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await {
            Ok(Ok(status)) => {
                debug!(server = %self.server, "MCP server exited: {}", status);
                Ok(())
            }
            Ok(Err(e)) => {
                warn!(server = %self.server, "Failed to wait for MCP server: {}", e);
                child.kill().await.map_err(Error::from)
            }
            Err(_) => {
                debug!(server = %self.server, "MCP server still running, killing");
                child.kill().await.map_err(Error::from)
            }
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(closed_transport(&self.server))
        } else {
            Ok(())
        }
    }
}

impl Drop for StdioTransport {
    fn drop(&mut self) {
        // kill_on_drop reaps the child if close() was never called
        debug!(server = %self.server, "Dropping MCP transport");
    }
}

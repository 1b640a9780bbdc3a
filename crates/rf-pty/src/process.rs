// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Spawning and driving a single external process under a PTY.
//!
//! The PTY reader runs on a dedicated thread and forwards raw output chunks
//! over an unbounded channel; all waiting happens on the async side with a
//! per-call deadline. Output consumed by a match is gone for good: later
//! `expect`/`drain` calls only ever see what followed the previous match.

use crate::error::{DriverError, Result};
use crate::pattern::{PatternKind, PatternSet};
use portable_pty::{ChildKiller, CommandBuilder, PtySize, native_pty_system};
use std::io::{Read, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

/// Outcome of a successful `expect` call
#[derive(Debug, Clone)]
pub struct PtyMatch {
    /// Index of the winning pattern within the set
    pub index: usize,
    /// Meaning of the winning pattern
    pub kind: PatternKind,
    /// Capture groups of the winning pattern, group 1 onwards
    pub captures: Vec<String>,
    /// Output that preceded the match, whitespace-trimmed
    pub before: String,
}

impl PtyMatch {
    /// Capture group by zero-based position (0 is the regex's group 1)
    pub fn capture(&self, index: usize) -> Option<&str> {
        self.captures.get(index).map(String::as_str)
    }
}

/// An owned handle to one spawned external command.
///
/// The child is never left running: `terminate` is idempotent, every failing
/// `expect`/`drain` path calls it, and `Drop` covers whatever remains.
pub struct PtyProcess {
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    writer: Box<dyn Write + Send>,
    killer: Box<dyn ChildKiller + Send + Sync>,
    buffer: String,
    timeout: Duration,
    terminated: bool,
}

impl PtyProcess {
    /// Spawn `program` with `args` under a fresh PTY, using `cwd` as the
    /// working directory. Fails with [`DriverError::Spawn`] when the command
    /// cannot be launched (missing binary, invalid directory).
    pub fn spawn(program: &str, args: &[&str], cwd: &Path, timeout: Duration) -> Result<Self> {
        let command = std::iter::once(program).chain(args.iter().copied()).collect::<Vec<_>>().join(" ");
        let spawn_err = |reason: String| DriverError::Spawn {
            command: command.clone(),
            dir: cwd.to_path_buf(),
            reason,
        };

        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows: 24,
                cols: 80,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| spawn_err(format!("failed to open pty: {e}")))?;

        let mut builder = CommandBuilder::new(program);
        builder.args(args);
        builder.cwd(cwd);

        let mut child = pair
            .slave
            .spawn_command(builder)
            .map_err(|e| spawn_err(e.to_string()))?;
        drop(pair.slave);

        debug!(command = %command, dir = %cwd.display(), "spawned command under pty");

        let killer = child.clone_killer();
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| spawn_err(format!("failed to take pty writer: {e}")))?;
        let mut reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| spawn_err(format!("failed to clone pty reader: {e}")))?;

        let (tx, rx) = mpsc::unbounded_channel();
        thread::spawn(move || {
            // Keep the master side open for the lifetime of the reader.
            let _master = pair.master;
            let mut buf = [0u8; 8192];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        trace!(bytes = n, "read pty output");
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(10));
                    }
                    // On Linux the master read fails with EIO once the child
                    // exits; treat any hard error as end-of-stream.
                    Err(_) => break,
                }
            }
            if let Err(e) = child.wait() {
                warn!(error = %e, "failed to reap child process");
            }
        });

        Ok(Self::from_parts(rx, writer, killer, timeout))
    }

    /// Assemble a process handle from pre-wired parts.
    ///
    /// Used by tests and transcript simulations that script the output
    /// channel instead of spawning a real command.
    pub fn from_parts(
        rx: mpsc::UnboundedReceiver<Vec<u8>>,
        writer: Box<dyn Write + Send>,
        killer: Box<dyn ChildKiller + Send + Sync>,
        timeout: Duration,
    ) -> Self {
        Self {
            rx,
            writer,
            killer,
            buffer: String::new(),
            timeout,
            terminated: false,
        }
    }

    /// Block until the accumulated output matches one of `patterns` or the
    /// timeout elapses.
    ///
    /// Everything up to and including the match is consumed; the preceding
    /// text is returned in [`PtyMatch::before`]. A timeout and an
    /// end-of-stream without a match both terminate the child before
    /// returning the error.
    pub async fn expect(&mut self, patterns: &PatternSet) -> Result<PtyMatch> {
        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            if let Some(found) = patterns.find(&self.buffer) {
                let before = self.buffer[..found.start].trim().to_string();
                self.buffer.drain(..found.end);
                return Ok(PtyMatch {
                    index: found.index,
                    kind: found.kind,
                    captures: found.captures,
                    before,
                });
            }
            match tokio::time::timeout_at(deadline, self.rx.recv()).await {
                Err(_) => {
                    self.terminate();
                    return Err(DriverError::Timeout {
                        waited: self.timeout,
                    });
                }
                Ok(None) => {
                    self.terminate();
                    let output = std::mem::take(&mut self.buffer).trim().to_string();
                    return Err(DriverError::UnexpectedTermination { output });
                }
                Ok(Some(chunk)) => self.buffer.push_str(&String::from_utf8_lossy(&chunk)),
            }
        }
    }

    /// Read to end-of-stream and return everything left, trimmed.
    pub async fn drain(&mut self) -> Result<String> {
        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            match tokio::time::timeout_at(deadline, self.rx.recv()).await {
                Err(_) => {
                    self.terminate();
                    return Err(DriverError::Timeout {
                        waited: self.timeout,
                    });
                }
                Ok(None) => return Ok(std::mem::take(&mut self.buffer).trim().to_string()),
                Ok(Some(chunk)) => self.buffer.push_str(&String::from_utf8_lossy(&chunk)),
            }
        }
    }

    /// Write one line (with a trailing newline) to the child's terminal.
    pub fn send_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Send a benign kill signal to the child. Idempotent; later calls are
    /// no-ops.
    pub fn terminate(&mut self) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        if let Err(e) = self.killer.kill() {
            debug!(error = %e, "kill signal failed; child likely already gone");
        }
    }
}

impl Drop for PtyProcess {
    fn drop(&mut self) {
        self.terminate();
    }
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Shared mocks for driving the migration engine against scripted
//! transcripts instead of a live git process.

use rf_pty::{ChildKiller, PtyProcess};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// Records everything the engine writes to the child's terminal.
#[derive(Debug, Clone, Default)]
pub struct RecordingWriter(pub Arc<Mutex<Vec<u8>>>);

impl Write for RecordingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Counts kill calls instead of signalling anything.
#[derive(Debug, Clone, Default)]
pub struct CountingKiller(pub Arc<AtomicUsize>);

impl ChildKiller for CountingKiller {
    fn kill(&mut self) -> std::io::Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clone_killer(&self) -> Box<dyn ChildKiller + Send + Sync> {
        Box::new(self.clone())
    }
}

/// Build a process handle over a scripted output channel.
///
/// `keep_open` leaves the channel open (for timeout scenarios); otherwise
/// the stream ends after the scripted chunks, like a child exiting.
pub fn scripted_process(
    chunks: &[&str],
    keep_open: bool,
    timeout: Duration,
) -> (PtyProcess, Arc<Mutex<Vec<u8>>>, Arc<AtomicUsize>) {
    let (tx, rx) = mpsc::unbounded_channel();
    for chunk in chunks {
        tx.send(chunk.as_bytes().to_vec()).unwrap();
    }
    if keep_open {
        std::mem::forget(tx);
    }
    let written = Arc::new(Mutex::new(Vec::new()));
    let kills = Arc::new(AtomicUsize::new(0));
    let process = PtyProcess::from_parts(
        rx,
        Box::new(RecordingWriter(written.clone())),
        Box::new(CountingKiller(kills.clone())),
        timeout,
    );
    (process, written, kills)
}

/// Split the recorded terminal input back into lines.
pub fn sent_lines(written: &Arc<Mutex<Vec<u8>>>) -> Vec<String> {
    let bytes = written.lock().unwrap();
    String::from_utf8_lossy(&bytes)
        .split('\n')
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

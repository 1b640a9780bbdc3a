// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the PTY process driver

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for driver operations
pub type Result<T> = std::result::Result<T, DriverError>;

/// Errors that can occur while driving an external process
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to spawn `{command}` in {}: {reason}", dir.display())]
    Spawn {
        command: String,
        dir: PathBuf,
        reason: String,
    },

    #[error("no expected pattern appeared within {}ms", waited.as_millis())]
    Timeout { waited: Duration },

    #[error("process ended before any expected pattern matched: {output:?}")]
    UnexpectedTermination { output: String },

    #[error("pty i/o error: {0}")]
    Io(#[from] std::io::Error),
}

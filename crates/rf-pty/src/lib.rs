// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Pseudo-terminal process driver for repoferry.
//!
//! Spawns an external command under a PTY so that interactive prompts it
//! writes become observable as ordinary output, accumulates that output, and
//! lets callers block until one of an ordered list of text patterns matches
//! or a timeout elapses. The recognized patterns are supplied by the caller;
//! this crate knows nothing about any particular tool's output.

pub mod error;
pub mod pattern;
pub mod process;

pub use error::{DriverError, Result};
// Re-exported because it appears in `PtyProcess::from_parts`.
pub use portable_pty::ChildKiller;
pub use pattern::{Pattern, PatternKind, PatternSet};
pub use process::{PtyMatch, PtyProcess};

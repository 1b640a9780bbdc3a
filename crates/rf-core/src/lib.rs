// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Repository migration engine for repoferry.
//!
//! Drives an external `git` binary through a pseudo-terminal to move a
//! repository from one authenticated remote to another: bare clone, remote
//! registration, mirror push, deterministic cleanup. The tool's
//! human-oriented output is interpreted through a best-effort text-pattern
//! contract kept in one place ([`patterns`]) so it can be swapped for a
//! machine-readable mode later without touching the orchestration.

mod auth;
mod transfer;

pub mod batch;
pub mod credentials;
pub mod error;
pub mod job;
pub mod migrate;
pub mod patterns;
pub mod workspace;

pub use batch::{BatchPlan, BatchSummary, ErrorPolicy, RepoOutcome, run_batch, run_batch_with};
pub use credentials::Credentials;
pub use error::{MigrateError, Result, Stage};
pub use job::{DEFAULT_REMOTE, DEFAULT_TIMEOUT_MS, DEFAULT_WORKSPACE, MigrationJob};
pub use migrate::{MigrationOutcome, Migrator};
pub use workspace::TempWorkspace;

#[cfg(test)]
pub(crate) mod test_support;

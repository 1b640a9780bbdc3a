// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for migration jobs

use rf_pty::DriverError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for migration operations
pub type Result<T> = std::result::Result<T, MigrateError>;

/// The step of a migration job an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Clone,
    AddRemote,
    Push,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Clone => write!(f, "clone"),
            Stage::AddRemote => write!(f, "remote add"),
            Stage::Push => write!(f, "push"),
        }
    }
}

/// Errors that can occur during a migration job.
///
/// None of these are retried anywhere; each one is terminal for its job and
/// surfaces to the caller as-is.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("authentication required for '{server}' but no credentials were supplied")]
    AuthRequired { server: String },

    #[error("git {stage} failed: {output}")]
    RemoteFatal { stage: Stage, output: String },

    #[error("could not prepare workspace at {}: {source}", path.display())]
    Workspace {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cleanup of {} failed: {source}", path.display())]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid repository spec '{spec}': {reason}")]
    InvalidRepoSpec { spec: String, reason: String },
}

impl MigrateError {
    /// Stable process exit code for this error, one per taxonomy entry, so
    /// callers can discriminate failures programmatically.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Driver(DriverError::Spawn { .. }) => 10,
            MigrateError::Driver(DriverError::Timeout { .. }) => 11,
            MigrateError::Driver(DriverError::UnexpectedTermination { .. }) => 12,
            MigrateError::Driver(DriverError::Io(_)) => 13,
            MigrateError::AuthRequired { .. } => 20,
            MigrateError::RemoteFatal { .. } => 21,
            MigrateError::Workspace { .. } => 30,
            MigrateError::Cleanup { .. } => 31,
            MigrateError::InvalidRepoSpec { .. } => 40,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;

    #[test]
    fn exit_codes_are_distinct() {
        let errors = vec![
            MigrateError::Driver(DriverError::Spawn {
                command: "git".into(),
                dir: PathBuf::from("."),
                reason: "missing".into(),
            }),
            MigrateError::Driver(DriverError::Timeout {
                waited: Duration::from_millis(10),
            }),
            MigrateError::Driver(DriverError::UnexpectedTermination { output: String::new() }),
            MigrateError::Driver(DriverError::Io(std::io::Error::other("io"))),
            MigrateError::AuthRequired {
                server: "https://github.com".into(),
            },
            MigrateError::RemoteFatal {
                stage: Stage::Push,
                output: "fatal: nope".into(),
            },
            MigrateError::Workspace {
                path: PathBuf::from("temp"),
                source: std::io::Error::other("mkdir"),
            },
            MigrateError::Cleanup {
                path: PathBuf::from("temp"),
                source: std::io::Error::other("rm"),
            },
            MigrateError::InvalidRepoSpec {
                spec: "/".into(),
                reason: "empty".into(),
            },
        ];
        let codes: HashSet<u8> = errors.iter().map(|e| e.exit_code()).collect();
        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains(&0));
    }

    #[test]
    fn stage_names_read_like_git_subcommands() {
        assert_eq!(Stage::Clone.to_string(), "clone");
        assert_eq!(Stage::AddRemote.to_string(), "remote add");
        assert_eq!(Stage::Push.to_string(), "push");
    }
}

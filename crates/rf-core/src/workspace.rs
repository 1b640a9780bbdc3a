// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Temporary workspace acquisition and scoped cleanup

use crate::error::{MigrateError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A filesystem directory that holds bare clones for the duration of a job.
///
/// Whether the directory existed before acquisition is fixed once, here, and
/// is the sole determinant of how much gets deleted at cleanup: a reused
/// directory only loses the job's own bare-repository subdirectory, a fresh
/// one is removed wholesale.
#[derive(Debug)]
pub struct TempWorkspace {
    path: PathBuf,
    pre_existed: bool,
}

impl TempWorkspace {
    /// Create the directory, or reuse it when it already exists. Any other
    /// creation failure is fatal.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match fs::create_dir(&path) {
            Ok(()) => {
                info!(path = %path.display(), "workspace created");
                Ok(Self {
                    path,
                    pre_existed: false,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "workspace already exists, reusing");
                Ok(Self {
                    path,
                    pre_existed: true,
                })
            }
            Err(source) => Err(MigrateError::Workspace { path, source }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pre_existed(&self) -> bool {
        self.pre_existed
    }

    /// Delete what this job owns: the given bare-repository subdirectory
    /// when the workspace pre-existed, the whole workspace otherwise.
    ///
    /// An already-missing target is not an error (the clone may have failed
    /// before creating anything).
    pub fn cleanup(&self, repo_dir: Option<&Path>) -> Result<()> {
        let target = if self.pre_existed {
            match repo_dir {
                Some(dir) => dir.to_path_buf(),
                None => return Ok(()),
            }
        } else {
            self.path.clone()
        };
        match fs::remove_dir_all(&target) {
            Ok(()) => {
                debug!(path = %target.display(), "cleaned up");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(MigrateError::Cleanup {
                path: target,
                source,
            }),
        }
    }
}

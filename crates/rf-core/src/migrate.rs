// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Per-job orchestration: workspace, clone, remote add, push, cleanup.
//!
//! A job is sequential and single-threaded internally; exactly one external
//! process is live at any instant, and the only suspension points are the
//! pattern waits inside the process driver.

use crate::error::{MigrateError, Result, Stage};
use crate::job::MigrationJob;
use crate::patterns;
use crate::transfer::drive_transfer;
use crate::workspace::TempWorkspace;
use rf_pty::{PatternKind, PtyProcess};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What a completed job produced
#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    /// Path of the bare clone the job worked in (already cleaned up)
    pub repo_path: PathBuf,
}

/// Runs migration jobs against an external git binary.
#[derive(Debug, Clone)]
pub struct Migrator {
    git_program: String,
}

impl Default for Migrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Migrator {
    pub fn new() -> Self {
        Self {
            git_program: "git".to_string(),
        }
    }

    /// Use a different binary in place of `git`. The substitute must speak
    /// the same output contract; tests use this to run against a stub.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            git_program: program.into(),
        }
    }

    /// Run one migration job to completion.
    ///
    /// Any failure aborts the remaining steps; cleanup always runs. A
    /// cleanup failure after an otherwise successful job surfaces as the
    /// job's error (the push itself is not reversed).
    pub async fn run(&self, job: &MigrationJob) -> Result<MigrationOutcome> {
        let workspace = TempWorkspace::acquire(job.workspace())?;
        let mut repo_dir = None;
        let result = self.migrate(job, &workspace, &mut repo_dir).await;
        let cleanup = workspace.cleanup(repo_dir.as_deref());

        match (result, cleanup) {
            (Ok(outcome), Ok(())) => Ok(outcome),
            (Ok(_), Err(cleanup_err)) => Err(cleanup_err),
            (Err(job_err), cleanup) => {
                if let Err(cleanup_err) = cleanup {
                    warn!(error = %cleanup_err, "cleanup failed while handling a job error");
                }
                Err(job_err)
            }
        }
    }

    async fn migrate(
        &self,
        job: &MigrationJob,
        workspace: &TempWorkspace,
        repo_dir: &mut Option<PathBuf>,
    ) -> Result<MigrationOutcome> {
        let repo_path = self.clone_bare(job, workspace.path()).await?;
        *repo_dir = Some(repo_path.clone());
        self.add_remote(job, &repo_path).await?;
        self.push_mirror(job, &repo_path).await?;
        Ok(MigrationOutcome { repo_path })
    }

    async fn clone_bare(&self, job: &MigrationJob, cwd: &Path) -> Result<PathBuf> {
        info!(source = %job.source_url(), "cloning bare repository");
        let mut process = PtyProcess::spawn(
            &self.git_program,
            &["clone", job.source_url(), "--bare"],
            cwd,
            job.timeout(),
        )?;

        let started = process.expect(&patterns::clone_start()).await?;
        if started.kind == PatternKind::Fatal {
            let detail = process.drain().await.unwrap_or_default();
            process.terminate();
            return Err(MigrateError::RemoteFatal {
                stage: Stage::Clone,
                output: format!("fatal: {}", detail.trim()),
            });
        }
        let Some(repo_name) = started.capture(0).map(str::to_string) else {
            process.terminate();
            return Err(rf_pty::DriverError::UnexpectedTermination {
                output: started.before,
            }
            .into());
        };
        info!(repo = %repo_name, "clone started");

        drive_transfer(
            process,
            &patterns::clone_transfer(),
            job.source_auth(),
            Stage::Clone,
        )
        .await?;

        let repo_path = cwd.join(&repo_name);
        info!(path = %repo_path.display(), "bare repository cloned");
        Ok(repo_path)
    }

    async fn add_remote(&self, job: &MigrationJob, repo_path: &Path) -> Result<()> {
        let mut process = PtyProcess::spawn(
            &self.git_program,
            &["remote", "add", job.remote_name(), job.dest_url()],
            repo_path,
            job.timeout(),
        )?;
        // No success/fatal distinction here; the only interesting failure
        // mode is the spawn itself.
        process.drain().await?;
        process.terminate();
        info!(remote = %job.remote_name(), "remote added");
        Ok(())
    }

    async fn push_mirror(&self, job: &MigrationJob, repo_path: &Path) -> Result<()> {
        info!(remote = %job.remote_name(), "pushing mirror");
        let process = PtyProcess::spawn(
            &self.git_program,
            &["push", job.remote_name(), "--mirror"],
            repo_path,
            job.timeout(),
        )?;
        drive_transfer(
            process,
            &patterns::push_transfer(),
            job.dest_auth(),
            Stage::Push,
        )
        .await?;
        info!(remote = %job.remote_name(), "pushed to remote");
        Ok(())
    }
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Batch migration of multiple repositories between two hosts.
//!
//! The batch driver owns only iteration and aggregation; every repository
//! becomes an ordinary [`MigrationJob`] run by the same orchestrator as the
//! single-job path. Jobs share no mutable state: each one gets its own
//! workspace subdirectory under the shared base.

use crate::credentials::Credentials;
use crate::error::{MigrateError, Result};
use crate::job::{DEFAULT_REMOTE, DEFAULT_TIMEOUT_MS, DEFAULT_WORKSPACE, MigrationJob};
use crate::migrate::{MigrationOutcome, Migrator};
use crate::workspace::TempWorkspace;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

const HTTPS_PREFIX: &str = "https://";

/// What to do with the remaining repositories after one job fails.
///
/// `Abort` (the default) stops after the first failure; `Continue` runs
/// every job and reports the failures in the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    #[default]
    Abort,
    Continue,
}

/// Configuration for one batch run
#[derive(Debug, Clone)]
pub struct BatchPlan {
    /// Source host, with or without an `https://` prefix
    pub source_host: String,
    /// Destination host, with or without an `https://` prefix
    pub dest_host: String,
    /// Repository specs, each `user/repo` or a bare `repo` combined with
    /// `source_user`
    pub repos: Vec<String>,
    /// Fallback user for bare `repo` specs
    pub source_user: Option<String>,
    /// User owning the destination repositories
    pub dest_user: String,
    pub source_auth: Option<Credentials>,
    pub dest_auth: Option<Credentials>,
    pub workspace: PathBuf,
    pub remote_name: String,
    pub timeout: Duration,
    pub on_error: ErrorPolicy,
    /// Upper bound on concurrently running jobs (only with `Continue`;
    /// `Abort` runs sequentially so "first failure" is well defined)
    pub concurrency: usize,
}

impl BatchPlan {
    pub fn new(
        source_host: impl Into<String>,
        dest_host: impl Into<String>,
        repos: Vec<String>,
        dest_user: impl Into<String>,
    ) -> Self {
        Self {
            source_host: source_host.into(),
            dest_host: dest_host.into(),
            repos,
            source_user: None,
            dest_user: dest_user.into(),
            source_auth: None,
            dest_auth: None,
            workspace: PathBuf::from(DEFAULT_WORKSPACE),
            remote_name: DEFAULT_REMOTE.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            on_error: ErrorPolicy::default(),
            concurrency: 4,
        }
    }

    /// Expand one repository spec into a full job.
    fn job_for(&self, spec: &str) -> Result<MigrationJob> {
        let (user, name) = match spec.split_once('/') {
            Some((user, name)) if !user.is_empty() && !name.is_empty() => {
                (user.to_string(), name.to_string())
            }
            Some(_) => {
                return Err(MigrateError::InvalidRepoSpec {
                    spec: spec.to_string(),
                    reason: "empty user or repository name".to_string(),
                });
            }
            None => match &self.source_user {
                Some(user) => (user.clone(), spec.to_string()),
                None => {
                    return Err(MigrateError::InvalidRepoSpec {
                        spec: spec.to_string(),
                        reason: "bare repository name requires a source user".to_string(),
                    });
                }
            },
        };

        let source_url = repo_url(&self.source_host, &user, &name);
        let dest_url = repo_url(&self.dest_host, &self.dest_user, &name);
        // Per-job subdirectory; user is part of the name so two users'
        // equally-named repositories cannot collide.
        let workspace = self.workspace.join(format!("{user}__{name}"));

        Ok(MigrationJob::builder(source_url, dest_url)
            .source_auth(self.source_auth.clone())
            .dest_auth(self.dest_auth.clone())
            .workspace(workspace)
            .remote_name(self.remote_name.clone())
            .timeout(self.timeout)
            .build())
    }
}

fn repo_url(host: &str, user: &str, name: &str) -> String {
    let host = host.strip_suffix('/').unwrap_or(host);
    if host.starts_with(HTTPS_PREFIX) {
        format!("{host}/{user}/{name}.git")
    } else {
        format!("{HTTPS_PREFIX}{host}/{user}/{name}.git")
    }
}

/// The fate of one repository within a batch
#[derive(Debug)]
pub struct RepoOutcome {
    pub repo: String,
    pub result: Result<MigrationOutcome>,
}

/// Aggregated per-repository outcomes of a batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<RepoOutcome>,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Surrender the first error, for processes that exit with its code
    pub fn into_first_error(self) -> Option<MigrateError> {
        self.outcomes.into_iter().find_map(|o| o.result.err())
    }
}

/// Run a batch with the default `git` binary.
pub async fn run_batch(plan: &BatchPlan) -> Result<BatchSummary> {
    run_batch_with(&Migrator::new(), plan).await
}

/// Run a batch with a specific [`Migrator`].
///
/// The base workspace is acquired up front and, when it did not pre-exist,
/// removed after the last job; per-job subdirectories are cleaned up by the
/// jobs themselves.
pub async fn run_batch_with(migrator: &Migrator, plan: &BatchPlan) -> Result<BatchSummary> {
    let base = TempWorkspace::acquire(&plan.workspace)?;

    let mut summary = BatchSummary::default();
    match plan.on_error {
        ErrorPolicy::Abort => {
            for repo in &plan.repos {
                let outcome = run_one(migrator, plan, repo).await;
                let failed = outcome.result.is_err();
                summary.outcomes.push(outcome);
                if failed {
                    error!(repo, "aborting batch after failure");
                    break;
                }
            }
        }
        ErrorPolicy::Continue => {
            let limit = plan.concurrency.max(1);
            summary.outcomes = futures::stream::iter(plan.repos.iter())
                .map(|repo| run_one(migrator, plan, repo))
                .buffer_unordered(limit)
                .collect()
                .await;
        }
    }

    base.cleanup(None)?;
    info!(
        total = summary.outcomes.len(),
        failed = summary.failed(),
        "batch finished"
    );
    Ok(summary)
}

async fn run_one(migrator: &Migrator, plan: &BatchPlan, repo: &str) -> RepoOutcome {
    let result = match plan.job_for(repo) {
        Ok(job) => migrator.run(&job).await,
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        error!(repo, error = %e, "migration failed");
    } else {
        info!(repo, "migration succeeded");
    }
    RepoOutcome {
        repo: repo.to_string(),
        result,
    }
}

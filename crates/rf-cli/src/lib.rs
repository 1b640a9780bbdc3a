// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Command-line surface for repoferry.
//!
//! Argument parsing and help text only; all migration behavior lives in
//! `rf-core`.

use rf_core::{
    BatchPlan, Credentials, DEFAULT_REMOTE, DEFAULT_TIMEOUT_MS, DEFAULT_WORKSPACE, ErrorPolicy,
    MigrationJob,
};
use rf_logging::CliLoggingArgs;
use std::path::PathBuf;
use std::time::Duration;

pub use clap::Parser;

#[derive(clap::Parser)]
#[command(
    name = "repoferry",
    about = "Migrate repositories between two optionally authenticated remotes",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub logging: CliLoggingArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Migrate a single repository
    Migrate(MigrateArgs),
    /// Migrate several repositories between two hosts
    Batch(BatchArgs),
}

#[derive(clap::Args)]
pub struct MigrateArgs {
    /// Source repository URL
    pub source: String,
    /// Destination repository URL
    pub dest: String,
    /// Authentication user for the source repository
    #[arg(long, value_name = "USER")]
    pub source_user: Option<String>,
    /// Authentication token/password for the source repository
    #[arg(long, value_name = "TOKEN")]
    pub source_token: Option<String>,
    /// Authentication user for the destination repository
    #[arg(long, value_name = "USER")]
    pub dest_user: Option<String>,
    /// Authentication token/password for the destination repository
    #[arg(long, value_name = "TOKEN")]
    pub dest_token: Option<String>,
    /// Workspace directory for the bare clone
    #[arg(long, value_name = "PATH", default_value = DEFAULT_WORKSPACE)]
    pub workspace: PathBuf,
    /// Name of the destination remote
    #[arg(long, value_name = "NAME", default_value = DEFAULT_REMOTE)]
    pub remote: String,
    /// Max time to wait for any recognized git output
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,
}

impl MigrateArgs {
    pub fn into_job(self) -> MigrationJob {
        MigrationJob::builder(self.source, self.dest)
            .source_auth(Credentials::from_parts(self.source_user, self.source_token))
            .dest_auth(Credentials::from_parts(self.dest_user, self.dest_token))
            .workspace(self.workspace)
            .remote_name(self.remote)
            .timeout(Duration::from_millis(self.timeout_ms))
            .build()
    }
}

#[derive(clap::Args)]
pub struct BatchArgs {
    /// Source host (an https:// prefix is added when missing)
    pub source_host: String,
    /// Destination host (an https:// prefix is added when missing)
    pub dest_host: String,
    /// Repositories to migrate, each `user/repo` or `repo` with --source-user
    #[arg(required = true, value_name = "REPO")]
    pub repos: Vec<String>,
    /// Shared source user for bare repo names
    #[arg(long, value_name = "USER")]
    pub source_user: Option<String>,
    /// Authentication token/password for the source repositories
    #[arg(long, value_name = "TOKEN")]
    pub source_token: Option<String>,
    /// User owning the destination repositories
    #[arg(long, value_name = "USER")]
    pub dest_user: String,
    /// Authentication token/password for the destination repositories
    #[arg(long, value_name = "TOKEN")]
    pub dest_token: Option<String>,
    /// Shared workspace directory for the bare clones
    #[arg(long, value_name = "PATH", default_value = DEFAULT_WORKSPACE)]
    pub workspace: PathBuf,
    /// Name of the destination remote
    #[arg(long, value_name = "NAME", default_value = DEFAULT_REMOTE)]
    pub remote: String,
    /// Max time to wait for any recognized git output
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,
    /// Keep migrating the remaining repositories after a failure
    #[arg(long)]
    pub continue_on_error: bool,
    /// Max concurrently running migrations (with --continue-on-error)
    #[arg(long, value_name = "N", default_value_t = 4)]
    pub jobs: usize,
}

impl BatchArgs {
    pub fn into_plan(self) -> BatchPlan {
        let mut plan = BatchPlan::new(self.source_host, self.dest_host, self.repos, self.dest_user);
        plan.source_auth = Credentials::from_parts(self.source_user.clone(), self.source_token);
        plan.dest_auth = Credentials::from_parts(Some(plan.dest_user.clone()), self.dest_token);
        plan.source_user = self.source_user;
        plan.workspace = self.workspace;
        plan.remote_name = self.remote;
        plan.timeout = Duration::from_millis(self.timeout_ms);
        plan.on_error = if self.continue_on_error {
            ErrorPolicy::Continue
        } else {
            ErrorPolicy::Abort
        };
        plan.concurrency = self.jobs;
        plan
    }
}

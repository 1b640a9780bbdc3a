// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Description of a single migration job

use crate::credentials::Credentials;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default remote name registered for the destination repository
pub const DEFAULT_REMOTE: &str = "public";
/// Default workspace directory for bare clones
pub const DEFAULT_WORKSPACE: &str = "temp";
/// Default per-expect timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Everything needed to migrate one repository. Immutable once built.
#[derive(Debug, Clone)]
pub struct MigrationJob {
    source_url: String,
    dest_url: String,
    source_auth: Option<Credentials>,
    dest_auth: Option<Credentials>,
    workspace: PathBuf,
    remote_name: String,
    timeout: Duration,
}

impl MigrationJob {
    pub fn builder(
        source_url: impl Into<String>,
        dest_url: impl Into<String>,
    ) -> MigrationJobBuilder {
        MigrationJobBuilder {
            source_url: source_url.into(),
            dest_url: dest_url.into(),
            source_auth: None,
            dest_auth: None,
            workspace: PathBuf::from(DEFAULT_WORKSPACE),
            remote_name: DEFAULT_REMOTE.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn dest_url(&self) -> &str {
        &self.dest_url
    }

    pub fn source_auth(&self) -> Option<&Credentials> {
        self.source_auth.as_ref()
    }

    pub fn dest_auth(&self) -> Option<&Credentials> {
        self.dest_auth.as_ref()
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn remote_name(&self) -> &str {
        &self.remote_name
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Builder for [`MigrationJob`], in the style of `Command` builders
#[derive(Debug, Clone)]
pub struct MigrationJobBuilder {
    source_url: String,
    dest_url: String,
    source_auth: Option<Credentials>,
    dest_auth: Option<Credentials>,
    workspace: PathBuf,
    remote_name: String,
    timeout: Duration,
}

impl MigrationJobBuilder {
    pub fn source_auth(mut self, auth: Option<Credentials>) -> Self {
        self.source_auth = auth;
        self
    }

    pub fn dest_auth(mut self, auth: Option<Credentials>) -> Self {
        self.dest_auth = auth;
        self
    }

    pub fn workspace(mut self, path: impl Into<PathBuf>) -> Self {
        self.workspace = path.into();
        self
    }

    pub fn remote_name(mut self, name: impl Into<String>) -> Self {
        self.remote_name = name.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> MigrationJob {
        MigrationJob {
            source_url: self.source_url,
            dest_url: self.dest_url,
            source_auth: self.source_auth,
            dest_auth: self.dest_auth,
            workspace: self.workspace,
            remote_name: self.remote_name,
            timeout: self.timeout,
        }
    }
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! End-to-end pipeline tests against a stub `git` that speaks the same
//! output contract as the real tool, prompts included. Everything runs
//! through a real PTY.

#![cfg(unix)]

use rf_core::{Credentials, ErrorPolicy, MigrateError, MigrationJob, Migrator};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Mimics `git clone/remote/push` output closely enough for the pattern
/// contract. The push path prompts for credentials and accepts any.
const STUB_GIT: &str = r#"#!/bin/sh
case "$1" in
  clone)
    printf "Cloning into bare repository 'stub.git'...\n"
    mkdir -p stub.git
    printf "remote: Enumerating objects: 10, done.\n"
    printf "Unpacking objects: 100%% (10/10), done.\n"
    ;;
  remote)
    exit 0
    ;;
  push)
    printf "Username for 'https://dest.example.com': "
    read -r _user
    printf "Password for 'https://dest.example.com': "
    read -r _pass
    printf "remote: Resolving deltas: 100%% (5/5), done.\n"
    printf "To https://dest.example.com/mirror.git\n"
    ;;
  *)
    printf "fatal: unknown subcommand\n"
    exit 1
    ;;
esac
"#;

const STUB_GIT_FATAL_CLONE: &str = r#"#!/bin/sh
printf "fatal: repository 'https://src.example.com/missing.git' not found\n"
exit 128
"#;

fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn job(workspace: &Path) -> MigrationJob {
    MigrationJob::builder(
        "https://src.example.com/alice/stub.git",
        "https://dest.example.com/bob/stub.git",
    )
    .workspace(workspace)
    .dest_auth(Some(Credentials::new("bob", "token")))
    .timeout(Duration::from_secs(10))
    .build()
}

#[tokio::test]
async fn migrates_end_to_end_and_removes_a_fresh_workspace() {
    let base = tempfile::tempdir().unwrap();
    let stub = write_stub(base.path(), "stub-git", STUB_GIT);
    let workspace = base.path().join("workspace");

    let migrator = Migrator::with_program(stub.to_string_lossy());
    let outcome = migrator.run(&job(&workspace)).await.unwrap();

    assert_eq!(outcome.repo_path, workspace.join("stub.git"));
    // Fresh workspace: removed wholesale at cleanup.
    assert!(!workspace.exists());
}

#[tokio::test]
async fn pre_existing_workspace_survives_with_only_the_clone_removed() {
    let base = tempfile::tempdir().unwrap();
    let stub = write_stub(base.path(), "stub-git", STUB_GIT);
    let workspace = base.path().join("workspace");
    fs::create_dir(&workspace).unwrap();
    fs::write(workspace.join("unrelated.txt"), "keep me").unwrap();

    let migrator = Migrator::with_program(stub.to_string_lossy());
    migrator.run(&job(&workspace)).await.unwrap();

    assert!(workspace.exists());
    assert!(workspace.join("unrelated.txt").exists());
    assert!(!workspace.join("stub.git").exists());
}

#[tokio::test]
async fn missing_destination_credentials_abort_at_the_push_prompt() {
    let base = tempfile::tempdir().unwrap();
    let stub = write_stub(base.path(), "stub-git", STUB_GIT);
    let workspace = base.path().join("workspace");

    let job = MigrationJob::builder(
        "https://src.example.com/alice/stub.git",
        "https://dest.example.com/bob/stub.git",
    )
    .workspace(&workspace)
    .timeout(Duration::from_secs(10))
    .build();

    let migrator = Migrator::with_program(stub.to_string_lossy());
    let err = migrator.run(&job).await.unwrap_err();
    match err {
        MigrateError::AuthRequired { server } => {
            assert_eq!(server, "https://dest.example.com");
        }
        other => panic!("expected AuthRequired, got {other:?}"),
    }
    // Cleanup still ran.
    assert!(!workspace.exists());
}

#[tokio::test]
async fn fatal_clone_surfaces_the_tools_diagnostic() {
    let base = tempfile::tempdir().unwrap();
    let stub = write_stub(base.path(), "stub-git", STUB_GIT_FATAL_CLONE);
    let workspace = base.path().join("workspace");

    let migrator = Migrator::with_program(stub.to_string_lossy());
    let err = migrator.run(&job(&workspace)).await.unwrap_err();
    match err {
        MigrateError::RemoteFatal { output, .. } => {
            assert!(output.contains("not found"), "diagnostic was {output:?}");
        }
        other => panic!("expected RemoteFatal, got {other:?}"),
    }
    assert!(!workspace.exists());
}

#[tokio::test]
async fn missing_binary_is_a_spawn_error() {
    let base = tempfile::tempdir().unwrap();
    let workspace = base.path().join("workspace");

    let migrator = Migrator::with_program("rf-definitely-not-installed");
    let err = migrator.run(&job(&workspace)).await.unwrap_err();
    assert_eq!(err.exit_code(), 10);
}

#[tokio::test]
async fn batch_continue_runs_every_repo_and_reports_failures() {
    use rf_core::{BatchPlan, run_batch_with};

    let base = tempfile::tempdir().unwrap();
    let stub = write_stub(base.path(), "stub-git", STUB_GIT);
    let workspace = base.path().join("workspace");

    let mut plan = BatchPlan::new(
        "src.example.com",
        "dest.example.com",
        vec!["alice/stub".to_string(), "/broken".to_string()],
        "bob",
    );
    plan.dest_auth = Some(Credentials::new("bob", "token"));
    plan.workspace = workspace.clone();
    plan.timeout = Duration::from_secs(10);
    plan.on_error = ErrorPolicy::Continue;

    let migrator = Migrator::with_program(stub.to_string_lossy());
    let summary = run_batch_with(&migrator, &plan).await.unwrap();

    assert_eq!(summary.outcomes.len(), 2);
    assert_eq!(summary.failed(), 1);
    // Fresh base workspace: removed after the batch.
    assert!(!workspace.exists());
}

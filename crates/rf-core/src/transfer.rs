// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The shared clone/push state machine.
//!
//! Both transfer operations have the same shape — wait for success, fatal,
//! or a credential prompt; authenticate when invited; classify whatever
//! comes next — and differ only in their pattern sets. The process is
//! terminated on every exit path.

use crate::auth;
use crate::credentials::Credentials;
use crate::error::{MigrateError, Result, Stage};
use rf_pty::{PatternKind, PatternSet, PtyMatch, PtyProcess};
use tracing::{debug, warn};

/// Drive one transfer operation to completion.
///
/// Consumes the process; by the time this returns the child has been
/// terminated, whatever the outcome.
pub(crate) async fn drive_transfer(
    mut process: PtyProcess,
    transfer: &PatternSet,
    credentials: Option<&Credentials>,
    stage: Stage,
) -> Result<()> {
    let outcome = classify(&mut process, transfer, credentials, stage).await;
    process.terminate();
    outcome
}

async fn classify(
    process: &mut PtyProcess,
    transfer: &PatternSet,
    credentials: Option<&Credentials>,
    stage: Stage,
) -> Result<()> {
    let mut matched = process.expect(transfer).await?;

    if matched.kind == PatternKind::UsernamePrompt {
        let server = matched.capture(0).unwrap_or_default().to_string();
        matched = auth::authenticate(process, &server, credentials, transfer).await?;
    }

    match matched.kind {
        PatternKind::Success => {
            process.drain().await?;
            debug!(%stage, "transfer completed");
            Ok(())
        }
        PatternKind::Fatal => Err(fatal(process, stage, matched).await),
        PatternKind::UsernamePrompt => {
            // A second prompt right after an authentication round means the
            // credentials were rejected.
            let server = matched.capture(0).unwrap_or_default().to_string();
            warn!(%stage, server, "credentials rejected");
            Err(MigrateError::AuthRequired { server })
        }
    }
}

/// Collect the rest of the fatal diagnostic and re-attach the prefix the
/// match consumed, so the error reads like git's own message.
async fn fatal(process: &mut PtyProcess, stage: Stage, matched: PtyMatch) -> MigrateError {
    let detail = process.drain().await.unwrap_or_default();
    let mut output = String::new();
    if !matched.before.is_empty() {
        output.push_str(&matched.before);
        output.push('\n');
    }
    output.push_str("fatal: ");
    output.push_str(detail.trim());
    MigrateError::RemoteFatal { stage, output }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns;
    use crate::test_support::scripted_process;
    use rf_pty::DriverError;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[tokio::test]
    async fn push_without_prompt_completes_without_sending_anything() {
        let (process, written, _) = scripted_process(
            &[
                "Enumerating objects: 12, done.\r\n",
                "remote: Resolving deltas: 100% (5/5), done.\r\n",
                "To https://example.com/mirror.git\r\n",
            ],
            false,
            Duration::from_secs(1),
        );
        drive_transfer(process, &patterns::push_transfer(), None, Stage::Push)
            .await
            .unwrap();
        assert!(written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fatal_before_success_terminates_and_reports() {
        let (process, _, kills) = scripted_process(
            &["fatal: repository 'https://example.com/missing.git' not found\r\n"],
            false,
            Duration::from_secs(1),
        );
        let err = drive_transfer(process, &patterns::clone_transfer(), None, Stage::Clone)
            .await
            .unwrap_err();
        match err {
            MigrateError::RemoteFatal { stage, output } => {
                assert_eq!(stage, Stage::Clone);
                assert!(output.contains("fatal: repository"));
            }
            other => panic!("expected RemoteFatal, got {other:?}"),
        }
        assert_eq!(kills.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn prompt_without_credentials_is_auth_required_and_terminates() {
        let (process, written, kills) = scripted_process(
            &["Username for 'https://example.com': "],
            true,
            Duration::from_secs(1),
        );
        let err = drive_transfer(process, &patterns::push_transfer(), None, Stage::Push)
            .await
            .unwrap_err();
        match err {
            MigrateError::AuthRequired { server } => assert_eq!(server, "https://example.com"),
            other => panic!("expected AuthRequired, got {other:?}"),
        }
        assert!(written.lock().unwrap().is_empty());
        assert_eq!(kills.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn authenticated_push_resumes_classification() {
        let (process, written, _) = scripted_process(
            &[
                "Username for 'https://example.com': ",
                "Password for 'https://example.com': ",
                "remote: Resolving deltas: 100% (5/5), done.\r\n",
            ],
            false,
            Duration::from_secs(1),
        );
        let creds = Credentials::new("alice", "s3cret");
        drive_transfer(process, &patterns::push_transfer(), Some(&creds), Stage::Push)
            .await
            .unwrap();
        let bytes = written.lock().unwrap();
        assert_eq!(String::from_utf8_lossy(&bytes), "alice\ns3cret\n");
    }

    #[tokio::test]
    async fn eof_without_any_match_is_unexpected_termination() {
        let (process, _, kills) = scripted_process(
            &["Counting objects: 3, done.\r\n"],
            false,
            Duration::from_secs(1),
        );
        let err = drive_transfer(process, &patterns::push_transfer(), None, Stage::Push)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MigrateError::Driver(DriverError::UnexpectedTermination { .. })
        ));
        assert_eq!(kills.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn timeout_before_any_pattern_terminates_exactly_once() {
        let (process, _, kills) =
            scripted_process(&["Counting objects"], true, Duration::from_millis(50));
        let err = drive_transfer(process, &patterns::push_transfer(), None, Stage::Push)
            .await
            .unwrap_err();
        assert!(matches!(err, MigrateError::Driver(DriverError::Timeout { .. })));
        assert_eq!(kills.load(Ordering::SeqCst), 1);
    }
}

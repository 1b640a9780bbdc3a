// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Credential injection for interactive username/password prompts

use crate::credentials::Credentials;
use crate::error::{MigrateError, Result};
use crate::patterns;
use rf_pty::{PatternSet, PtyMatch, PtyProcess};
use tracing::{debug, info};

/// Answer a username prompt that `expect` just matched.
///
/// With no credentials on hand this fails with [`MigrateError::AuthRequired`]
/// without writing a single byte; credentials are only ever injected when
/// the tool explicitly asked. Otherwise exactly one username line and one
/// secret line are sent, the secret strictly after the password prompt has
/// been observed, and the transfer classification is re-run and returned.
pub(crate) async fn authenticate(
    process: &mut PtyProcess,
    server: &str,
    credentials: Option<&Credentials>,
    transfer: &PatternSet,
) -> Result<PtyMatch> {
    let Some(credentials) = credentials else {
        return Err(MigrateError::AuthRequired {
            server: server.to_string(),
        });
    };

    debug!(server, username = credentials.username(), "answering credential prompt");
    process.send_line(credentials.username())?;
    process.expect(&patterns::password_prompt()).await?;
    process.send_line(credentials.secret())?;
    info!(server, "authenticated");

    Ok(process.expect(transfer).await?)
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The text-stream contract with the external `git` binary.
//!
//! Every output literal this crate recognizes lives here. The contract is
//! best-effort and version-fragile by nature; when a git release changes its
//! human-oriented output, this module is the only place to touch.

use rf_pty::{PatternKind, PatternSet};

/// Start of a bare clone; group 1 captures the directory git creates.
pub fn clone_start() -> PatternSet {
    PatternSet::new()
        .with(PatternKind::Success, r"Cloning into bare repository '(.+)'\.\.\.")
        .with(PatternKind::Fatal, r"fatal: ")
}

/// Transfer phase of a bare clone: success, fatal, or a credential prompt.
pub fn clone_transfer() -> PatternSet {
    PatternSet::new()
        .with(PatternKind::Success, r"Unpacking objects: [0-9]+% \([0-9]+/[0-9]+\), done\.")
        .with(PatternKind::Fatal, r"fatal: ")
        .with(PatternKind::UsernamePrompt, r"Username for '(.+)':")
}

/// Transfer phase of a mirror push.
pub fn push_transfer() -> PatternSet {
    PatternSet::new()
        .with(
            PatternKind::Success,
            r"remote: Resolving deltas: [0-9]+% \([0-9]+/[0-9]+\), done\.",
        )
        .with(PatternKind::Fatal, r"fatal: ")
        .with(PatternKind::UsernamePrompt, r"Username for '(.+)':")
}

/// The password prompt that follows a username line.
///
/// The kind tag is irrelevant here; this set is only ever used to wait for
/// the one prompt.
pub fn password_prompt() -> PatternSet {
    PatternSet::new().with(PatternKind::Success, r"Password for '.+':")
}

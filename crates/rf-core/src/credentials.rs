// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Credential pairs for authenticated remotes

/// A username/secret pair for one remote.
///
/// The pair is atomic: either both fields are present or there are no
/// credentials at all. [`Credentials::from_parts`] normalizes a partially
/// specified pair to `None`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    secret: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    /// Build a credential pair from optional parts; anything less than both
    /// present is treated as wholly absent.
    pub fn from_parts(username: Option<String>, secret: Option<String>) -> Option<Self> {
        match (username, secret) {
            (Some(username), Some(secret)) => Some(Self { username, secret }),
            _ => None,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

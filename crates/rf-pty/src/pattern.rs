// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Ordered collections of recognized output signatures.
//!
//! A [`PatternSet`] describes what a single `expect` call is waiting for:
//! each entry is a regular expression tagged with the meaning of a match.
//! Entries are ordered; when several patterns could match, the one whose
//! match starts earliest in the buffer wins, and declaration order breaks
//! ties.

use regex::Regex;

/// Classification of a matched output signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// The operation reported success
    Success,
    /// The tool reported a fatal error
    Fatal,
    /// The tool is asking for a username; the first capture group holds the
    /// server identity the prompt names
    UsernamePrompt,
}

/// One recognized signature: a compiled regex plus its meaning
#[derive(Debug, Clone)]
pub struct Pattern {
    kind: PatternKind,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern from a regex literal.
    ///
    /// Panics if the literal is not a valid regex. Pattern sets are built
    /// from hardcoded literals, so a failure here is a programming error.
    pub fn new(kind: PatternKind, pattern: &str) -> Self {
        let regex = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid pattern literal {pattern:?}: {e}"));
        Self { kind, regex }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }
}

/// An ordered list of recognized signatures for one external-tool invocation
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

/// Location and content of a successful scan, in buffer byte offsets
#[derive(Debug, Clone)]
pub(crate) struct Found {
    pub index: usize,
    pub kind: PatternKind,
    pub captures: Vec<String>,
    pub start: usize,
    pub end: usize,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pattern; see [`Pattern::new`] for the panic contract.
    pub fn with(mut self, kind: PatternKind, pattern: &str) -> Self {
        self.patterns.push(Pattern::new(kind, pattern));
        self
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Scan a buffer without a process attached; returns the winning
    /// pattern's kind and capture groups. Useful for transcript tests.
    pub fn scan(&self, haystack: &str) -> Option<(PatternKind, Vec<String>)> {
        self.find(haystack).map(|f| (f.kind, f.captures))
    }

    /// Scan the buffer for the winning match: earliest start position first,
    /// declaration order as the tie-breaker.
    pub(crate) fn find(&self, haystack: &str) -> Option<Found> {
        let mut best: Option<Found> = None;
        for (index, pattern) in self.patterns.iter().enumerate() {
            let Some(caps) = pattern.regex.captures(haystack) else {
                continue;
            };
            let whole = caps.get(0).expect("group 0 always present");
            if best.as_ref().is_some_and(|b| b.start <= whole.start()) {
                continue;
            }
            let captures = caps
                .iter()
                .skip(1)
                .map(|c| c.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect();
            best = Some(Found {
                index,
                kind: pattern.kind,
                captures,
                start: whole.start(),
                end: whole.end(),
            });
        }
        best
    }
}

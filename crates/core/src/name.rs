// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event name normalization
//!
//! Every component that uses an event name as a registry key must normalize
//! it first, with identical configuration, so type-derived and wire-derived
//! names compare equal.

/// Normalizes raw event names by trimming configured prefix/suffix character
/// sets.
///
/// The trim is a character-set trim, not a substring trim: any leading run of
/// characters belonging to the prefix's character set is removed, and
/// likewise for the suffix at the end. The transform is deterministic and
/// idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventNameProcessor {
    prefix: String,
    suffix: String,
    strip_prefix: bool,
    strip_suffix: bool,
}

impl EventNameProcessor {
    pub fn new(
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        strip_prefix: bool,
        strip_suffix: bool,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            strip_prefix,
            strip_suffix,
        }
    }

    /// A processor that leaves names untouched.
    pub fn passthrough() -> Self {
        Self::new("", "", false, false)
    }

    pub fn process(&self, raw: &str) -> String {
        let mut name = raw;
        if self.strip_prefix {
            name = name.trim_start_matches(|c| self.prefix.contains(c));
        }
        if self.strip_suffix {
            name = name.trim_end_matches(|c| self.suffix.contains(c));
        }
        name.to_string()
    }
}

#[cfg(test)]
#[path = "name_tests.rs"]
mod tests;

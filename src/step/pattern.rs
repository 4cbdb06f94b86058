// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Full-match step [`Pattern`].

use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

use derive_more::with_trait::{Debug, Display};
use regex::Regex;

use crate::error::ConfigError;

/// Compiled step pattern, matching the whole step text only.
///
/// Compares, orders and hashes by the pattern as it was registered.
#[derive(Clone, Debug, Display)]
#[display("{raw}")]
pub struct Pattern {
    /// Pattern as it was registered.
    raw: String,

    /// `raw` anchored at both ends.
    #[debug(skip)]
    regex: Regex,
}

impl Pattern {
    /// Compiles the given `pattern`.
    ///
    /// # Errors
    ///
    /// With [`ConfigError::InvalidPattern`] if `pattern` isn't a valid
    /// [`Regex`].
    pub fn new(pattern: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = pattern.into();
        match Regex::new(&format!("^(?:{raw})$")) {
            Ok(regex) => Ok(Self { raw, regex }),
            Err(source) => Err(ConfigError::InvalidPattern { pattern: raw, source }),
        }
    }

    /// Returns the pattern as it was registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Number of capture groups, not counting the implicit whole-match one.
    #[must_use]
    pub fn captures_len(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// Matches the whole `text`, returning the capture groups in declaration
    /// order.
    ///
    /// A group that didn't participate in the match captures an empty string.
    /// Returns [`None`] if `text` doesn't match in full.
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(text)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map_or_else(String::new, |m| m.as_str().to_owned()))
                .collect(),
        )
    }
}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Pattern {}

impl PartialOrd for Pattern {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pattern {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Structural configuration errors.
//!
//! Any of these aborts the whole [`Source`] it was raised for, before a single
//! test case of it runs.
//!
//! [`Source`]: crate::runner::Source

use std::io;

use derive_more::with_trait::{Display, Error};

/// Structural error of a [`Source`]: its documents or step registrations can
/// not be turned into runnable test cases.
///
/// [`Source`]: crate::runner::Source
#[derive(Debug, Display, Error)]
pub enum ConfigError {
    /// A [`Feature`] or a [`Rule`] declares more than one [`Background`].
    ///
    /// [`Background`]: crate::document::Background
    /// [`Feature`]: crate::document::Feature
    /// [`Rule`]: crate::document::Rule
    #[display("Multiple backgrounds found in `{scope}` of `{document}`")]
    MultipleBackgrounds {
        /// Name of the [`Document`] holding the `scope`.
        ///
        /// [`Document`]: crate::document::Document
        #[error(not(source))]
        document: String,

        /// Name of the [`Feature`] or [`Rule`] with several [`Background`]s.
        ///
        /// [`Background`]: crate::document::Background
        /// [`Feature`]: crate::document::Feature
        /// [`Rule`]: crate::document::Rule
        scope: String,
    },

    /// A row of [`Examples`] has a different number of cells than the header.
    ///
    /// [`Examples`]: crate::document::Examples
    #[display(
        "Number of headers in examples should match number of values: \
         `{scenario}` of `{document}` has {header} header(s), \
         but example row #{row} has {cells} value(s)"
    )]
    ExampleArity {
        /// Name of the [`Document`] holding the `scenario`.
        ///
        /// [`Document`]: crate::document::Document
        #[error(not(source))]
        document: String,

        /// Name of the outline [`Scenario`].
        ///
        /// [`Scenario`]: crate::document::Scenario
        scenario: String,

        /// Number of header cells.
        header: usize,

        /// 1-based number of the offending row, counted across all the
        /// [`Examples`] of the `scenario`.
        ///
        /// [`Examples`]: crate::document::Examples
        row: usize,

        /// Number of cells in the offending row.
        cells: usize,
    },

    /// Step pattern is not a valid [`Regex`].
    ///
    /// [`Regex`]: regex::Regex
    #[display("Invalid step pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// Pattern as it was registered.
        pattern: String,

        /// Compilation error.
        source: regex::Error,
    },

    /// Several [`Document`]s of one [`Source`] share a name, so the
    /// fully-qualified names of their test cases would collide.
    ///
    /// [`Document`]: crate::document::Document
    /// [`Source`]: crate::runner::Source
    #[display("Multiple documents are named `{name}`")]
    DuplicateDocument {
        /// Name shared by the [`Document`]s.
        ///
        /// [`Document`]: crate::document::Document
        #[error(not(source))]
        name: String,
    },

    /// `.feature` file failed to parse.
    #[display("Failed to parse feature file `{path}`: {source}")]
    Parse {
        /// Path to the file.
        path: String,

        /// Parsing error.
        source: gherkin::ParseFileError,
    },

    /// Walking a directory for `.feature` files failed.
    #[display("Failed to look up feature files in `{path}`: {source}")]
    Walk {
        /// Walked directory.
        path: String,

        /// Walking error.
        source: globwalk::GlobError,
    },

    /// I/O error while accessing `.feature` files.
    #[display("Failed to access `{path}`: {source}")]
    Io {
        /// Accessed path.
        path: String,

        /// I/O error.
        source: io::Error,
    },

    /// Any other failure of a [`Source`] to provide its documents or step
    /// registrations.
    ///
    /// [`Source`]: crate::runner::Source
    #[display("Failed to load `{source_name}`: {error:#}")]
    Load {
        /// Name of the failed [`Source`].
        ///
        /// [`Source`]: crate::runner::Source
        #[error(not(source))]
        source_name: String,

        /// Underlying failure.
        #[error(not(source))]
        error: anyhow::Error,
    },
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Creates a new [`ConfigError::Load`] for the given [`Source`].
    ///
    /// [`Source`]: crate::runner::Source
    #[must_use]
    pub fn load(source_name: impl Into<String>, error: impl Into<anyhow::Error>) -> Self {
        Self::Load { source_name: source_name.into(), error: error.into() }
    }
}

/// [`ConfigError`] which aborted a whole [`Source`] during discovery.
///
/// [`Source`]: crate::runner::Source
#[derive(Debug, Display, Error)]
#[display("Source `{source_name}` aborted: {error}")]
pub struct SourceError {
    /// Name of the aborted [`Source`].
    ///
    /// [`Source`]: crate::runner::Source
    #[error(not(source))]
    pub source_name: String,

    /// Reason of the abort.
    #[error(source)]
    pub error: ConfigError,
}

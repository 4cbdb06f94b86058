// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Command line options and configuration of a [`Runner`].
//!
//! [`Cli`] is a [`clap::Args`] group, so a host binary can flatten it into
//! its own options:
//!
//! ```rust
//! use clap::Parser;
//! use gherkin_runner::{cli, runner::Runner};
//!
//! #[derive(Parser)]
//! struct Opts {
//!     #[command(flatten)]
//!     runner: cli::Cli,
//!
//!     /// Directory with `.feature` files.
//!     #[arg(long, default_value = "tests/features")]
//!     features: String,
//! }
//!
//! let opts = Opts::parse_from(["host", "--tags", "@smoke", "-c", "4"]);
//! let runner = Runner::with_cli(opts.runner);
//!
//! assert_eq!(runner.config().max_concurrent_cases, 4);
//! assert!(runner.config().tags_filter.is_some());
//! ```
//!
//! [`Runner`]: crate::runner::Runner

use gherkin::tagexpr::TagOperation;
use regex::Regex;
use smart_default::SmartDefault;

use crate::tag::Ext as _;

/// CLI options of a [`Runner`].
///
/// [`Runner`]: crate::runner::Runner
#[derive(Clone, Debug, Default, clap::Args)]
#[group(skip)]
pub struct Cli {
    /// Regex to filter test cases by their fully-qualified name.
    #[arg(
        id = "name",
        long = "name",
        short = 'n',
        value_name = "regex",
        visible_alias = "scenario-name",
        global = true
    )]
    pub re_filter: Option<Regex>,

    /// Tag expression to filter test cases by.
    ///
    /// Note: Tags from Feature, Rule and Scenario are merged together on
    /// filtering, so be careful about conflicting tags on different levels.
    #[arg(
        id = "tags",
        long = "tags",
        short = 't',
        value_name = "tagexpr",
        visible_alias = "scenario-tags",
        conflicts_with = "name",
        global = true
    )]
    pub tags_filter: Option<TagOperation>,

    /// Number of test cases to run concurrently. If not specified, uses the
    /// value configured in tests runner, or 64 by default.
    #[arg(long, short, value_name = "int", global = true)]
    pub concurrency: Option<usize>,
}

/// Effective configuration of a [`Runner`].
///
/// [`Runner`]: crate::runner::Runner
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// Maximum number of test cases executed concurrently.
    #[default(64)]
    pub max_concurrent_cases: usize,

    /// Only test cases whose fully-qualified name matches are executed.
    pub name_filter: Option<Regex>,

    /// Only test cases whose tags match are executed.
    pub tags_filter: Option<TagOperation>,
}

impl Config {
    /// Indicates whether a test case with the given fully-qualified `name`
    /// and `tags` passes the filters of this [`Config`].
    #[must_use]
    pub fn matches<S: AsRef<str>>(&self, name: &str, tags: &[S]) -> bool {
        self.name_filter.as_ref().map_or(true, |re| re.is_match(name))
            && self.tags_filter.as_ref().map_or(true, |op| op.eval(tags))
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let mut config = Self {
            name_filter: cli.re_filter,
            tags_filter: cli.tags_filter,
            ..Self::default()
        };
        if let Some(n) = cli.concurrency {
            config.max_concurrent_cases = n;
        }
        config
    }
}

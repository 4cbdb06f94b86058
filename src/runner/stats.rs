// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Summary of executed test cases.

use derive_more::with_trait::Display;

use super::{Status, TestOutcome};

/// Number of passed and failed test cases.
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
#[display("{total} cases ({passed} passed, {failed} failed)")]
pub struct Stats {
    /// Number of passed cases.
    pub passed: usize,

    /// Number of failed cases.
    pub failed: usize,

    /// Total number of executed cases.
    pub total: usize,
}

impl Stats {
    /// Indicates whether at least one case has failed.
    #[must_use]
    pub const fn execution_has_failed(&self) -> bool {
        self.failed > 0
    }
}

impl<'o> FromIterator<&'o TestOutcome> for Stats {
    fn from_iter<I: IntoIterator<Item = &'o TestOutcome>>(outcomes: I) -> Self {
        outcomes.into_iter().fold(Self::default(), |mut stats, o| {
            match o.status {
                Status::Passed => stats.passed += 1,
                Status::Failed => stats.failed += 1,
            }
            stats.total += 1;
            stats
        })
    }
}

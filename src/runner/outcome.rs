// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Results of executing test cases.

use std::{
    fmt,
    time::{Duration, SystemTime},
};

use derive_more::with_trait::Display;

use crate::error::StepError;

/// Final status of an executed test case.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Status {
    /// Every step completed successfully.
    #[display("passed")]
    Passed,

    /// Some step failed, and the following ones weren't run.
    #[display("failed")]
    Failed,
}

/// Lifecycle of a single test case.
///
/// Only `Pending -> Running -> Passed | Failed` transitions are possible: there
/// is no skipped state, so a case never disappears from the results.
#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum CaseState {
    /// Not started yet.
    #[default]
    #[display("pending")]
    Pending,

    /// Steps are being executed.
    #[display("running")]
    Running,

    /// Finished with the given [`Status`].
    #[display("{_0}")]
    Finished(Status),
}

impl CaseState {
    /// Moves a [`CaseState::Pending`] case into [`CaseState::Running`].
    ///
    /// Any other state is returned unchanged.
    #[must_use]
    pub const fn start(self) -> Self {
        match self {
            Self::Pending => Self::Running,
            other => other,
        }
    }

    /// Moves a [`CaseState::Running`] case into [`CaseState::Finished`].
    ///
    /// Any other state is returned unchanged.
    #[must_use]
    pub const fn finish(self, status: Status) -> Self {
        match self {
            Self::Running => Self::Finished(status),
            other => other,
        }
    }

    /// Returns the [`Status`] of a finished case.
    #[must_use]
    pub const fn status(self) -> Option<Status> {
        match self {
            Self::Finished(s) => Some(s),
            Self::Pending | Self::Running => None,
        }
    }
}

/// Outcome of executing one test case.
#[derive(Debug)]
pub struct TestOutcome {
    /// Fully-qualified name of the executed case.
    pub id: String,

    /// Final [`Status`] of the case.
    pub status: Status,

    /// Error that failed the case, if any.
    pub error: Option<StepError>,

    /// Time the case was started at.
    pub started_at: SystemTime,

    /// Time spent executing the case.
    pub duration: Duration,

    /// Number of steps that were started, including the failed one.
    pub steps_attempted: usize,
}

impl TestOutcome {
    /// Indicates whether the case passed.
    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.status == Status::Passed
    }

    /// Short message of the error that failed the case.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Full diagnostic detail of the error that failed the case.
    #[must_use]
    pub fn error_detail(&self) -> Option<String> {
        self.error.as_ref().map(StepError::detail)
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} in {}",
            self.id,
            self.status,
            humantime::format_duration(self.duration),
        )?;
        if let Some(e) = &self.error {
            write!(f, ": {e}")?;
        }
        Ok(())
    }
}

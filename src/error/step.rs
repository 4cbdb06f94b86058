// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Per-case step errors.
//!
//! Each of these fails only the test case it was raised in, turning it into a
//! [`Failed`] outcome. Sibling cases keep running.
//!
//! [`Failed`]: crate::runner::Status::Failed

use std::{any::Any, fmt};

use derive_more::with_trait::{Display, Error};
use itertools::Itertools as _;

use crate::{keyword::Primary, step::Location};

/// Failure of a single step, failing the whole test case.
#[derive(Debug, Display, Error)]
pub enum StepError {
    /// No [`Registration`] matches the step.
    ///
    /// [`Registration`]: crate::step::Registration
    #[display("Unable to find step implementation for: {keyword} {text}")]
    NotFound {
        /// Effective keyword of the step.
        keyword: Primary,

        /// Literal step text.
        #[error(not(source))]
        text: String,
    },

    /// More than one [`Registration`] matches the step.
    ///
    /// [`Registration`]: crate::step::Registration
    #[display(
        "Multiple step implementations were found for: {keyword} {text}\n\
         {candidates}"
    )]
    Ambiguous {
        /// Effective keyword of the step.
        keyword: Primary,

        /// Literal step text.
        #[error(not(source))]
        text: String,

        /// All the matching [`Registration`]s.
        ///
        /// [`Registration`]: crate::step::Registration
        #[error(not(source))]
        candidates: Candidates,
    },

    /// Declared parameters of a handler disagree with the number of
    /// arguments the step provides.
    #[display(
        "Invalid parameter count for `{handler}`: step `{step}` provides \
         {expected} argument(s), but {declared} parameter(s) are declared"
    )]
    Arity {
        /// Identity of the handler.
        #[error(not(source))]
        handler: String,

        /// Literal step text.
        step: String,

        /// Number of captured groups, plus one for a structured argument.
        expected: usize,

        /// Number of declared parameters.
        declared: usize,
    },

    /// Captured value can't be coerced into its declared parameter type.
    #[display(
        "Unable to parse arguments for step: {step}: parameter #{parameter} \
         of type `{ty}` can't be parsed from `{value}`: {reason}"
    )]
    Conversion {
        /// Literal step text.
        #[error(not(source))]
        step: String,

        /// 1-based position of the parameter.
        parameter: usize,

        /// Name of the declared parameter type.
        ty: String,

        /// Offending value.
        value: String,

        /// Why the coercion failed.
        reason: String,
    },

    /// Owner of the handler couldn't be instantiated.
    #[display("Unable to instantiate `{owner}` for step `{step}`: {error:#}")]
    Instantiation {
        /// Literal step text.
        #[error(not(source))]
        step: String,

        /// Name of the owner type.
        #[error(not(source))]
        owner: String,

        /// Underlying failure.
        #[error(not(source))]
        error: anyhow::Error,
    },

    /// Handler itself failed, either immediately or from its deferred
    /// computation.
    #[display("Step `{step}` failed: {failure}")]
    Invocation {
        /// Literal step text.
        #[error(not(source))]
        step: String,

        /// Failure reported by the handler.
        #[error(not(source))]
        failure: HandlerFailure,
    },
}

/// Result type alias for step operations.
pub type StepResult<T> = Result<T, StepError>;

impl StepError {
    /// Renders the full diagnostic detail of this [`StepError`].
    ///
    /// Handler errors are rendered with their whole cause chain and backtrace
    /// (if captured), panics with their payload. Everything else is rendered
    /// as its message.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Invocation { step, failure: HandlerFailure::Error(e) } => {
                format!("Step `{step}` failed: {e:?}")
            }
            Self::Instantiation { step, owner, error } => {
                format!("Unable to instantiate `{owner}` for step `{step}`: {error:?}")
            }
            other => other.to_string(),
        }
    }

    /// Returns the literal text of the failed step, if this error is tied to
    /// one.
    #[must_use]
    pub fn step_text(&self) -> Option<&str> {
        match self {
            Self::NotFound { text, .. } | Self::Ambiguous { text, .. } => {
                Some(text)
            }
            Self::Arity { step, .. }
            | Self::Conversion { step, .. }
            | Self::Instantiation { step, .. }
            | Self::Invocation { step, .. } => Some(step),
        }
    }
}

/// Failure reported by a step handler.
#[derive(Debug, Display)]
pub enum HandlerFailure {
    /// Handler returned an error.
    #[display("{_0:#}")]
    Error(anyhow::Error),

    /// Handler panicked.
    #[display("panicked: {_0}")]
    Panic(String),
}

impl HandlerFailure {
    /// Creates a [`HandlerFailure::Panic`] out of a caught panic payload.
    #[must_use]
    pub fn panic(payload: &(dyn Any + Send)) -> Self {
        Self::Panic(payload.to_readable_string())
    }
}

/// Sorted list of the patterns (and their [`Location`]s) that matched an
/// ambiguous step.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Candidates(Vec<(String, Option<Location>)>);

impl Candidates {
    /// Creates new [`Candidates`], sorting them.
    #[must_use]
    pub fn new(matches: impl IntoIterator<Item = (String, Option<Location>)>) -> Self {
        Self(matches.into_iter().sorted().collect())
    }

    /// Returns the sorted candidates.
    #[must_use]
    pub fn as_slice(&self) -> &[(String, Option<Location>)] {
        &self.0
    }

    /// Returns the number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether there are no candidates at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Candidates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Possible matches:")?;
        for (pattern, loc) in &self.0 {
            write!(f, "\n{pattern}")?;
            if let Some(loc) = loc {
                write!(f, " --> {loc}")?;
            }
        }
        Ok(())
    }
}

/// Conversion of a caught panic payload into a readable message.
pub trait PanicPayloadExt {
    /// Converts this panic payload into a readable string.
    fn to_readable_string(&self) -> String;
}

impl PanicPayloadExt for dyn Any + Send {
    fn to_readable_string(&self) -> String {
        if let Some(s) = self.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = self.downcast_ref::<&str>() {
            (*s).to_owned()
        } else {
            "Unknown panic payload".to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_keyword_and_text() {
        let err = StepError::NotFound {
            keyword: Primary::When,
            text: "I fly".into(),
        };

        assert_eq!(
            err.to_string(),
            "Unable to find step implementation for: When I fly",
        );
        assert_eq!(err.step_text(), Some("I fly"));
    }

    #[test]
    fn ambiguous_lists_sorted_candidates() {
        let err = StepError::Ambiguous {
            keyword: Primary::Given,
            text: "a cat".into(),
            candidates: Candidates::new([
                ("a (.*)".to_owned(), Some(Location::new("steps.rs", 9, 5))),
                ("a cat".to_owned(), None),
            ]),
        };

        assert_eq!(
            err.to_string(),
            "Multiple step implementations were found for: Given a cat\n\
             Possible matches:\n\
             a (.*) --> steps.rs:9:5\n\
             a cat",
        );
    }

    #[test]
    fn invocation_detail_keeps_cause_chain() {
        let err = StepError::Invocation {
            step: "it breaks".into(),
            failure: HandlerFailure::Error(
                anyhow::anyhow!("root cause").context("outer"),
            ),
        };

        assert_eq!(err.to_string(), "Step `it breaks` failed: outer: root cause");
        let detail = err.detail();
        assert!(detail.contains("outer"), "{detail}");
        assert!(detail.contains("Caused by"), "{detail}");
        assert!(detail.contains("root cause"), "{detail}");
    }

    #[test]
    fn panic_payloads_are_readable() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
        let other: Box<dyn Any + Send> = Box::new(42_u8);

        assert_eq!(owned.to_readable_string(), "owned");
        assert_eq!(borrowed.to_readable_string(), "borrowed");
        assert_eq!(other.to_readable_string(), "Unknown panic payload");
        assert_eq!(
            HandlerFailure::panic(&*owned).to_string(),
            "panicked: owned",
        );
    }
}

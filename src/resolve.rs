// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Resolution of a step line to exactly one [`Registration`].

use crate::{
    error::{Candidates, StepError, StepResult},
    keyword::Primary,
    step::{Registration, Registry},
};

/// [`Registration`] uniquely matching a step, along with its captures.
#[derive(Clone, Debug)]
pub struct Match<'r> {
    /// Matched [`Registration`].
    pub registration: &'r Registration,

    /// Capture groups in declaration order, without the whole match.
    pub captures: Vec<String>,
}

impl Registry {
    /// Resolves the step with the given effective `keyword` and literal
    /// `text`.
    ///
    /// Only [`Registration`]s of the same `keyword` whose pattern matches the
    /// whole `text` are considered.
    ///
    /// # Errors
    ///
    /// - [`StepError::NotFound`] if no [`Registration`] matches.
    /// - [`StepError::Ambiguous`] if several of them do.
    pub fn resolve(&self, keyword: Primary, text: &str) -> StepResult<Match<'_>> {
        let mut matches = self
            .registrations(keyword)
            .iter()
            .filter_map(|r| {
                r.pattern().captures(text).map(|captures| Match { registration: r, captures })
            })
            .collect::<Vec<_>>();

        if matches.len() > 1 {
            return Err(StepError::Ambiguous {
                keyword,
                text: text.to_owned(),
                candidates: Candidates::new(matches.into_iter().map(|m| {
                    (m.registration.pattern().to_string(), m.registration.location())
                })),
            });
        }
        matches.pop().ok_or_else(|| StepError::NotFound { keyword, text: text.to_owned() })
    }
}

#[cfg(test)]
mod tests {
    use crate::step::StepFn;

    use super::*;

    struct Steps;

    fn noop() -> StepFn {
        StepFn::sync("noop", |_: &mut Steps, _| Ok(()))
    }

    fn registry() -> Registry {
        Registry::new(
            Registry::builder()
                .given("this is given step", [], noop())
                .when(r"I have (\d+) (.*)", [], noop())
                .when(r"I have \d+ apples", [], noop())
                .then("this is given step", [], noop())
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn resolves_unique_match_with_captures() {
        let registry = registry();

        let m = registry.resolve(Primary::When, "I have 3 pears").unwrap();

        assert_eq!(m.registration.pattern().as_str(), r"I have (\d+) (.*)");
        assert_eq!(m.captures, ["3", "pears"]);
    }

    #[test]
    fn keyword_must_match() {
        let registry = registry();

        let m = registry.resolve(Primary::Given, "this is given step").unwrap();
        assert_eq!(m.registration.keyword(), Primary::Given);

        let err = registry.resolve(Primary::When, "this is given step").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to find step implementation for: When this is given step",
        );
    }

    #[test]
    fn partial_match_is_not_found() {
        let err = registry()
            .resolve(Primary::Given, "this is given step and more")
            .unwrap_err();

        assert!(matches!(err, StepError::NotFound { .. }), "{err}");
    }

    #[test]
    fn several_matches_are_ambiguous() {
        let err = registry().resolve(Primary::When, "I have 2 apples").unwrap_err();

        let StepError::Ambiguous { keyword, text, candidates } = &err else {
            panic!("expected ambiguity, got: {err}");
        };
        assert_eq!(*keyword, Primary::When);
        assert_eq!(text, "I have 2 apples");
        let patterns = candidates.as_slice().iter().map(|(p, _)| p.as_str()).collect::<Vec<_>>();
        assert_eq!(patterns, [r"I have (\d+) (.*)", r"I have \d+ apples"]);
        assert!(err.to_string().contains("resolve.rs:"), "{err}");
    }
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Evaluation of [`TagOperation`]s against the tags of a test case.

use gherkin::tagexpr::TagOperation;
use sealed::sealed;

/// Extension of a [`TagOperation`] allowing to evaluate it.
#[sealed]
pub trait Ext {
    /// Evaluates this [`TagOperation`] against the given `tags`.
    ///
    /// Tags are compared without their leading `@`, on both sides.
    #[must_use]
    fn eval<S: AsRef<str>>(&self, tags: &[S]) -> bool;
}

#[sealed]
impl Ext for TagOperation {
    fn eval<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        match self {
            Self::And(l, r) => l.eval(tags) && r.eval(tags),
            Self::Or(l, r) => l.eval(tags) || r.eval(tags),
            Self::Not(op) => !op.eval(tags),
            Self::Tag(t) => {
                let t = t.trim_start_matches('@');
                tags.iter().any(|tag| tag.as_ref().trim_start_matches('@') == t)
            }
        }
    }
}

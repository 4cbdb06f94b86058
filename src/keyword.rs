// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Step`] keywords and continuation-keyword inheritance.
//!
//! [`Step`]: crate::document::Step

use std::str::FromStr;

use derive_more::with_trait::{Display, Error};
use gherkin::StepType;

/// Keyword a [`Step`] is written with.
///
/// [`Step`]: crate::document::Step
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Keyword {
    /// [Given](https://cucumber.io/docs/gherkin/reference#given) keyword.
    #[display("Given")]
    Given,

    /// [When](https://cucumber.io/docs/gherkin/reference#when) keyword.
    #[display("When")]
    When,

    /// [Then](https://cucumber.io/docs/gherkin/reference#then) keyword.
    #[display("Then")]
    Then,

    /// `And` continuation keyword.
    #[display("And")]
    And,

    /// `But` continuation keyword.
    #[display("But")]
    But,

    /// `*` continuation keyword.
    #[display("*")]
    Star,
}

impl Keyword {
    /// Returns the [`Primary`] keyword this one denotes, or [`None`] if it's
    /// a continuation one.
    #[must_use]
    pub const fn primary(self) -> Option<Primary> {
        match self {
            Self::Given => Some(Primary::Given),
            Self::When => Some(Primary::When),
            Self::Then => Some(Primary::Then),
            Self::And | Self::But | Self::Star => None,
        }
    }

    /// Indicates whether this [`Keyword`] continues the previous [`Step`]
    /// rather than starting a new kind of one.
    ///
    /// [`Step`]: crate::document::Step
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.primary().is_none()
    }
}

impl From<Primary> for Keyword {
    fn from(primary: Primary) -> Self {
        match primary {
            Primary::Given => Self::Given,
            Primary::When => Self::When,
            Primary::Then => Self::Then,
        }
    }
}

impl FromStr for Keyword {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Given" => Ok(Self::Given),
            "When" => Ok(Self::When),
            "Then" => Ok(Self::Then),
            "And" => Ok(Self::And),
            "But" => Ok(Self::But),
            "*" => Ok(Self::Star),
            other => Err(UnknownKeyword { keyword: other.to_owned() }),
        }
    }
}

/// Error of parsing an unknown [`Keyword`].
#[derive(Clone, Debug, Display, Error, Eq, PartialEq)]
#[display("Unknown step keyword: `{keyword}`")]
pub struct UnknownKeyword {
    /// Text that failed to parse.
    #[error(not(source))]
    pub keyword: String,
}

/// Keyword [`Registration`]s are keyed by.
///
/// [`Registration`]: crate::step::Registration
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Primary {
    /// [Given](https://cucumber.io/docs/gherkin/reference#given) steps.
    #[default]
    #[display("Given")]
    Given,

    /// [When](https://cucumber.io/docs/gherkin/reference#when) steps.
    #[display("When")]
    When,

    /// [Then](https://cucumber.io/docs/gherkin/reference#then) steps.
    #[display("Then")]
    Then,
}

impl From<StepType> for Primary {
    fn from(ty: StepType) -> Self {
        match ty {
            StepType::Given => Self::Given,
            StepType::When => Self::When,
            StepType::Then => Self::Then,
        }
    }
}

/// Resolves the [`Primary`] keyword of every [`Keyword`] in a single step
/// list.
///
/// A continuation [`Keyword`] inherits the closest preceding [`Primary`] one.
/// The running keyword starts as [`Primary::Given`], so a list opening with
/// `And` resolves it to `Given`. Every step list (a background or a scenario)
/// has to be resolved on its own.
///
/// ```rust
/// use gherkin_runner::keyword::{effective_keywords, Keyword, Primary};
///
/// let resolved = effective_keywords([
///     Keyword::And,
///     Keyword::When,
///     Keyword::But,
///     Keyword::Then,
///     Keyword::Star,
/// ]);
/// assert_eq!(
///     resolved,
///     [
///         Primary::Given,
///         Primary::When,
///         Primary::When,
///         Primary::Then,
///         Primary::Then,
///     ],
/// );
/// ```
#[must_use]
pub fn effective_keywords<I>(keywords: I) -> Vec<Primary>
where
    I: IntoIterator<Item = Keyword>,
{
    keywords
        .into_iter()
        .scan(Primary::Given, |current, kw| {
            if let Some(primary) = kw.primary() {
                *current = primary;
            }
            Some(*current)
        })
        .collect()
}

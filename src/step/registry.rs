// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Registry`] of [`Registration`]s.

use std::any::Any;

use derive_more::with_trait::Debug;

use crate::{bind::{Arguments, ParamType}, error::ConfigError, keyword::Primary};

use super::{
    handler::{Handler, HandlerId, Invocation, Owner, StepFn},
    location::Location,
    pattern::Pattern,
};

/// Mapping of a keyword and a [`Pattern`] onto a step handler.
///
/// Immutable once built.
#[derive(Clone, Debug)]
pub struct Registration {
    keyword: Primary,
    pattern: Pattern,
    id: HandlerId,
    params: Vec<ParamType>,
    location: Option<Location>,

    #[debug(skip)]
    call: Handler,
}

impl Registration {
    /// Creates a new [`Registration`], recording the caller's [`Location`].
    ///
    /// # Errors
    ///
    /// With [`ConfigError::InvalidPattern`] if `pattern` doesn't compile.
    #[track_caller]
    pub fn new(
        keyword: Primary,
        pattern: impl Into<String>,
        params: impl IntoIterator<Item = ParamType>,
        step: StepFn,
    ) -> Result<Self, ConfigError> {
        let location = Location::caller();
        Ok(Self {
            keyword,
            pattern: Pattern::new(pattern)?,
            id: step.id,
            params: params.into_iter().collect(),
            location: Some(location),
            call: step.call,
        })
    }

    /// Replaces the [`Location`] of this [`Registration`], for registrations
    /// generated away from the code they describe.
    #[must_use]
    pub fn at(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    /// [`Primary`] keyword of this [`Registration`].
    #[must_use]
    pub const fn keyword(&self) -> Primary {
        self.keyword
    }

    /// [`Pattern`] of this [`Registration`].
    #[must_use]
    pub const fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// [`HandlerId`] of the handler.
    #[must_use]
    pub const fn id(&self) -> &HandlerId {
        &self.id
    }

    /// [`Owner`] of the handler.
    #[must_use]
    pub const fn owner(&self) -> Owner {
        self.id.owner
    }

    /// Declared parameter types of the handler.
    #[must_use]
    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// [`Location`] this [`Registration`] was made at, if known.
    #[must_use]
    pub const fn location(&self) -> Option<Location> {
        self.location
    }

    /// Invokes the handler on the given `instance` of its [`Owner`].
    pub fn invoke<'a>(&self, instance: &'a mut dyn Any, args: Arguments) -> Invocation<'a> {
        (self.call)(instance, args)
    }
}

/// Read-only collection of [`Registration`]s, keyed by [`Primary`] keyword.
///
/// Registrations of each keyword keep the order they were added in.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    given: Vec<Registration>,
    when: Vec<Registration>,
    then: Vec<Registration>,
}

impl Registry {
    /// Creates a new [`Registry`] out of the given [`Registration`]s.
    #[must_use]
    pub fn new(registrations: impl IntoIterator<Item = Registration>) -> Self {
        registrations.into_iter().collect()
    }

    /// Starts building [`Registration`]s with [`Steps`].
    #[must_use]
    pub fn builder() -> Steps {
        Steps::default()
    }

    /// [`Registration`]s of the given [`Primary`] keyword.
    #[must_use]
    pub fn registrations(&self, keyword: Primary) -> &[Registration] {
        match keyword {
            Primary::Given => &self.given,
            Primary::When => &self.when,
            Primary::Then => &self.then,
        }
    }

    /// Iterates over all the [`Registration`]s.
    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.given.iter().chain(&self.when).chain(&self.then)
    }

    /// Number of [`Registration`]s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.given.len() + self.when.len() + self.then.len()
    }

    /// Indicates whether there are no [`Registration`]s at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Registration> for Registry {
    fn from_iter<I: IntoIterator<Item = Registration>>(iter: I) -> Self {
        let mut registry = Self::default();
        for r in iter {
            match r.keyword {
                Primary::Given => registry.given.push(r),
                Primary::When => registry.when.push(r),
                Primary::Then => registry.then.push(r),
            }
        }
        registry
    }
}

impl Extend<Registration> for Registry {
    fn extend<I: IntoIterator<Item = Registration>>(&mut self, iter: I) {
        let other = iter.into_iter().collect::<Self>();
        self.given.extend(other.given);
        self.when.extend(other.when);
        self.then.extend(other.then);
    }
}

/// Builder of [`Registration`]s.
///
/// The first invalid pattern is kept and reported by [`Steps::build()`].
///
/// ```rust
/// use gherkin_runner::{bind::ParamType, step::{Registry, StepFn}};
///
/// #[derive(Default)]
/// struct Calculator(i64);
///
/// let registrations = Registry::builder()
///     .given("a calculator", [], StepFn::sync("new", |_: &mut Calculator, _| Ok(())))
///     .when(
///         r"I add (\d+)",
///         [ParamType::Int],
///         StepFn::sync("add", |c: &mut Calculator, mut args| {
///             c.0 += args.next::<i64>()?;
///             Ok(())
///         }),
///     )
///     .build()
///     .unwrap();
///
/// assert_eq!(Registry::new(registrations).len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Steps {
    registrations: Vec<Registration>,
    error: Option<ConfigError>,
}

impl Steps {
    /// Adds a [Given] step.
    ///
    /// [Given]: https://cucumber.io/docs/gherkin/reference#given
    #[must_use]
    #[track_caller]
    pub fn given(
        self,
        pattern: impl Into<String>,
        params: impl IntoIterator<Item = ParamType>,
        step: StepFn,
    ) -> Self {
        self.step(Primary::Given, pattern, params, step)
    }

    /// Adds a [When] step.
    ///
    /// [When]: https://cucumber.io/docs/gherkin/reference#when
    #[must_use]
    #[track_caller]
    pub fn when(
        self,
        pattern: impl Into<String>,
        params: impl IntoIterator<Item = ParamType>,
        step: StepFn,
    ) -> Self {
        self.step(Primary::When, pattern, params, step)
    }

    /// Adds a [Then] step.
    ///
    /// [Then]: https://cucumber.io/docs/gherkin/reference#then
    #[must_use]
    #[track_caller]
    pub fn then(
        self,
        pattern: impl Into<String>,
        params: impl IntoIterator<Item = ParamType>,
        step: StepFn,
    ) -> Self {
        self.step(Primary::Then, pattern, params, step)
    }

    /// Adds a step of the given [`Primary`] keyword.
    #[must_use]
    #[track_caller]
    pub fn step(
        mut self,
        keyword: Primary,
        pattern: impl Into<String>,
        params: impl IntoIterator<Item = ParamType>,
        step: StepFn,
    ) -> Self {
        if self.error.is_none() {
            match Registration::new(keyword, pattern, params, step) {
                Ok(r) => self.registrations.push(r),
                Err(e) => self.error = Some(e),
            }
        }
        self
    }

    /// Finishes building.
    ///
    /// # Errors
    ///
    /// With the first [`ConfigError::InvalidPattern`] met.
    pub fn build(self) -> Result<Vec<Registration>, ConfigError> {
        self.error.map_or(Ok(self.registrations), Err)
    }
}

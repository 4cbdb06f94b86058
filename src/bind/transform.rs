// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! User-registered argument conversions.

use std::{any::Any, collections::HashMap, fmt, sync::Arc};

use derive_more::with_trait::Debug;

use crate::document::DataTable;

/// Raw input handed to a custom transform.
#[derive(Clone, Copy, Debug)]
pub enum TransformInput<'a> {
    /// Captured group or doc string text.
    Text(&'a str),

    /// Trailing [`DataTable`] argument.
    Table(&'a DataTable),
}

impl fmt::Display for TransformInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Table(t) => write!(f, "{}", t.to_string().trim_end()),
        }
    }
}

type Transform =
    Arc<dyn Fn(TransformInput<'_>) -> anyhow::Result<Box<dyn Any + Send>> + Send + Sync>;

/// Custom conversions extending the built-in [`ParamType`]s, keyed by the
/// name of a [`ParamType::Custom`].
///
/// ```rust
/// use gherkin_runner::bind::{TransformInput, Transforms};
///
/// #[derive(Debug, PartialEq)]
/// struct Cents(u64);
///
/// let transforms = Transforms::new().register("money", |input| match input {
///     TransformInput::Text(s) => {
///         let dollars: u64 = s.trim_start_matches('$').parse()?;
///         Ok(Cents(dollars * 100))
///     }
///     TransformInput::Table(_) => anyhow::bail!("money can't be a table"),
/// });
///
/// let value = transforms.apply("money", TransformInput::Text("$3")).unwrap();
/// assert_eq!(*value.unwrap().downcast::<Cents>().unwrap(), Cents(300));
/// ```
///
/// [`ParamType`]: super::ParamType
/// [`ParamType::Custom`]: super::ParamType::Custom
#[derive(Clone, Debug, Default)]
pub struct Transforms {
    #[debug("{:?}", by_name.keys().collect::<Vec<_>>())]
    by_name: HashMap<String, Transform>,
}

impl Transforms {
    /// Creates an empty set of [`Transforms`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transform producing `T` under the given `name`, replacing
    /// a previous one with the same name.
    #[must_use]
    pub fn register<T, F>(mut self, name: impl Into<String>, convert: F) -> Self
    where
        T: Any + Send,
        F: Fn(TransformInput<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let erased: Transform = Arc::new(move |input: TransformInput<'_>| {
            convert(input).map(|v| Box::new(v) as Box<dyn Any + Send>)
        });
        _ = self.by_name.insert(name.into(), erased);
        self
    }

    /// Indicates whether a transform is registered under the given `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Applies the transform registered under the given `name`.
    ///
    /// Returns [`None`] if there is no such transform.
    #[must_use]
    pub fn apply(
        &self,
        name: &str,
        input: TransformInput<'_>,
    ) -> Option<anyhow::Result<Box<dyn Any + Send>>> {
        self.by_name.get(name).map(|convert| convert(input))
    }
}

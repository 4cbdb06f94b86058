// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Declared parameter types and bound argument values.

use std::{any::Any, borrow::Cow, collections::VecDeque};

use anyhow::{anyhow, bail};
use chrono::NaiveDateTime;
use derive_more::with_trait::Display;

use crate::document::DataTable;

/// Semantic type of a handler parameter.
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
pub enum ParamType {
    /// Signed integer, bound as [`i64`].
    #[display("int")]
    Int,

    /// Floating point number, bound as [`f64`].
    #[display("float")]
    Float,

    /// Text, bound as-is. Also accepts a doc string argument.
    #[display("string")]
    Str,

    /// `true` or `false`, case-insensitively.
    #[display("bool")]
    Bool,

    /// Date with an optional time of day, bound as [`NaiveDateTime`].
    #[display("datetime")]
    DateTime,

    /// Trailing [`DataTable`] argument.
    #[display("table")]
    Table,

    /// Trailing doc string argument.
    #[display("docstring")]
    DocString,

    /// Type converted by a transform registered in [`Transforms`] under this
    /// name.
    ///
    /// [`Transforms`]: super::Transforms
    #[display("{_0}")]
    Custom(Cow<'static, str>),
}

impl ParamType {
    /// Creates a [`ParamType::Custom`] with the given name.
    #[must_use]
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom(name.into())
    }
}

/// Argument value bound to a single handler parameter.
#[derive(Debug)]
pub enum Value {
    /// [`ParamType::Int`] value.
    Int(i64),

    /// [`ParamType::Float`] value.
    Float(f64),

    /// [`ParamType::Str`] value.
    Str(String),

    /// [`ParamType::Bool`] value.
    Bool(bool),

    /// [`ParamType::DateTime`] value.
    DateTime(NaiveDateTime),

    /// [`ParamType::Table`] value.
    Table(DataTable),

    /// [`ParamType::DocString`] value.
    DocString(String),

    /// [`ParamType::Custom`] value, as produced by its transform.
    Custom(Box<dyn Any + Send>),
}

impl Value {
    /// Short description of what kind of [`Value`] this is.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Bool(_) => "bool",
            Self::DateTime(_) => "datetime",
            Self::Table(_) => "table",
            Self::DocString(_) => "docstring",
            Self::Custom(_) => "custom",
        }
    }
}

/// Extraction of a concrete Rust type out of a bound [`Value`].
pub trait FromValue: Sized {
    /// Extracts `Self` out of the given [`Value`].
    ///
    /// # Errors
    ///
    /// If the [`Value`] holds something else.
    fn from_value(value: Value) -> anyhow::Result<Self>;
}

macro_rules! from_value {
    ($($ty:ty => $($variant:ident)|+),* $(,)?) => {$(
        impl FromValue for $ty {
            fn from_value(value: Value) -> anyhow::Result<Self> {
                match value {
                    $(Value::$variant(v) => Ok(v),)+
                    other => Err(mismatch::<Self>(&other)),
                }
            }
        }
    )*};
}

from_value! {
    i64 => Int,
    f64 => Float,
    bool => Bool,
    NaiveDateTime => DateTime,
    DataTable => Table,
    String => Str | DocString,
}

impl FromValue for i32 {
    fn from_value(value: Value) -> anyhow::Result<Self> {
        let v = i64::from_value(value)?;
        Self::try_from(v).map_err(|e| anyhow!("`{v}` doesn't fit `i32`: {e}"))
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> anyhow::Result<Self> {
        Ok(value)
    }
}

fn mismatch<T>(found: &Value) -> anyhow::Error {
    anyhow!(
        "expected `{}` argument, found `{}` one",
        std::any::type_name::<T>(),
        found.kind(),
    )
}

/// Ordered arguments bound for a single handler invocation.
///
/// Handlers consume them positionally, in declaration order.
#[derive(Debug, Default)]
pub struct Arguments {
    values: VecDeque<Value>,
    taken: usize,
}

impl Arguments {
    /// Creates new [`Arguments`] out of the given [`Value`]s.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        Self { values: values.into_iter().collect(), taken: 0 }
    }

    /// Takes the next argument as `T`.
    ///
    /// # Errors
    ///
    /// If there are no arguments left, or the next one isn't a `T`.
    pub fn next<T: FromValue>(&mut self) -> anyhow::Result<T> {
        let Some(value) = self.values.pop_front() else {
            bail!("argument #{} is missing", self.taken + 1);
        };
        self.taken += 1;
        T::from_value(value)
            .map_err(|e| e.context(format!("argument #{}", self.taken)))
    }

    /// Takes the next argument as a value produced by a custom transform.
    ///
    /// # Errors
    ///
    /// If there are no arguments left, or the next one isn't a custom `T`.
    pub fn next_custom<T: Any>(&mut self) -> anyhow::Result<T> {
        match self.next::<Value>()? {
            Value::Custom(boxed) => boxed.downcast::<T>().map(|b| *b).map_err(|_| {
                anyhow!(
                    "argument #{}: custom value is not `{}`",
                    self.taken,
                    std::any::type_name::<T>(),
                )
            }),
            other => Err(mismatch::<T>(&other)
                .context(format!("argument #{}", self.taken))),
        }
    }

    /// Number of arguments not taken yet.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Indicates whether all the arguments have been taken.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

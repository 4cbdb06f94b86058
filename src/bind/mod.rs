// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Binding of captured text and [`StepArgument`]s to the declared parameters
//! of a [`Registration`].
//!
//! [`Registration`]: crate::step::Registration

mod transform;
mod value;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::{
    document::StepArgument,
    error::{StepError, StepResult},
    step::Registration,
};

pub use self::{
    transform::{TransformInput, Transforms},
    value::{Arguments, FromValue, ParamType, Value},
};

/// Formats a date/time parameter is accepted in, besides RFC 3339.
const DATETIME_FORMATS: &[&str] =
    &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Formats a bare date parameter is accepted in, taken as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Binds the `captures` of a step and its trailing `argument` to the declared
/// parameters of the `registration`.
///
/// Captures are coerced left to right, and the `argument` (if any) is bound to
/// the last parameter. Binding stops at the first failure.
///
/// # Errors
///
/// - [`StepError::Arity`] if the number of declared parameters differs from
///   the number of captures (plus one if there is an `argument`).
/// - [`StepError::Conversion`] if a value can't be coerced into its declared
///   [`ParamType`].
pub fn bind(
    registration: &Registration,
    step: &str,
    captures: Vec<String>,
    argument: Option<&StepArgument>,
    transforms: &Transforms,
) -> StepResult<Arguments> {
    let params = registration.params();
    let expected = captures.len() + usize::from(argument.is_some());
    if params.len() != expected {
        return Err(StepError::Arity {
            handler: registration.id().to_string(),
            step: step.to_owned(),
            expected,
            declared: params.len(),
        });
    }

    let conversion = |n: usize, ty: &ParamType, value: String, reason: String| {
        StepError::Conversion {
            step: step.to_owned(),
            parameter: n + 1,
            ty: ty.to_string(),
            value,
            reason,
        }
    };

    let mut values = Vec::with_capacity(expected);
    let n_captures = captures.len();
    for (n, (text, ty)) in captures.into_iter().zip(params).enumerate() {
        match coerce(ty, &text, transforms) {
            Ok(v) => values.push(v),
            Err(reason) => return Err(conversion(n, ty, text, reason)),
        }
    }

    if let (Some(arg), Some(ty)) = (argument, params.get(n_captures)) {
        match bind_argument(ty, arg, transforms) {
            Ok(v) => values.push(v),
            Err(reason) => {
                let value = match arg {
                    StepArgument::Table(t) => t.to_string().trim_end().to_owned(),
                    StepArgument::DocString(s) => s.clone(),
                };
                return Err(conversion(n_captures, ty, value, reason));
            }
        }
    }

    Ok(Arguments::new(values))
}

/// Coerces a single captured `text` into the given [`ParamType`].
fn coerce(ty: &ParamType, text: &str, transforms: &Transforms) -> Result<Value, String> {
    match ty {
        ParamType::Int => text.trim().parse().map(Value::Int).map_err(|e| e.to_string()),
        ParamType::Float => {
            text.trim().parse().map(Value::Float).map_err(|e| e.to_string())
        }
        ParamType::Str => Ok(Value::Str(text.to_owned())),
        ParamType::Bool => parse_bool(text).map(Value::Bool),
        ParamType::DateTime => parse_datetime(text).map(Value::DateTime),
        ParamType::Table => {
            Err("a table can only be bound from a step data table".to_owned())
        }
        ParamType::DocString => {
            Err("a doc string can only be bound from a step doc string".to_owned())
        }
        ParamType::Custom(name) => custom(name, TransformInput::Text(text), transforms),
    }
}

/// Binds the trailing [`StepArgument`] to the last declared [`ParamType`].
fn bind_argument(
    ty: &ParamType,
    arg: &StepArgument,
    transforms: &Transforms,
) -> Result<Value, String> {
    match (arg, ty) {
        (StepArgument::Table(t), ParamType::Table) => Ok(Value::Table(t.clone())),
        (StepArgument::Table(t), ParamType::Custom(name)) => {
            custom(name, TransformInput::Table(t), transforms)
        }
        (StepArgument::DocString(s), ParamType::Str) => Ok(Value::Str(s.clone())),
        (StepArgument::DocString(s), ParamType::DocString) => {
            Ok(Value::DocString(s.clone()))
        }
        (StepArgument::DocString(s), ParamType::Custom(name)) => {
            custom(name, TransformInput::Text(s), transforms)
        }
        (StepArgument::Table(_), _) => Err(format!(
            "a data table can only be bound to a `{}` or custom parameter",
            ParamType::Table,
        )),
        (StepArgument::DocString(_), _) => Err(format!(
            "a doc string can only be bound to a `{}`, `{}` or custom parameter",
            ParamType::Str,
            ParamType::DocString,
        )),
    }
}

fn custom(name: &str, input: TransformInput<'_>, transforms: &Transforms) -> Result<Value, String> {
    match transforms.apply(name, input) {
        Some(Ok(v)) => Ok(Value::Custom(v)),
        Some(Err(e)) => Err(format!("{e:#}")),
        None => Err(format!("no transform is registered for `{name}`")),
    }
}

fn parse_bool(text: &str) -> Result<bool, String> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err("expected `true` or `false`".to_owned())
    }
}

fn parse_datetime(text: &str) -> Result<NaiveDateTime, String> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS.iter().find_map(|fmt| {
                NaiveDate::parse_from_str(text, fmt)
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            })
        })
        .ok_or_else(|| {
            "expected an RFC 3339, `YYYY-MM-DD[ HH:MM[:SS]]` or `MM/DD/YYYY` date"
                .to_owned()
        })
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error taxonomy of the engine.
//!
//! - [`ConfigError`]s are structural: they abort a whole [`Source`] before
//!   any of its cases runs.
//! - [`StepError`]s are per case: each one turns a single case into a
//!   [`Failed`] outcome.
//!
//! [`Failed`]: crate::runner::Status::Failed
//! [`Source`]: crate::runner::Source

mod config;
mod step;

pub use self::{
    config::{ConfigError, ConfigResult, SourceError},
    step::{Candidates, HandlerFailure, PanicPayloadExt, StepError, StepResult},
};

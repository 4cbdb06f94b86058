// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Step-resolution and execution engine for [Gherkin] feature documents.
//!
//! The engine is fed by [`Source`]s, each providing:
//! - [`Document`]s (parsed `.feature` files, see [`FeatureDir`]);
//! - step [`Registration`]s, mapping a keyword and a regular expression to a
//!   handler method;
//! - an [`Instantiate`] capability creating handler owners, one per test case.
//!
//! A [`Runner`] expands the [`Document`]s into test cases (one per scenario,
//! or per example row of a scenario outline), then executes every case by
//! resolving, binding and invoking its steps one after another. A failed step
//! fails its case only.
//!
//! ```rust
//! use gherkin_runner::{
//!     bind::ParamType,
//!     document::{Document, Feature, Scenario, Step},
//!     keyword::Keyword,
//!     Factories, Registry, Runner, StepFn, Suite,
//! };
//!
//! #[derive(Default)]
//! struct Calculator {
//!     total: i64,
//! }
//!
//! let scenario = Scenario::new("Adds")
//!     .step(Step::new(Keyword::Given, "I add 2"))
//!     .step(Step::new(Keyword::And, "I add 3"))
//!     .step(Step::new(Keyword::Then, "the total is 5"));
//! let document =
//!     Document::new("calc.feature", Feature::new("Calculator").scenario(scenario));
//!
//! let suite = Suite::new("calc", vec![document])
//!     .steps(|| {
//!         Registry::builder()
//!             .given(
//!                 r"I add (\d+)",
//!                 [ParamType::Int],
//!                 StepFn::sync("add", |c: &mut Calculator, mut args| {
//!                     c.total += args.next::<i64>()?;
//!                     Ok(())
//!                 }),
//!             )
//!             .then(
//!                 r"the total is (\d+)",
//!                 [ParamType::Int],
//!                 StepFn::sync("total", |c: &mut Calculator, mut args| {
//!                     anyhow::ensure!(c.total == args.next::<i64>()?, "wrong total");
//!                     Ok(())
//!                 }),
//!             )
//!             .build()
//!     })
//!     .instantiate(Factories::new().with_default::<Calculator>());
//!
//! let report = futures::executor::block_on(Runner::new().run([&suite]));
//!
//! assert!(!report.execution_has_failed());
//! assert_eq!(report.outcomes[0].id, "calc.feature.Calculator.Adds");
//! ```
//!
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

#![deny(nonstandard_style)]
#![forbid(non_ascii_idents, unsafe_code)]
#![warn(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    missing_debug_implementations,
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    unused_qualifications
)]

pub mod bind;
pub mod cli;
pub mod document;
pub mod error;
pub mod expand;
pub mod instance;
pub mod keyword;
pub mod parser;
pub mod resolve;
pub mod runner;
pub mod step;
pub mod tag;

pub use gherkin;

#[doc(inline)]
pub use self::{
    document::{DataTable, Document},
    error::{ConfigError, StepError},
    instance::{Factories, Instantiate},
    parser::FeatureDir,
    runner::{Runner, Source, Status, Suite, TestCaseDescriptor, TestOutcome},
    step::{Registration, Registry, StepFn},
};

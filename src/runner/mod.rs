// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Discovery and execution of test cases.
//!
//! A [`Runner`] turns [`Source`]s into [`TestCaseDescriptor`]s (discovery),
//! and [`TestCaseDescriptor`]s into [`TestOutcome`]s (execution).
//!
//! # Order guarantees
//!
//! Descriptors are discovered in [`Source`] order, then in the order the
//! cases were expanded in. Outcomes are returned in the order of the executed
//! descriptors, even though several cases may be executed concurrently. Steps
//! of a single case are always executed one after another.

mod executor;
mod outcome;
mod stats;

use std::{fmt, sync::Arc};

use derive_more::with_trait::Debug;
use futures::{stream, StreamExt as _};
use gherkin::tagexpr::TagOperation;
use regex::Regex;
use tracing::Instrument as _;

use crate::{
    bind::Transforms,
    cli::{Cli, Config},
    document::Document,
    error::{ConfigError, ConfigResult, SourceError},
    expand::{expand, TestCase},
    instance::{Factories, Instantiate},
    step::{Registration, Registry},
};

pub use self::{
    outcome::{CaseState, Status, TestOutcome},
    stats::Stats,
};

/// Everything a [`Source`]'s cases need to execute.
///
/// Built once per [`Source`] during discovery, and only read afterwards, so
/// it's shared by all the [`TestCaseDescriptor`]s of that [`Source`].
#[derive(Debug)]
pub struct RunContext {
    /// Step [`Registry`] of the [`Source`].
    registry: Registry,

    /// [`Document`]s the cases were expanded from.
    #[debug("{}", documents.len())]
    documents: Vec<Document>,

    /// Provider of handler instances.
    #[debug(skip)]
    instantiate: Arc<dyn Instantiate + Send + Sync>,

    /// Custom argument conversions.
    transforms: Transforms,
}

impl RunContext {
    /// Step [`Registry`] the cases are resolved against.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// [`Document`]s the cases were expanded from.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Provider of handler instances.
    #[must_use]
    pub fn instantiator(&self) -> &(dyn Instantiate + Send + Sync) {
        &*self.instantiate
    }

    /// Custom argument conversions.
    #[must_use]
    pub const fn transforms(&self) -> &Transforms {
        &self.transforms
    }
}

/// Provider of everything needed to discover and execute test cases.
pub trait Source {
    /// Stable name of this [`Source`], used to identify it in errors.
    fn name(&self) -> &str;

    /// Loads the [`Document`]s of this [`Source`].
    ///
    /// Every [`Document::name`] becomes the prefix of the fully-qualified
    /// names of its cases.
    ///
    /// # Errors
    ///
    /// If the [`Document`]s can't be loaded, which aborts this [`Source`].
    fn load_documents(&self) -> ConfigResult<Vec<Document>>;

    /// Loads the step [`Registration`]s of this [`Source`].
    ///
    /// # Errors
    ///
    /// If the [`Registration`]s can't be built, which aborts this [`Source`].
    fn load_step_registrations(&self) -> ConfigResult<Vec<Registration>>;

    /// Provider of handler instances for the cases of this [`Source`].
    fn instantiator(&self) -> Arc<dyn Instantiate + Send + Sync>;

    /// Custom argument conversions for the cases of this [`Source`].
    fn transforms(&self) -> Transforms {
        Transforms::default()
    }
}

impl<S: Source + ?Sized> Source for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load_documents(&self) -> ConfigResult<Vec<Document>> {
        (**self).load_documents()
    }

    fn load_step_registrations(&self) -> ConfigResult<Vec<Registration>> {
        (**self).load_step_registrations()
    }

    fn instantiator(&self) -> Arc<dyn Instantiate + Send + Sync> {
        (**self).instantiator()
    }

    fn transforms(&self) -> Transforms {
        (**self).transforms()
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load_documents(&self) -> ConfigResult<Vec<Document>> {
        (**self).load_documents()
    }

    fn load_step_registrations(&self) -> ConfigResult<Vec<Registration>> {
        (**self).load_step_registrations()
    }

    fn instantiator(&self) -> Arc<dyn Instantiate + Send + Sync> {
        (**self).instantiator()
    }

    fn transforms(&self) -> Transforms {
        (**self).transforms()
    }
}

/// Capability of loading [`Document`]s.
pub trait LoadDocuments {
    /// Loads [`Document`]s.
    ///
    /// # Errors
    ///
    /// If the [`Document`]s can't be loaded.
    fn load_documents(&self) -> ConfigResult<Vec<Document>>;
}

impl LoadDocuments for Vec<Document> {
    fn load_documents(&self) -> ConfigResult<Vec<Document>> {
        Ok(self.clone())
    }
}

impl<F> LoadDocuments for F
where
    F: Fn() -> ConfigResult<Vec<Document>>,
{
    fn load_documents(&self) -> ConfigResult<Vec<Document>> {
        self()
    }
}

/// Step [`Registration`]s loader of a [`Suite`].
type LoadSteps = Box<dyn Fn() -> ConfigResult<Vec<Registration>>>;

/// [`Source`] assembled from its parts.
///
/// ```rust
/// # use gherkin_runner::{
/// #     document::{Document, Feature, Scenario, Step},
/// #     instance::Factories,
/// #     keyword::Keyword,
/// #     runner::{Runner, Suite},
/// #     step::{Registry, StepFn},
/// # };
/// #
/// #[derive(Default)]
/// struct Greeter;
///
/// let feature = Feature::new("Greeting").scenario(
///     Scenario::new("Says hello").step(Step::new(Keyword::Given, "a greeter")),
/// );
///
/// let suite = Suite::new("greeting", vec![Document::new("greeting.feature", feature)])
///     .steps(|| {
///         Registry::builder()
///             .given("a greeter", [], StepFn::sync("new", |_: &mut Greeter, _| Ok(())))
///             .build()
///     })
///     .instantiate(Factories::new().with_default::<Greeter>());
///
/// let report = futures::executor::block_on(Runner::new().run([&suite]));
///
/// assert_eq!(report.stats().passed, 1);
/// ```
#[derive(Debug)]
#[must_use]
pub struct Suite {
    /// Name of this [`Suite`].
    name: String,

    /// [`Document`]s loader.
    #[debug(skip)]
    documents: Box<dyn LoadDocuments>,

    /// Step [`Registration`]s loader.
    #[debug(skip)]
    steps: LoadSteps,

    /// Provider of handler instances.
    #[debug(skip)]
    instantiate: Arc<dyn Instantiate + Send + Sync>,

    /// Custom argument conversions.
    transforms: Transforms,
}

impl Suite {
    /// Creates a new [`Suite`] without any step [`Registration`]s, creating
    /// no handler instances.
    pub fn new(name: impl Into<String>, documents: impl LoadDocuments + 'static) -> Self {
        Self {
            name: name.into(),
            documents: Box::new(documents),
            steps: Box::new(|| Ok(Vec::new())),
            instantiate: Arc::new(Factories::new()),
            transforms: Transforms::default(),
        }
    }

    /// Sets the loader of step [`Registration`]s.
    ///
    /// It's called on every discovery, so each one gets a fresh [`Registry`].
    pub fn steps<F>(mut self, load: F) -> Self
    where
        F: Fn() -> ConfigResult<Vec<Registration>> + 'static,
    {
        self.steps = Box::new(load);
        self
    }

    /// Sets the provider of handler instances.
    pub fn instantiate<I>(mut self, instantiate: I) -> Self
    where
        I: Instantiate + Send + Sync + 'static,
    {
        self.instantiate = Arc::new(instantiate);
        self
    }

    /// Sets custom argument conversions.
    pub fn transforms(mut self, transforms: Transforms) -> Self {
        self.transforms = transforms;
        self
    }
}

impl Source for Suite {
    fn name(&self) -> &str {
        &self.name
    }

    fn load_documents(&self) -> ConfigResult<Vec<Document>> {
        self.documents.load_documents()
    }

    fn load_step_registrations(&self) -> ConfigResult<Vec<Registration>> {
        (self.steps)()
    }

    fn instantiator(&self) -> Arc<dyn Instantiate + Send + Sync> {
        Arc::clone(&self.instantiate)
    }

    fn transforms(&self) -> Transforms {
        self.transforms.clone()
    }
}

/// Discovered test case, ready to be executed.
#[derive(Clone, Debug)]
pub struct TestCaseDescriptor {
    /// Fully-qualified name of the case:
    /// `<document>.<feature>[.<rule>].<scenario or example>`.
    pub fully_qualified_name: String,

    /// Name of the scenario, or of the example row.
    pub display_name: String,

    /// Tags inherited from the feature, rule and scenario, without `@`.
    pub tags: Vec<String>,

    /// Name of the [`Source`] the case was discovered in.
    pub source: String,

    /// Context of the [`Source`].
    #[debug(skip)]
    context: Arc<RunContext>,

    /// Expanded case.
    case: Arc<TestCase>,
}

impl TestCaseDescriptor {
    /// Expanded [`TestCase`] this descriptor executes.
    #[must_use]
    pub fn case(&self) -> &TestCase {
        &self.case
    }

    /// [`RunContext`] this descriptor executes in.
    #[must_use]
    pub fn context(&self) -> &RunContext {
        &self.context
    }
}

impl fmt::Display for TestCaseDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fully_qualified_name)
    }
}

/// Result of discovering test cases in [`Source`]s.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Discovered cases of all the non-aborted [`Source`]s.
    pub cases: Vec<TestCaseDescriptor>,

    /// Errors of the aborted [`Source`]s.
    pub errors: Vec<SourceError>,
}

/// Result of running [`Source`]s.
#[derive(Debug, Default)]
pub struct Report {
    /// Outcomes of the executed cases.
    pub outcomes: Vec<TestOutcome>,

    /// Errors of the aborted [`Source`]s.
    pub errors: Vec<SourceError>,
}

impl Report {
    /// [`Stats`] of the executed cases.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.outcomes.iter().collect()
    }

    /// Indicates whether some case has failed, or some [`Source`] was
    /// aborted.
    #[must_use]
    pub fn execution_has_failed(&self) -> bool {
        !self.errors.is_empty() || self.stats().execution_has_failed()
    }
}

/// Discovers and executes test cases.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct Runner {
    config: Config,
}

impl Runner {
    /// Creates a new [`Runner`] with the default [`Config`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new [`Runner`] with the given [`Config`].
    pub const fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Creates a new [`Runner`] configured from command line options.
    pub fn with_cli(cli: Cli) -> Self {
        Self::with_config(cli.into())
    }

    /// Limits how many cases are executed concurrently.
    ///
    /// `0` is treated as `1`.
    pub const fn max_concurrent_cases(mut self, max: usize) -> Self {
        self.config.max_concurrent_cases = max;
        self
    }

    /// Only executes cases whose fully-qualified name matches the given
    /// [`Regex`].
    pub fn filter_name(mut self, name: Regex) -> Self {
        self.config.name_filter = Some(name);
        self
    }

    /// Only executes cases whose tags match the given [`TagOperation`].
    pub fn filter_tags(mut self, tags: TagOperation) -> Self {
        self.config.tags_filter = Some(tags);
        self
    }

    /// [`Config`] of this [`Runner`].
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Discovers test cases of the given [`Source`]s.
    ///
    /// A [`Source`] failing to load or expand is aborted as a whole and
    /// reported in [`Discovery::errors`], while the other ones are still
    /// discovered.
    pub fn discover<S, I>(&self, sources: I) -> Discovery
    where
        S: Source,
        I: IntoIterator<Item = S>,
    {
        let mut discovery = Discovery::default();
        for source in sources {
            match discover_source(&source) {
                Ok(cases) => {
                    tracing::debug!(source = source.name(), cases = cases.len(), "discovered");
                    discovery.cases.extend(cases);
                }
                Err(error) => {
                    let error = SourceError { source_name: source.name().to_owned(), error };
                    tracing::error!("{error}");
                    discovery.errors.push(error);
                }
            }
        }
        discovery
    }

    /// Retains only the cases matching the filters of this [`Runner`].
    #[must_use]
    pub fn filter(&self, cases: Vec<TestCaseDescriptor>) -> Vec<TestCaseDescriptor> {
        cases
            .into_iter()
            .filter(|c| self.config.matches(&c.fully_qualified_name, &c.tags))
            .collect()
    }

    /// Executes the given cases, returning their outcomes in the same order.
    ///
    /// A failure of one case never affects the others.
    pub async fn execute<I>(&self, cases: I) -> Vec<TestOutcome>
    where
        I: IntoIterator<Item = TestCaseDescriptor>,
    {
        stream::iter(cases)
            .map(|case| {
                let span = tracing::info_span!("case", case = %case.fully_qualified_name);
                async move { executor::execute_case(&case).await }.instrument(span)
            })
            .buffered(self.config.max_concurrent_cases.max(1))
            .collect()
            .await
    }

    /// Blocking version of [`Runner::execute()`].
    pub fn execute_blocking<I>(&self, cases: I) -> Vec<TestOutcome>
    where
        I: IntoIterator<Item = TestCaseDescriptor>,
    {
        futures::executor::block_on(self.execute(cases))
    }

    /// Discovers, filters and executes the cases of the given [`Source`]s.
    pub async fn run<S, I>(&self, sources: I) -> Report
    where
        S: Source,
        I: IntoIterator<Item = S>,
    {
        let Discovery { cases, errors } = self.discover(sources);
        let outcomes = self.execute(self.filter(cases)).await;
        Report { outcomes, errors }
    }
}

/// Loads and expands a single [`Source`].
fn discover_source<S: Source>(source: &S) -> Result<Vec<TestCaseDescriptor>, ConfigError> {
    let documents = source.load_documents()?;
    let registrations = source.load_step_registrations()?;
    let cases = expand(&documents)?;

    let context = Arc::new(RunContext {
        registry: Registry::new(registrations),
        documents,
        instantiate: source.instantiator(),
        transforms: source.transforms(),
    });

    Ok(cases
        .into_iter()
        .map(|case| TestCaseDescriptor {
            fully_qualified_name: case.fully_qualified_name(),
            display_name: case.name.clone(),
            tags: case.tags.clone(),
            source: source.name().to_owned(),
            context: Arc::clone(&context),
            case: Arc::new(case),
        })
        .collect())
}

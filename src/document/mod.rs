// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Document model consumed by the [`expand()`] step.
//!
//! A [`Document`] is an already parsed `.feature` file named by a stable
//! resource name. Children keep the order they were written in, so a
//! [`Feature`] may (erroneously) hold several [`Background`]s, which is only
//! detected on expansion.
//!
//! [`expand()`]: crate::expand()

mod convert;
mod table;

pub use self::{convert::Ext, table::DataTable};

use crate::keyword::Keyword;

/// Parsed `.feature` document, named by a stable resource name.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// Resource name qualifying every test case of this [`Document`].
    pub name: String,

    /// The only [`Feature`] of this [`Document`].
    pub feature: Feature,
}

impl Document {
    /// Creates a new [`Document`].
    #[must_use]
    pub fn new(name: impl Into<String>, feature: Feature) -> Self {
        Self { name: name.into(), feature }
    }
}

/// [Feature](https://cucumber.io/docs/gherkin/reference#feature).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Feature {
    /// Name of this [`Feature`].
    pub name: String,

    /// Tags of this [`Feature`], without the leading `@`.
    pub tags: Vec<String>,

    /// Children of this [`Feature`] in document order.
    pub children: Vec<FeatureChild>,
}

/// Child of a [`Feature`].
#[derive(Clone, Debug, PartialEq)]
pub enum FeatureChild {
    /// [`Background`] of the whole [`Feature`].
    Background(Background),

    /// [`Rule`] grouping [`Scenario`]s.
    Rule(Rule),

    /// Top-level [`Scenario`].
    Scenario(Scenario),
}

impl Feature {
    /// Creates a new empty [`Feature`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Adds a tag to this [`Feature`].
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Appends a [`Background`] child.
    #[must_use]
    pub fn background(mut self, background: Background) -> Self {
        self.children.push(FeatureChild::Background(background));
        self
    }

    /// Appends a [`Rule`] child.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.children.push(FeatureChild::Rule(rule));
        self
    }

    /// Appends a [`Scenario`] child.
    #[must_use]
    pub fn scenario(mut self, scenario: Scenario) -> Self {
        self.children.push(FeatureChild::Scenario(scenario));
        self
    }
}

/// [Rule](https://cucumber.io/docs/gherkin/reference#rule).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rule {
    /// Name of this [`Rule`].
    pub name: String,

    /// Tags of this [`Rule`], without the leading `@`.
    pub tags: Vec<String>,

    /// Children of this [`Rule`] in document order.
    pub children: Vec<RuleChild>,
}

/// Child of a [`Rule`].
#[derive(Clone, Debug, PartialEq)]
pub enum RuleChild {
    /// [`Background`] of the [`Rule`].
    Background(Background),

    /// [`Scenario`] of the [`Rule`].
    Scenario(Scenario),
}

impl Rule {
    /// Creates a new empty [`Rule`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Adds a tag to this [`Rule`].
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Appends a [`Background`] child.
    #[must_use]
    pub fn background(mut self, background: Background) -> Self {
        self.children.push(RuleChild::Background(background));
        self
    }

    /// Appends a [`Scenario`] child.
    #[must_use]
    pub fn scenario(mut self, scenario: Scenario) -> Self {
        self.children.push(RuleChild::Scenario(scenario));
        self
    }
}

/// [Background](https://cucumber.io/docs/gherkin/reference#background).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Background {
    /// [`Step`]s prepended to every [`Scenario`] in scope.
    pub steps: Vec<Step>,
}

impl Background {
    /// Creates a new [`Background`] out of the given [`Step`]s.
    #[must_use]
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self { steps: steps.into_iter().collect() }
    }
}

/// [Scenario](https://cucumber.io/docs/gherkin/reference#example), or a
/// [Scenario Outline][1] once it has [`Examples`].
///
/// [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scenario {
    /// Name of this [`Scenario`].
    pub name: String,

    /// Tags of this [`Scenario`], without the leading `@`.
    pub tags: Vec<String>,

    /// [`Step`]s of this [`Scenario`].
    pub steps: Vec<Step>,

    /// [`Examples`] this [`Scenario`] is instantiated with.
    pub examples: Vec<Examples>,
}

impl Scenario {
    /// Creates a new empty [`Scenario`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Adds a tag to this [`Scenario`].
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Appends a [`Step`].
    #[must_use]
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Appends an [`Examples`] table.
    #[must_use]
    pub fn examples(mut self, examples: Examples) -> Self {
        self.examples.push(examples);
        self
    }

    /// Indicates whether this [`Scenario`] is a template instantiated per
    /// [`Examples`] row.
    #[must_use]
    pub fn is_outline(&self) -> bool {
        !self.examples.is_empty()
    }
}

/// [Examples](https://cucumber.io/docs/gherkin/reference#examples) table of a
/// [Scenario Outline][1].
///
/// [1]: https://cucumber.io/docs/gherkin/reference#scenario-outline
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Examples {
    /// Column names.
    pub header: Vec<String>,

    /// Body rows, each expected to have as many cells as the header.
    pub rows: Vec<Vec<String>>,
}

impl Examples {
    /// Creates new [`Examples`] with the given header and no rows.
    #[must_use]
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a body row.
    #[must_use]
    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }
}

/// Single [step](https://cucumber.io/docs/gherkin/reference#steps).
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    /// [`Keyword`] this [`Step`] is written with.
    pub keyword: Keyword,

    /// Text following the [`Keyword`]. May contain `<placeholder>`s inside an
    /// outline.
    pub text: String,

    /// Trailing structured argument, if any.
    pub argument: Option<StepArgument>,
}

impl Step {
    /// Creates a new [`Step`] without an argument.
    #[must_use]
    pub fn new(keyword: Keyword, text: impl Into<String>) -> Self {
        Self { keyword, text: text.into(), argument: None }
    }

    /// Attaches a [`DataTable`] argument.
    #[must_use]
    pub fn with_table(mut self, table: impl Into<DataTable>) -> Self {
        self.argument = Some(StepArgument::Table(table.into()));
        self
    }

    /// Attaches a doc string argument.
    #[must_use]
    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.argument = Some(StepArgument::DocString(docstring.into()));
        self
    }
}

/// Structured argument trailing a [`Step`].
#[derive(Clone, Debug, PartialEq)]
pub enum StepArgument {
    /// [Data table](https://cucumber.io/docs/gherkin/reference#data-tables).
    Table(DataTable),

    /// [Doc string](https://cucumber.io/docs/gherkin/reference#doc-strings).
    DocString(String),
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Expansion of [`Document`]s into a flat, ordered list of [`TestCase`]s.
//!
//! Every [`Scenario`] becomes a single [`TestCase`], and every [`Scenario`]
//! with [`Examples`] becomes one [`TestCase`] per example row. Each case
//! carries the [`Background`] steps of its [`Feature`] followed by the ones of
//! its [`Rule`] (if any), and then its own steps.
//!
//! [`Background`]: crate::document::Background
//! [`Feature`]: crate::document::Feature
//! [`Rule`]: crate::document::Rule

use std::{collections::HashSet, fmt, iter};

use itertools::Itertools as _;
use lazy_regex::regex;
use regex::Regex;

use crate::{
    document::{
        Background, Document, Examples, FeatureChild, RuleChild, Scenario, Step,
        StepArgument,
    },
    error::{ConfigError, ConfigResult},
    keyword::{effective_keywords, Keyword, Primary},
};

/// Single independently executable unit: a [`Scenario`] or one row of its
/// [`Examples`].
#[derive(Clone, Debug, PartialEq)]
pub struct TestCase {
    /// Name of the [`Document`] this case comes from.
    pub document: String,

    /// Name of the [`Feature`] this case comes from.
    ///
    /// [`Feature`]: crate::document::Feature
    pub feature: String,

    /// Name of the [`Rule`] this case comes from, if any.
    ///
    /// [`Rule`]: crate::document::Rule
    pub rule: Option<String>,

    /// Display name: the [`Scenario`] name, suffixed with `: Example #<k>` for
    /// an example row.
    pub name: String,

    /// 1-based number of the example row, counted across all the
    /// [`Examples`] of the [`Scenario`].
    pub example: Option<usize>,

    /// Tags of the [`Feature`], [`Rule`] and [`Scenario`], without
    /// duplicates.
    ///
    /// [`Feature`]: crate::document::Feature
    /// [`Rule`]: crate::document::Rule
    pub tags: Vec<String>,

    /// Background steps followed by the scenario ones.
    pub steps: Vec<CaseStep>,
}

impl TestCase {
    /// Fully-qualified name of this [`TestCase`]:
    /// `<document>.<feature>[.<rule>].<name>`.
    #[must_use]
    pub fn fully_qualified_name(&self) -> String {
        match &self.rule {
            Some(rule) => {
                format!("{}.{}.{rule}.{}", self.document, self.feature, self.name)
            }
            None => format!("{}.{}.{}", self.document, self.feature, self.name),
        }
    }
}

/// Step of a [`TestCase`], ready to be resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseStep {
    /// [`Primary`] keyword the step resolves with.
    pub keyword: Primary,

    /// [`Keyword`] the step is written with.
    pub written: Keyword,

    /// Literal text, with outline placeholders substituted.
    pub text: String,

    /// Trailing structured argument, with outline placeholders substituted.
    pub argument: Option<StepArgument>,
}

impl fmt::Display for CaseStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.written, self.text)
    }
}

/// Expands the given [`Document`]s into [`TestCase`]s, in document order.
///
/// # Errors
///
/// - [`ConfigError::DuplicateDocument`] if several [`Document`]s share a name.
/// - [`ConfigError::MultipleBackgrounds`] if a [`Feature`] or a [`Rule`] has
///   more than one [`Background`].
/// - [`ConfigError::ExampleArity`] if an example row has a different number
///   of cells than its header.
///
/// [`Background`]: crate::document::Background
/// [`Feature`]: crate::document::Feature
/// [`Rule`]: crate::document::Rule
pub fn expand(documents: &[Document]) -> ConfigResult<Vec<TestCase>> {
    let mut seen = HashSet::new();
    if let Some(dup) = documents.iter().find(|d| !seen.insert(d.name.as_str())) {
        return Err(ConfigError::DuplicateDocument { name: dup.name.clone() });
    }

    let mut cases = Vec::new();
    for doc in documents {
        expand_document(doc, &mut cases)?;
    }
    Ok(cases)
}

fn expand_document(doc: &Document, out: &mut Vec<TestCase>) -> ConfigResult<()> {
    let feature = &doc.feature;
    let background = single_background(
        feature.children.iter().filter_map(|c| match c {
            FeatureChild::Background(bg) => Some(bg),
            FeatureChild::Rule(_) | FeatureChild::Scenario(_) => None,
        }),
        doc,
        &feature.name,
    )?;

    let parent = Parent { doc, rule: None, rule_tags: &[], background };
    for child in &feature.children {
        match child {
            FeatureChild::Background(_) => {}
            FeatureChild::Scenario(s) => expand_scenario(&parent, s, out)?,
            FeatureChild::Rule(rule) => {
                let own = single_background(
                    rule.children.iter().filter_map(|c| match c {
                        RuleChild::Background(bg) => Some(bg),
                        RuleChild::Scenario(_) => None,
                    }),
                    doc,
                    &rule.name,
                )?;
                let nested = Parent {
                    doc,
                    rule: Some(&rule.name),
                    rule_tags: &rule.tags,
                    background: parent.background.iter().cloned().chain(own).collect(),
                };
                for child in &rule.children {
                    if let RuleChild::Scenario(s) = child {
                        expand_scenario(&nested, s, out)?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Enclosing [`Feature`] or [`Rule`] of a [`Scenario`].
///
/// [`Feature`]: crate::document::Feature
/// [`Rule`]: crate::document::Rule
struct Parent<'d> {
    doc: &'d Document,
    rule: Option<&'d str>,
    rule_tags: &'d [String],
    background: Vec<CaseStep>,
}

/// Returns the [`CaseStep`]s of the only [`Background`] among the given ones.
fn single_background<'d>(
    mut backgrounds: impl Iterator<Item = &'d Background>,
    doc: &Document,
    scope: &str,
) -> ConfigResult<Vec<CaseStep>> {
    match (backgrounds.next(), backgrounds.next()) {
        (None, _) => Ok(Vec::new()),
        (Some(bg), None) => Ok(case_steps(&bg.steps)),
        (Some(_), Some(_)) => Err(ConfigError::MultipleBackgrounds {
            document: doc.name.clone(),
            scope: scope.to_owned(),
        }),
    }
}

/// Converts a single step list, resolving its continuation keywords.
fn case_steps(steps: &[Step]) -> Vec<CaseStep> {
    steps
        .iter()
        .zip(effective_keywords(steps.iter().map(|s| s.keyword)))
        .map(|(s, keyword)| CaseStep {
            keyword,
            written: s.keyword,
            text: s.text.clone(),
            argument: s.argument.clone(),
        })
        .collect()
}

fn expand_scenario(
    parent: &Parent<'_>,
    scenario: &Scenario,
    out: &mut Vec<TestCase>,
) -> ConfigResult<()> {
    let tags = parent
        .doc
        .feature
        .tags
        .iter()
        .chain(parent.rule_tags)
        .chain(&scenario.tags)
        .unique()
        .cloned()
        .collect::<Vec<_>>();
    let steps = case_steps(&scenario.steps);

    let case = |name: String, example, steps: Vec<CaseStep>| TestCase {
        document: parent.doc.name.clone(),
        feature: parent.doc.feature.name.clone(),
        rule: parent.rule.map(str::to_owned),
        name,
        example,
        tags: tags.clone(),
        steps: parent.background.iter().cloned().chain(steps).collect(),
    };

    if !scenario.is_outline() {
        out.push(case(scenario.name.clone(), None, steps));
        return Ok(());
    }

    let tables = scenario
        .examples
        .iter()
        .map(|ex| Ok((placeholders(&ex.header)?, ex)))
        .collect::<ConfigResult<Vec<(Regex, &Examples)>>>()?;
    let rows = tables.iter().flat_map(|(tokens, ex)| {
        ex.rows.iter().map(move |row| (tokens, &ex.header, row))
    });
    for (k, (tokens, header, row)) in iter::zip(1.., rows) {
        if header.len() != row.len() {
            return Err(ConfigError::ExampleArity {
                document: parent.doc.name.clone(),
                scenario: scenario.name.clone(),
                header: header.len(),
                row: k,
                cells: row.len(),
            });
        }
        let substituted = steps
            .iter()
            .map(|s| substitute_step(s, tokens, header, row))
            .collect();
        out.push(case(format!("{}: Example #{k}", scenario.name), Some(k), substituted));
    }
    Ok(())
}

fn substitute_step(
    step: &CaseStep,
    tokens: &Regex,
    header: &[String],
    row: &[String],
) -> CaseStep {
    let sub = |text: &str| substitute(text, tokens, header, row);
    let argument = step.argument.clone().map(|arg| match arg {
        StepArgument::DocString(s) => StepArgument::DocString(sub(&s)),
        StepArgument::Table(mut t) => {
            for cell in t.cells_mut() {
                *cell = sub(cell);
            }
            StepArgument::Table(t)
        }
    });

    CaseStep {
        keyword: step.keyword,
        written: step.written,
        text: sub(&step.text),
        argument,
    }
}

/// Compiles a [`Regex`] matching a `<name>` token of every `header` name,
/// whatever characters the name contains.
fn placeholders(header: &[String]) -> ConfigResult<Regex> {
    let pattern = format!("<({})>", header.iter().map(|h| regex::escape(h)).join("|"));
    Regex::new(&pattern).map_err(|source| ConfigError::InvalidPattern { pattern, source })
}

/// Replaces every `<name>` token of the `template` with the `row` cell under
/// the `name` header. Tokens without a header are left as is.
fn substitute(template: &str, tokens: &Regex, header: &[String], row: &[String]) -> String {
    for cap in regex!(r"<([^>]+)>").captures_iter(template) {
        if !header.iter().any(|h| *h == cap[1]) {
            tracing::debug!(token = &cap[0], template, "unresolved outline placeholder");
        }
    }

    tokens
        .replace_all(template, |cap: &regex::Captures<'_>| {
            header
                .iter()
                .position(|h| *h == cap[1])
                .map_or_else(|| cap[0].to_owned(), |i| row[i].clone())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use crate::document::{DataTable, Feature, Rule};

    use super::*;

    fn given(text: &str) -> Step {
        Step::new(Keyword::Given, text)
    }

    fn names(cases: &[TestCase]) -> Vec<String> {
        cases.iter().map(TestCase::fully_qualified_name).collect()
    }

    fn texts(case: &TestCase) -> Vec<&str> {
        case.steps.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn every_scenario_starts_with_background() {
        let doc = Document::new(
            "Features.Bg.feature",
            Feature::new("Bg")
                .background(Background::new([given("one"), Step::new(Keyword::And, "two")]))
                .scenario(Scenario::new("a").step(Step::new(Keyword::When, "a1")))
                .scenario(Scenario::new("b").step(Step::new(Keyword::Then, "b1"))),
        );

        let cases = expand(&[doc]).unwrap();

        assert_eq!(names(&cases), ["Features.Bg.feature.Bg.a", "Features.Bg.feature.Bg.b"]);
        for (case, last) in cases.iter().zip(["a1", "b1"]) {
            assert_eq!(texts(case), ["one", "two", last]);
        }
        assert_eq!(cases[0].steps[1].keyword, Primary::Given);
    }

    #[test]
    fn feature_background_precedes_rule_background() {
        let doc = Document::new(
            "doc",
            Feature::new("F")
                .tag("f")
                .background(Background::new([given("feature bg")]))
                .rule(
                    Rule::new("R")
                        .tag("r")
                        .background(Background::new([Step::new(Keyword::And, "rule bg")]))
                        .scenario(
                            Scenario::new("S")
                                .tag("s")
                                .tag("f")
                                .step(Step::new(Keyword::And, "own")),
                        ),
                )
                .scenario(Scenario::new("T").step(given("top"))),
        );

        let cases = expand(&[doc]).unwrap();

        assert_eq!(names(&cases), ["doc.F.R.S", "doc.F.T"]);
        assert_eq!(texts(&cases[0]), ["feature bg", "rule bg", "own"]);
        assert_eq!(cases[0].tags, ["f", "r", "s"]);
        assert_eq!(texts(&cases[1]), ["feature bg", "top"]);
        assert_eq!(cases[1].tags, ["f"]);
        // Each list starts over at `Given`.
        assert!(cases[0].steps.iter().all(|s| s.keyword == Primary::Given));
    }

    #[test]
    fn outline_rows_are_numbered_across_tables() {
        let outline = Scenario::new("add")
            .step(Step::new(Keyword::When, "I add <a> and <b>"))
            .step(Step::new(Keyword::Then, "I get <sum>").with_docstring("<sum> <unknown>"))
            .step(
                Step::new(Keyword::And, "table")
                    .with_table(DataTable::from(vec![vec!["x"], vec!["<a>"]])),
            )
            .examples(Examples::new(["a", "b", "sum"]).row(["1", "2", "3"]).row(["2", "2", "4"]))
            .examples(Examples::new(["b", "a", "sum"]).row(["5", "0", "5"]));
        let doc = Document::new("d", Feature::new("F").scenario(outline));

        let cases = expand(&[doc]).unwrap();

        assert_eq!(
            names(&cases),
            ["d.F.add: Example #1", "d.F.add: Example #2", "d.F.add: Example #3"],
        );
        assert_eq!(cases[2].example, Some(3));
        assert_eq!(texts(&cases[0]), ["I add 1 and 2", "I get 3", "table"]);
        assert_eq!(texts(&cases[2]), ["I add 0 and 5", "I get 5", "table"]);
        assert_eq!(
            cases[1].steps[1].argument,
            Some(StepArgument::DocString("4 <unknown>".into())),
        );
        assert_eq!(
            cases[1].steps[2].argument,
            Some(StepArgument::Table(DataTable::from(vec![vec!["x"], vec!["2"]]))),
        );
        assert_eq!(cases[0].steps[2].keyword, Primary::Then);
    }

    #[test]
    fn headers_with_spaces_and_symbols_are_substituted() {
        let outline = Scenario::new("login")
            .step(given("user <first name> logs in as <role (main)>"))
            .step(Step::new(Keyword::Then, "greeting").with_docstring("Hi, <first name>!"))
            .step(
                Step::new(Keyword::And, "table").with_table(DataTable::from(vec![
                    vec!["name", "role"],
                    vec!["<first name>", "<role (main)>"],
                ])),
            )
            .examples(Examples::new(["first name", "role (main)"]).row(["Ann", "admin"]));
        let doc = Document::new("d", Feature::new("F").scenario(outline));

        let cases = expand(&[doc]).unwrap();

        assert_eq!(texts(&cases[0])[0], "user Ann logs in as admin");
        assert_eq!(
            cases[0].steps[1].argument,
            Some(StepArgument::DocString("Hi, Ann!".into())),
        );
        assert_eq!(
            cases[0].steps[2].argument,
            Some(StepArgument::Table(DataTable::from(vec![
                vec!["name", "role"],
                vec!["Ann", "admin"],
            ]))),
        );
    }

    #[test]
    fn examples_without_rows_yield_no_cases() {
        let outline = Scenario::new("empty")
            .step(given("<a>"))
            .examples(Examples::default());
        let doc = Document::new("d", Feature::new("F").scenario(outline));

        assert!(expand(&[doc]).unwrap().is_empty());
    }

    #[test]
    fn multiple_backgrounds_abort_expansion() {
        let doc = Document::new(
            "doc",
            Feature::new("F")
                .background(Background::new([given("a")]))
                .scenario(Scenario::new("S"))
                .background(Background::new([given("b")])),
        );

        let err = expand(&[doc]).unwrap_err();

        assert!(
            matches!(err, ConfigError::MultipleBackgrounds { ref scope, .. } if scope == "F"),
            "{err}",
        );
    }

    #[test]
    fn multiple_rule_backgrounds_abort_expansion() {
        let doc = Document::new(
            "doc",
            Feature::new("F").rule(
                Rule::new("R")
                    .background(Background::new([given("a")]))
                    .background(Background::new([given("b")])),
            ),
        );

        let err = expand(&[doc]).unwrap_err();

        assert!(
            matches!(err, ConfigError::MultipleBackgrounds { ref scope, .. } if scope == "R"),
            "{err}",
        );
    }

    #[test]
    fn ragged_example_row_is_rejected() {
        let outline = Scenario::new("o")
            .step(given("<a>"))
            .examples(Examples::new(["a", "b"]).row(["1", "2"]).row(["3"]));
        let doc = Document::new("doc", Feature::new("F").scenario(outline));

        let err = expand(&[doc]).unwrap_err();

        assert!(
            matches!(err, ConfigError::ExampleArity { header: 2, row: 2, cells: 1, .. }),
            "{err}",
        );
    }

    #[test]
    fn duplicate_document_names_are_rejected() {
        let doc = Document::new("same", Feature::new("F"));

        let err = expand(&[doc.clone(), doc]).unwrap_err();

        assert!(matches!(err, ConfigError::DuplicateDocument { ref name } if name == "same"));
    }

    #[test]
    fn expansion_is_deterministic() {
        let doc = Document::new(
            "doc",
            Feature::new("F").tag("x").scenario(
                Scenario::new("o")
                    .tag("y")
                    .step(given("<v>"))
                    .examples(Examples::new(["v"]).row(["1"]).row(["2"])),
            ),
        );
        let docs = [doc];

        let first = expand(&docs).unwrap();
        let second = expand(&docs).unwrap();

        assert_eq!(names(&first), names(&second));
        assert_eq!(
            first.iter().map(|c| &c.tags).collect::<Vec<_>>(),
            second.iter().map(|c| &c.tags).collect::<Vec<_>>(),
        );
    }
}

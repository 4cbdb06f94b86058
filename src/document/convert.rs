// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`gherkin::Feature`] extension converting it into a [`Document`].

use sealed::sealed;

use crate::keyword::{Keyword, Primary};

use super::{
    Background, DataTable, Document, Examples, Feature, FeatureChild, Rule,
    RuleChild, Scenario, Step, StepArgument,
};

/// Helper methods to turn a parsed [`gherkin::Feature`] into a [`Document`].
#[sealed]
pub trait Ext: Sized {
    /// Converts this [`gherkin::Feature`] into a [`Document`] with the given
    /// resource `name`.
    ///
    /// Children are ordered by their position in the source file and tags
    /// lose their leading `@`. [`gherkin::Examples`] without a table are kept
    /// as [`Examples`] without rows, so the scenario stays an outline.
    #[must_use]
    fn into_document(self, name: impl Into<String>) -> Document;
}

#[sealed]
impl Ext for gherkin::Feature {
    fn into_document(self, name: impl Into<String>) -> Document {
        let mut children = self
            .background
            .map(|bg| (bg.position.line, FeatureChild::Background(convert_background(bg))))
            .into_iter()
            .chain(
                self.rules
                    .into_iter()
                    .map(|r| (r.position.line, FeatureChild::Rule(convert_rule(r)))),
            )
            .chain(self.scenarios.into_iter().map(|s| {
                (s.position.line, FeatureChild::Scenario(convert_scenario(s)))
            }))
            .collect::<Vec<_>>();
        children.sort_by_key(|(line, _)| *line);

        Document::new(
            name,
            Feature {
                name: self.name,
                tags: normalize_tags(self.tags),
                children: children.into_iter().map(|(_, c)| c).collect(),
            },
        )
    }
}

fn convert_rule(rule: gherkin::Rule) -> Rule {
    let mut children = rule
        .background
        .map(|bg| (bg.position.line, RuleChild::Background(convert_background(bg))))
        .into_iter()
        .chain(rule.scenarios.into_iter().map(|s| {
            (s.position.line, RuleChild::Scenario(convert_scenario(s)))
        }))
        .collect::<Vec<_>>();
    children.sort_by_key(|(line, _)| *line);

    Rule {
        name: rule.name,
        tags: normalize_tags(rule.tags),
        children: children.into_iter().map(|(_, c)| c).collect(),
    }
}

fn convert_background(background: gherkin::Background) -> Background {
    Background::new(background.steps.into_iter().map(convert_step))
}

fn convert_scenario(scenario: gherkin::Scenario) -> Scenario {
    Scenario {
        name: scenario.name,
        tags: normalize_tags(scenario.tags),
        steps: scenario.steps.into_iter().map(convert_step).collect(),
        examples: scenario
            .examples
            .into_iter()
            .map(|ex| {
                let mut rows = ex.table.map(|t| t.rows).unwrap_or_default().into_iter();
                Examples { header: rows.next().unwrap_or_default(), rows: rows.collect() }
            })
            .collect(),
    }
}

fn convert_step(step: gherkin::Step) -> Step {
    // Localized keywords are unknown here, so only their resolved type is kept.
    let keyword = step
        .keyword
        .parse::<Keyword>()
        .unwrap_or_else(|_| Primary::from(step.ty).into());

    let argument = match (step.table, step.docstring) {
        (Some(table), _) => Some(StepArgument::Table(DataTable::from(&table))),
        (None, Some(doc)) => Some(StepArgument::DocString(doc)),
        (None, None) => None,
    };

    Step { keyword, text: step.value, argument }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim_start_matches('@').to_owned())
        .collect()
}

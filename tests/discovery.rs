use std::fs;

use gherkin_runner::{
    error::ConfigResult,
    keyword::Primary,
    runner::Discovery,
    ConfigError, Factories, FeatureDir, Registration, Registry, Runner, StepFn,
    Suite, TestCaseDescriptor,
};

#[derive(Default)]
struct Calculator;

fn calculator_steps() -> ConfigResult<Vec<Registration>> {
    let noop = |m: &'static str| StepFn::sync(m, |_: &mut Calculator, _| Ok(()));
    Registry::builder()
        .given("a fresh calculator", [], noop("fresh"))
        .given("division is enabled", [], noop("division"))
        .when(r"I (?:add|multiply|divide) .*", [], noop("operate"))
        .when("I store the result", [], noop("store"))
        .then(r"the \w+ is \d+", [], noop("check"))
        .build()
}

fn discover(path: &str) -> Discovery {
    let suite = Suite::new("calc", FeatureDir::new(path))
        .steps(calculator_steps)
        .instantiate(Factories::new().with_default::<Calculator>());

    Runner::new().discover([suite])
}

fn names(cases: &[TestCaseDescriptor]) -> Vec<&str> {
    cases.iter().map(|c| c.fully_qualified_name.as_str()).collect()
}

#[test]
fn fully_qualified_names() {
    let discovery = discover("tests/features/discovery");

    assert!(discovery.errors.is_empty(), "{:?}", discovery.errors);
    assert_eq!(
        names(&discovery.cases),
        [
            "calculator.feature.Calculator.Adds two numbers",
            "calculator.feature.Calculator.Multiplies numbers: Example #1",
            "calculator.feature.Calculator.Multiplies numbers: Example #2",
            "calculator.feature.Calculator.Multiplies numbers: Example #3",
            "calculator.feature.Calculator.Division.Divides by one",
            "nested.memory.feature.Memory.Stores the result",
        ],
    );
    assert!(discovery.cases.iter().all(|c| c.source == "calc"));
    assert_eq!(discovery.cases[3].display_name, "Multiplies numbers: Example #3");
}

#[test]
fn tags_are_inherited() {
    let cases = discover("tests/features/discovery").cases;

    assert_eq!(cases[0].tags, ["calc"]);
    assert_eq!(cases[1].tags, ["calc", "slow"]);
    assert_eq!(cases[4].tags, ["calc", "edge"]);
    assert!(cases[5].tags.is_empty());
}

#[test]
fn backgrounds_and_placeholders() {
    let cases = discover("tests/features/discovery").cases;

    let steps = |n: usize| {
        cases[n].case().steps.iter().map(ToString::to_string).collect::<Vec<_>>()
    };
    assert_eq!(
        steps(0),
        ["Given a fresh calculator", "When I add 2 and 3", "Then the result is 5"],
    );
    assert_eq!(
        steps(3),
        [
            "Given a fresh calculator",
            "When I multiply 100 and 10",
            "Then the result is 1000",
        ],
    );
    assert_eq!(
        steps(4),
        [
            "Given a fresh calculator",
            "Given division is enabled",
            "When I divide 7 by 1",
            "Then the result is 7",
        ],
    );

    let memory = &cases[5].case().steps;
    assert_eq!(memory[2].keyword, Primary::When, "`And` inherits `When`");
}

#[test]
fn discovery_is_deterministic() {
    let first = discover("tests/features/discovery").cases;
    let second = discover("tests/features/discovery").cases;

    assert_eq!(names(&first), names(&second));
    assert_eq!(
        first.iter().map(|c| &c.tags).collect::<Vec<_>>(),
        second.iter().map(|c| &c.tags).collect::<Vec<_>>(),
    );
}

#[test]
fn discovered_cases_pass() {
    let runner = Runner::new();
    let outcomes = runner.execute_blocking(discover("tests/features/discovery").cases);

    assert_eq!(outcomes.len(), 6);
    assert!(outcomes.iter().all(|o| o.is_passed()), "{outcomes:#?}");
}

#[test]
fn single_file_is_named_by_file_name() {
    let discovery = discover("tests/features/discovery/nested/memory.feature");

    assert_eq!(names(&discovery.cases), ["memory.feature.Memory.Stores the result"]);
}

#[test]
fn broken_file_aborts_its_source_only() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.feature"), "Scenario: Orphan\n  Given no feature\n")
        .unwrap();
    let broken = Suite::new("broken", FeatureDir::new(dir.path()));
    let good = Suite::new("good", FeatureDir::new("tests/features/discovery"))
        .steps(calculator_steps)
        .instantiate(Factories::new().with_default::<Calculator>());

    let discovery = Runner::new().discover([&broken, &good]);

    assert_eq!(discovery.cases.len(), 6);
    assert_eq!(discovery.errors.len(), 1);
    assert_eq!(discovery.errors[0].source_name, "broken");
    assert!(matches!(discovery.errors[0].error, ConfigError::Parse { .. }));
}

#[test]
fn invalid_pattern_aborts_source() {
    let suite = Suite::new("invalid", FeatureDir::new("tests/features/discovery"))
        .steps(|| {
            Registry::builder()
                .given("(unclosed", [], StepFn::sync("x", |_: &mut Calculator, _| Ok(())))
                .build()
        });

    let discovery = Runner::new().discover([suite]);

    assert!(discovery.cases.is_empty());
    assert!(matches!(
        discovery.errors[0].error,
        ConfigError::InvalidPattern { .. },
    ));
}

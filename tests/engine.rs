use chrono::NaiveDate;
use gherkin_runner::{
    bind::{ParamType, TransformInput, Transforms},
    document::{Feature, Scenario, Step},
    error::{ConfigResult, HandlerFailure},
    keyword::Keyword,
    runner::Report,
    DataTable, Document, Factories, FeatureDir, Registration, Registry, Runner,
    Status, StepError, StepFn, Suite,
};

#[derive(Debug, Default)]
struct StepClass {
    given: bool,
    when: Option<(i64, String, DataTable)>,
    date_checked: bool,
}

fn step_class_steps() -> ConfigResult<Vec<Registration>> {
    Registry::builder()
        .given(
            "this is given step",
            [],
            StepFn::sync("given", |s: &mut StepClass, _| {
                s.given = true;
                Ok(())
            }),
        )
        .when(
            "this is when step with '(.*)' argument an '(.*)' argument",
            [ParamType::Int, ParamType::Str, ParamType::Table],
            StepFn::sync("when", |s: &mut StepClass, mut args| {
                let arg1 = args.next::<i64>()?;
                let arg2 = args.next::<String>()?;
                let table = args.next::<DataTable>()?;
                anyhow::ensure!(arg1 == 1, "arg1 should be 1, but was {arg1}");
                s.when = Some((arg1, arg2, table));
                Ok(())
            }),
        )
        .when(
            "this is second when step with date '(.*)' argument",
            [ParamType::DateTime],
            StepFn::sync("second_when", |s: &mut StepClass, mut args| {
                let date = args.next::<chrono::NaiveDateTime>()?;
                let expected = NaiveDate::from_ymd_opt(2020, 1, 1)
                    .and_then(|d| d.and_hms_opt(0, 0, 0));
                anyhow::ensure!(Some(date) == expected, "unexpected date: {date}");
                s.date_checked = true;
                Ok(())
            }),
        )
        .then(
            "this is then step",
            [],
            StepFn::sync("then", |s: &mut StepClass, _| {
                anyhow::ensure!(s.given, "given step wasn't run");
                let (arg1, arg2, table) =
                    s.when.as_ref().ok_or_else(|| anyhow::anyhow!("when step wasn't run"))?;
                assert_eq!(*arg1, 1);
                assert_eq!(arg2, "text");
                assert_eq!(table.body().len(), 2);
                assert_eq!(table.hashes()[1]["name"], "second");
                Ok(())
            }),
        )
        .build()
}

async fn run_step_class() -> Report {
    let suite = Suite::new("step_class", FeatureDir::new("tests/features/engine"))
        .steps(step_class_steps)
        .instantiate(Factories::new().with_default::<StepClass>());

    Runner::new().run([&suite]).await
}

#[tokio::test]
async fn binds_captures_and_table() {
    let report = run_step_class().await;

    assert!(report.errors.is_empty(), "{:?}", report.errors);
    let passed = &report.outcomes[0];
    assert_eq!(passed.id, "step_class.feature.StepClass.Arguments are bound");
    assert_eq!(passed.status, Status::Passed, "{passed}");
    assert_eq!(passed.steps_attempted, 4);
    assert!(passed.error_message().is_none());
}

#[tokio::test]
async fn handler_rejection_is_invocation_error() {
    let report = run_step_class().await;

    let failed = &report.outcomes[1];
    assert_eq!(failed.id, "step_class.feature.StepClass.Handler rejects its argument");
    assert_eq!(failed.status, Status::Failed);
    assert_eq!(failed.steps_attempted, 2, "then step must not run");
    let Some(StepError::Invocation { step, failure: HandlerFailure::Error(e) }) = &failed.error
    else {
        panic!("expected handler invocation error, got: {failed}");
    };
    assert_eq!(step, "When this is when step with '2' argument an 'text' argument");
    assert_eq!(e.to_string(), "arg1 should be 1, but was 2");
    assert!(failed.error_detail().unwrap().contains("arg1 should be 1"));
    assert!(report.execution_has_failed());
    assert_eq!(report.stats().passed, 1);
}

#[derive(Default)]
struct Basket {
    apples: i64,
}

fn basket_suite(scenario: Scenario) -> Suite {
    let doc = Document::new("basket.feature", Feature::new("Basket").scenario(scenario));
    Suite::new("basket", vec![doc])
        .steps(|| {
            Registry::builder()
                .given(
                    r"I have (\w+) apples",
                    [ParamType::Int],
                    StepFn::sync("have", |b: &mut Basket, mut args| {
                        b.apples = args.next()?;
                        Ok(())
                    }),
                )
                .given(
                    r"I have (\d+) apples and (\d+) pears",
                    [ParamType::Int],
                    StepFn::sync("have_both", |_: &mut Basket, _| Ok(())),
                )
                .when(
                    r"I eat (.*)",
                    [],
                    StepFn::sync("eat_anything", |_: &mut Basket, _| Ok(())),
                )
                .when(
                    r"I eat (\d+) apples",
                    [ParamType::Int],
                    StepFn::sync("eat", |b: &mut Basket, mut args| {
                        b.apples -= args.next::<i64>()?;
                        Ok(())
                    }),
                )
                .then(
                    r"I pay (\S+)",
                    [ParamType::custom("money")],
                    StepFn::sync("pay", |_: &mut Basket, mut args| {
                        let Money(cents) = args.next_custom::<Money>()?;
                        anyhow::ensure!(cents == 250, "paid {cents} cents");
                        Ok(())
                    }),
                )
                .build()
        })
        .instantiate(Factories::new().with_default::<Basket>())
        .transforms(Transforms::new().register("money", |input| match input {
            TransformInput::Text(t) => {
                let (units, cents) = t
                    .trim_start_matches('$')
                    .split_once('.')
                    .ok_or_else(|| anyhow::anyhow!("no cents in `{t}`"))?;
                Ok(Money(units.parse::<u32>()? * 100 + cents.parse::<u32>()?))
            }
            TransformInput::Table(_) => anyhow::bail!("money can't be a table"),
        }))
}

#[derive(Debug)]
struct Money(u32);

async fn run_basket(steps: &[(Keyword, &str)]) -> gherkin_runner::TestOutcome {
    let scenario = steps
        .iter()
        .fold(Scenario::new("Shopping"), |s, (k, t)| s.step(Step::new(*k, *t)));

    let report = Runner::new().run([basket_suite(scenario)]).await;

    assert!(report.errors.is_empty(), "{:?}", report.errors);
    report.outcomes.into_iter().next().unwrap()
}

#[tokio::test]
async fn unknown_step_fails_case() {
    let out = run_basket(&[(Keyword::Given, "I have 3 apples"), (Keyword::Then, "I am full")])
        .await;

    assert_eq!(out.status, Status::Failed);
    assert_eq!(
        out.error_message().unwrap(),
        "Unable to find step implementation for: Then I am full",
    );
}

#[tokio::test]
async fn ambiguous_step_lists_candidates() {
    let out = run_basket(&[(Keyword::When, "I eat 2 apples")]).await;

    let Some(StepError::Ambiguous { candidates, .. }) = &out.error else {
        panic!("expected ambiguity, got: {out}");
    };
    assert_eq!(candidates.len(), 2);
    let message = out.error_message().unwrap();
    assert!(
        message.starts_with("Multiple step implementations were found for: When I eat 2 apples"),
        "{message}",
    );
    assert!(message.contains(r"I eat (\d+) apples"), "{message}");
}

#[tokio::test]
async fn arity_mismatch_names_handler() {
    let out = run_basket(&[(Keyword::Given, "I have 1 apples and 2 pears")]).await;

    assert!(matches!(out.error, Some(StepError::Arity { expected: 2, declared: 1, .. })));
    assert!(out.error_message().unwrap().contains("Basket::have_both"));
}

#[tokio::test]
async fn conversion_failure_names_step_and_value() {
    let out = run_basket(&[(Keyword::Given, "I have many apples")]).await;

    let Some(StepError::Conversion { step, parameter, value, .. }) = &out.error else {
        panic!("expected conversion error, got: {out}");
    };
    assert_eq!(step, "I have many apples");
    assert_eq!(*parameter, 1);
    assert_eq!(value, "many");
}

#[tokio::test]
async fn continuation_inherits_keyword_and_transform_applies() {
    let out = run_basket(&[
        (Keyword::Given, "I have 3 apples"),
        (Keyword::Then, "I pay $2.50"),
        (Keyword::And, "I pay 2.50"),
    ])
    .await;

    assert_eq!(out.status, Status::Passed, "{out}");
    assert_eq!(out.steps_attempted, 3);
}

#[tokio::test]
async fn failed_transform_is_conversion_error() {
    let out = run_basket(&[(Keyword::Then, "I pay 2")]).await;

    assert!(matches!(out.error, Some(StepError::Conversion { .. })), "{out}");
}

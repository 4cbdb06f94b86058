// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Execution of a single test case.

use std::{
    panic::{self, AssertUnwindSafe},
    time::{Instant, SystemTime},
};

use futures::FutureExt as _;

use crate::{
    bind::bind,
    error::{HandlerFailure, StepError, StepResult},
    expand::CaseStep,
    instance::Scope,
    resolve::Match,
    step::Invocation,
};

use super::{CaseState, RunContext, Status, TestCaseDescriptor, TestOutcome};

/// Executes all the steps of the given case in order, stopping at the first
/// failed one.
pub(super) async fn execute_case(case: &TestCaseDescriptor) -> TestOutcome {
    let mut state = CaseState::Pending.start();
    let started_at = SystemTime::now();
    let timer = Instant::now();

    let context = case.context();
    let mut scope = Scope::new(context.instantiator());
    let mut steps_attempted = 0;
    let mut error = None;

    for step in &case.case().steps {
        steps_attempted += 1;
        if let Err(e) = execute_step(context, &mut scope, step).await {
            error = Some(e);
            break;
        }
    }
    drop(scope);

    let status = if error.is_some() { Status::Failed } else { Status::Passed };
    state = state.finish(status);
    let duration = timer.elapsed();

    match &error {
        None => tracing::info!(
            state = %state,
            duration = %humantime::format_duration(duration),
            "case finished",
        ),
        Some(e) => tracing::warn!(
            state = %state,
            step = steps_attempted,
            duration = %humantime::format_duration(duration),
            "case finished: {e}",
        ),
    }

    TestOutcome {
        id: case.fully_qualified_name.clone(),
        status,
        error,
        started_at,
        duration,
        steps_attempted,
    }
}

/// Resolves, binds and invokes a single step, awaiting its deferred
/// computation (if any) before returning.
async fn execute_step(
    context: &RunContext,
    scope: &mut Scope<'_>,
    step: &CaseStep,
) -> StepResult<()> {
    let Match { registration, captures } =
        context.registry().resolve(step.keyword, &step.text)?;
    tracing::debug!(step = %step, handler = %registration.id(), "resolved");

    let instance = scope.get_or_create(&registration.owner(), &step.text)?;
    let args = bind(
        registration,
        &step.text,
        captures,
        step.argument.as_ref(),
        context.transforms(),
    )?;

    tracing::trace!(step = %step, arguments = args.len(), "invoking");
    let invoked = panic::catch_unwind(AssertUnwindSafe(move || {
        registration.invoke(instance, args)
    }));
    let result = match invoked {
        Ok(Invocation::Immediate(res)) => res.map_err(HandlerFailure::Error),
        Ok(Invocation::Deferred(fut)) => {
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(res) => res.map_err(HandlerFailure::Error),
                Err(payload) => Err(HandlerFailure::panic(&*payload)),
            }
        }
        Err(payload) => Err(HandlerFailure::panic(&*payload)),
    };

    result.map_err(|failure| StepError::Invocation { step: step.to_string(), failure })
}

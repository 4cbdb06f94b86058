// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Type-erased step handlers and their identities.

use std::{
    any::{self, Any, TypeId},
    borrow::Cow,
    sync::Arc,
};

use anyhow::anyhow;
use derive_more::with_trait::{Debug, Display};
use futures::future::LocalBoxFuture;

use crate::bind::Arguments;

/// Result of invoking a step handler.
///
/// The engine awaits the computation only in the [`Invocation::Deferred`]
/// case, and treats its failure exactly like an [`Invocation::Immediate`] one.
#[derive(Debug)]
pub enum Invocation<'a> {
    /// Handler has already completed.
    Immediate(anyhow::Result<()>),

    /// Handler completes once this future resolves.
    Deferred(#[debug("LocalBoxFuture")] LocalBoxFuture<'a, anyhow::Result<()>>),
}

/// Type-erased step handler, invoked on the instance of its [`Owner`].
pub(crate) type Handler = Arc<
    dyn for<'a> Fn(&'a mut dyn Any, Arguments) -> Invocation<'a> + Send + Sync,
>;

/// Type owning step handlers, whose instance handlers are invoked on.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[display("{name}")]
pub struct Owner {
    #[debug(skip)]
    id: TypeId,
    name: &'static str,
}

impl Owner {
    /// Returns the [`Owner`] representing the type `T`.
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self { id: TypeId::of::<T>(), name: any::type_name::<T>() }
    }

    /// [`TypeId`] of this [`Owner`].
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.id
    }

    /// Name of this [`Owner`] type.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

/// Identity of a step handler: its [`Owner`] type and method.
#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
#[display("{owner}::{method}")]
pub struct HandlerId {
    /// [`Owner`] of the handler.
    pub owner: Owner,

    /// Name of the handler method.
    pub method: Cow<'static, str>,
}

/// Step handler along with its [`HandlerId`], ready to be registered.
#[derive(Clone, Debug)]
pub struct StepFn {
    pub(crate) id: HandlerId,

    #[debug(skip)]
    pub(crate) call: Handler,
}

impl StepFn {
    /// Creates a [`StepFn`] out of a synchronous handler method of `T`.
    #[must_use]
    pub fn sync<T, F>(method: impl Into<Cow<'static, str>>, handler: F) -> Self
    where
        T: Any,
        F: Fn(&mut T, Arguments) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            id: HandlerId { owner: Owner::of::<T>(), method: method.into() },
            call: erase(move |instance, args| {
                Invocation::Immediate(match instance.downcast_mut::<T>() {
                    Some(this) => handler(this, args),
                    None => Err(owner_mismatch::<T>()),
                })
            }),
        }
    }

    /// Creates a [`StepFn`] out of an asynchronous handler method of `T`.
    ///
    /// ```rust
    /// use futures::FutureExt as _;
    /// use gherkin_runner::step::StepFn;
    ///
    /// #[derive(Default)]
    /// struct Counter(u32);
    ///
    /// let step = StepFn::deferred("bump", |c: &mut Counter, _| {
    ///     async move {
    ///         c.0 += 1;
    ///         Ok(())
    ///     }
    ///     .boxed_local()
    /// });
    /// assert!(step.id().to_string().ends_with("Counter::bump"));
    /// ```
    #[must_use]
    pub fn deferred<T, F>(method: impl Into<Cow<'static, str>>, handler: F) -> Self
    where
        T: Any,
        F: for<'a> Fn(&'a mut T, Arguments) -> LocalBoxFuture<'a, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            id: HandlerId { owner: Owner::of::<T>(), method: method.into() },
            call: erase(move |instance, args| match instance.downcast_mut::<T>() {
                Some(this) => Invocation::Deferred(handler(this, args)),
                None => Invocation::Immediate(Err(owner_mismatch::<T>())),
            }),
        }
    }

    /// [`HandlerId`] of this [`StepFn`].
    #[must_use]
    pub const fn id(&self) -> &HandlerId {
        &self.id
    }
}

/// Pins the higher-ranked signature of a handler closure.
fn erase<F>(f: F) -> Handler
where
    F: for<'a> Fn(&'a mut dyn Any, Arguments) -> Invocation<'a> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn owner_mismatch<T>() -> anyhow::Error {
    anyhow!(
        "handler was invoked on an instance other than `{}`",
        any::type_name::<T>(),
    )
}

// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Instances step handlers are invoked on.
//!
//! The engine never constructs handler [`Owner`]s itself: it asks an
//! [`Instantiate`] implementation for them, once per [`Owner`] per test case.

use std::{
    any::{Any, TypeId},
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
};

use anyhow::anyhow;
use derive_more::with_trait::Debug;

use crate::{
    error::{StepError, StepResult},
    step::Owner,
};

/// Capability of providing a fresh instance of a handler [`Owner`].
pub trait Instantiate {
    /// Creates a new instance of the given [`Owner`], used for exactly one
    /// test case.
    ///
    /// # Errors
    ///
    /// If the [`Owner`] is unknown or fails to construct.
    fn instantiate(&self, owner: &Owner) -> anyhow::Result<Box<dyn Any>>;
}

impl<F> Instantiate for F
where
    F: Fn(&Owner) -> anyhow::Result<Box<dyn Any>>,
{
    fn instantiate(&self, owner: &Owner) -> anyhow::Result<Box<dyn Any>> {
        self(owner)
    }
}

type Factory = Arc<dyn Fn() -> anyhow::Result<Box<dyn Any>> + Send + Sync>;

/// [`Instantiate`] implementation backed by per-type factories.
///
/// ```rust
/// use gherkin_runner::{instance::{Factories, Instantiate as _}, step::Owner};
///
/// #[derive(Default)]
/// struct Calculator;
///
/// let factories = Factories::new().with_default::<Calculator>();
///
/// assert!(factories.instantiate(&Owner::of::<Calculator>()).is_ok());
/// assert!(factories.instantiate(&Owner::of::<String>()).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Factories {
    #[debug("{}", by_type.len())]
    by_type: HashMap<TypeId, Factory>,
}

impl Factories {
    /// Creates an empty set of [`Factories`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` to be constructed with [`Default`].
    #[must_use]
    pub fn with_default<T: Any + Default>(self) -> Self {
        self.with(|| Ok(T::default()))
    }

    /// Registers `T` to be constructed by the given `factory`.
    #[must_use]
    pub fn with<T, F>(mut self, factory: F) -> Self
    where
        T: Any,
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let erased: Factory =
            Arc::new(move || factory().map(|v| Box::new(v) as Box<dyn Any>));
        _ = self.by_type.insert(TypeId::of::<T>(), erased);
        self
    }
}

impl Instantiate for Factories {
    fn instantiate(&self, owner: &Owner) -> anyhow::Result<Box<dyn Any>> {
        let factory = self
            .by_type
            .get(&owner.type_id())
            .ok_or_else(|| anyhow!("no factory is registered for `{owner}`"))?;
        factory()
    }
}

/// Instances of the [`Owner`]s used by a single test case.
///
/// Each [`Owner`] is instantiated lazily on first use and shared by the
/// following steps of the same case. Everything is dropped with the
/// [`Scope`].
#[derive(Debug)]
pub struct Scope<'i> {
    #[debug(skip)]
    instantiate: &'i dyn Instantiate,

    #[debug("{:?}", instances.keys().collect::<Vec<_>>())]
    instances: HashMap<TypeId, Box<dyn Any>>,
}

impl<'i> Scope<'i> {
    /// Creates a new empty [`Scope`].
    #[must_use]
    pub fn new(instantiate: &'i dyn Instantiate) -> Self {
        Self { instantiate, instances: HashMap::new() }
    }

    /// Returns the instance of the given [`Owner`], creating it if this
    /// [`Scope`] has none yet. The `step` text is only used to report a
    /// failure.
    ///
    /// # Errors
    ///
    /// With [`StepError::Instantiation`] if the [`Instantiate`]
    /// implementation fails, or returns an instance of another type.
    pub fn get_or_create(
        &mut self,
        owner: &Owner,
        step: &str,
    ) -> StepResult<&mut dyn Any> {
        let instantiation = |error| StepError::Instantiation {
            step: step.to_owned(),
            owner: owner.to_string(),
            error,
        };

        let instance = match self.instances.entry(owner.type_id()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                tracing::trace!(owner = owner.name(), "instantiating");
                let created = self.instantiate.instantiate(owner).map_err(instantiation)?;
                if (*created).type_id() != owner.type_id() {
                    return Err(instantiation(anyhow!(
                        "instance of another type was provided",
                    )));
                }
                e.insert(created)
            }
        };
        Ok(&mut **instance)
    }

    /// Number of instances created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Indicates whether no instance has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct Counter(u32);

    #[test]
    fn shares_instance_within_scope() {
        let factories = Factories::new().with_default::<Counter>();
        let owner = Owner::of::<Counter>();
        let mut scope = Scope::new(&factories);

        let first = scope.get_or_create(&owner, "step").unwrap();
        first.downcast_mut::<Counter>().unwrap().0 += 1;
        let second = scope.get_or_create(&owner, "step").unwrap();

        assert_eq!(second.downcast_mut::<Counter>().unwrap().0, 1);
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn new_scope_gets_new_instance() {
        static CREATED: AtomicUsize = AtomicUsize::new(0);
        let factories = Factories::new().with(|| {
            _ = CREATED.fetch_add(1, Ordering::SeqCst);
            Ok(Counter(7))
        });
        let owner = Owner::of::<Counter>();

        for _ in 0..2 {
            let mut scope = Scope::new(&factories);
            assert!(scope.is_empty());
            let c = scope.get_or_create(&owner, "step").unwrap();
            assert_eq!(c.downcast_mut::<Counter>().unwrap().0, 7);
        }

        assert_eq!(CREATED.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unknown_owner_fails_to_instantiate() {
        let factories = Factories::new();
        let mut scope = Scope::new(&factories);

        let err = scope.get_or_create(&Owner::of::<Counter>(), "a counter").unwrap_err();

        assert!(matches!(err, StepError::Instantiation { .. }));
        assert_eq!(err.step_text(), Some("a counter"));
        assert!(err.to_string().contains("no factory is registered"), "{err}");
    }

    #[test]
    fn closures_can_instantiate() {
        let wrong = |_: &Owner| -> anyhow::Result<Box<dyn Any>> { Ok(Box::new(1_u8)) };
        let mut scope = Scope::new(&wrong);

        let err = scope.get_or_create(&Owner::of::<Counter>(), "a counter").unwrap_err();

        assert!(err.to_string().contains("instance of another type"), "{err}");
    }
}

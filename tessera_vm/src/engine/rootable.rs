// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::marker::PhantomData;

use crate::{
    ecmascript::{
        builtins::{
            Array, ArrayBuffer, Function,
            indexed_collections::array_objects::array_iterator_objects::ArrayIterator,
            typed_array::TypedArray,
        },
        execution::Agent,
        types::{Object, String, Value},
    },
    engine::context::{Bindable, NoGcScope},
};

/// Types that can be stored in the scoped root list.
///
/// Rootable types are always the unbound (`'static`) form of a handle.
pub trait Rootable: Copy + 'static {
    fn into_root_value(self) -> Value<'static>;
    fn from_root_value(value: Value<'static>) -> Option<Self>;
}

impl Rootable for Value<'static> {
    fn into_root_value(self) -> Value<'static> {
        self
    }

    fn from_root_value(value: Value<'static>) -> Option<Self> {
        Some(value)
    }
}

macro_rules! rootable_via_value {
    ($($name: ident),*) => {
        $(
            impl Rootable for $name<'static> {
                fn into_root_value(self) -> Value<'static> {
                    self.into()
                }

                fn from_root_value(value: Value<'static>) -> Option<Self> {
                    $name::try_from(value).ok()
                }
            }
        )*
    };
}

rootable_via_value!(Object, Array, ArrayBuffer, ArrayIterator, TypedArray, Function, String);

#[derive(Debug, Clone, Copy)]
enum ScopedRepr {
    /// Primitive values do not need rooting.
    Inline(Value<'static>),
    /// Heap values are kept alive through the agent's root list.
    Slot(u32),
}

/// # Scoped heap root
///
/// This type roots a heap-allocated value for the duration of the current
/// native call scope. Rooted values cannot be reclaimed, so reading the
/// rooted value is always valid within that scope, including after calls
/// that suspend. The `'scope` lifetime makes use after the scope has ended a
/// compile error.
#[derive(Debug, Clone, Copy)]
pub struct Scoped<'scope, T: Rootable> {
    inner: ScopedRepr,
    _marker: PhantomData<T>,
    _scope: PhantomData<&'scope ()>,
}

// SAFETY: A scoped root stays valid for its whole scope, independent of the
// garbage collector lifetime.
unsafe impl<'scope, T: Rootable> Bindable for Scoped<'scope, T> {
    type Of<'a> = Scoped<'scope, T>;

    #[inline(always)]
    fn unbind(self) -> Self::Of<'static> {
        self
    }

    #[inline(always)]
    fn bind<'a>(self, _gc: NoGcScope<'a, '_>) -> Self::Of<'a> {
        self
    }
}

impl<'scope, T: Rootable> Scoped<'scope, T> {
    pub fn new(agent: &Agent, value: T, _gc: NoGcScope<'_, 'scope>) -> Self {
        let value = value.into_root_value();
        let inner = if value.is_primitive() {
            ScopedRepr::Inline(value)
        } else {
            let mut stack_refs = agent.stack_refs.borrow_mut();
            let next_index = stack_refs.len();
            let Ok(next_index) = u32::try_from(next_index) else {
                handle_index_overflow()
            };
            stack_refs.push(value);
            ScopedRepr::Slot(next_index)
        };
        Self {
            inner,
            _marker: PhantomData,
            _scope: PhantomData,
        }
    }

    pub fn get(&self, agent: &Agent) -> T {
        let value = match self.inner {
            ScopedRepr::Inline(value) => value,
            ScopedRepr::Slot(index) => {
                let Some(&value) = agent.stack_refs.borrow().get(index as usize) else {
                    handle_bound_check_failure()
                };
                value
            }
        };
        let Some(value) = T::from_root_value(value) else {
            handle_invalid_scoped_conversion()
        };
        value
    }

    /// Replace the rooted value, reusing the root slot if there is one.
    pub fn replace(&mut self, agent: &Agent, value: T) {
        let value = value.into_root_value();
        match (self.inner, value.is_primitive()) {
            (_, true) => self.inner = ScopedRepr::Inline(value),
            (ScopedRepr::Slot(index), false) => {
                let mut stack_refs = agent.stack_refs.borrow_mut();
                let Some(slot) = stack_refs.get_mut(index as usize) else {
                    handle_bound_check_failure()
                };
                *slot = value;
            }
            (ScopedRepr::Inline(_), false) => {
                let mut stack_refs = agent.stack_refs.borrow_mut();
                let Ok(next_index) = u32::try_from(stack_refs.len()) else {
                    handle_index_overflow()
                };
                stack_refs.push(value);
                self.inner = ScopedRepr::Slot(next_index);
            }
        }
    }

    /// Read the rooted value out of the scope.
    ///
    /// # Safety
    ///
    /// The caller must not use this Scoped (or any copy of it) afterwards;
    /// the value is no longer guaranteed to be rooted by it.
    pub unsafe fn take(self, agent: &Agent) -> T {
        self.get(agent)
    }
}

/// Adds `.scope(agent, gc)` to every bindable handle whose unbound form is
/// rootable.
pub trait Scopable: Bindable
where
    Self::Of<'static>: Rootable,
{
    fn scope<'scope>(
        self,
        agent: &Agent,
        gc: NoGcScope<'_, 'scope>,
    ) -> Scoped<'scope, Self::Of<'static>> {
        Scoped::new(agent, self.unbind(), gc)
    }
}

impl<T: Bindable> Scopable for T where T::Of<'static>: Rootable {}

#[cold]
#[inline(never)]
fn handle_invalid_scoped_conversion() -> ! {
    panic!("Attempted to convert mismatched Scoped");
}

#[cold]
#[inline(never)]
fn handle_index_overflow() -> ! {
    panic!("Scoped roots stack overflowed");
}

#[cold]
#[inline(never)]
fn handle_bound_check_failure() -> ! {
    panic!("Attempted to access dropped Scoped")
}

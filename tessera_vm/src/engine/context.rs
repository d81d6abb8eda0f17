// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::marker::PhantomData;

/// # ZST type representing access to the garbage collector.
///
/// Access to a garbage collected type's heap data should mainly require
/// holding a `GcScope<'gc, '_>`. Borrowing the heap data should bind to the
/// `'gc` lifetime.
// Note: non-exhaustive to make sure this is not constructable on the outside.
#[non_exhaustive]
#[derive(Debug)]
pub(crate) struct GcToken;

/// # ZST type representing a native call scope
///
/// Access to scoped root values should mainly require holding a
/// `NoGcScope<'_, 'scope>`. Scoped roots bind to the `'scope` lifetime and
/// are released when the call scope ends.
// Note: non-exhaustive to make sure this is not constructable on the outside.
#[non_exhaustive]
#[derive(Debug)]
pub(crate) struct ScopeToken;

/// # Access to garbage collector
///
/// Holding this token is required for any operation that can allocate or
/// call back into user code: such an operation is a suspension point, and
/// every value bound to an earlier [`NoGcScope`] is invalidated by it.
#[derive(Debug)]
pub struct GcScope<'a, 'b> {
    _gc: GcToken,
    _scope: ScopeToken,
    _gc_marker: PhantomData<&'a mut GcToken>,
    _scope_marker: PhantomData<&'b ScopeToken>,
}

/// # Access to the native call stack without suspension
///
/// Holding this token grants access to heap data but not to user code.
#[derive(Debug, Clone, Copy)]
pub struct NoGcScope<'a, 'b> {
    _gc_marker: PhantomData<&'a GcToken>,
    _scope_marker: PhantomData<&'b ScopeToken>,
}

impl GcToken {
    unsafe fn new() -> Self {
        Self
    }
}

impl ScopeToken {
    unsafe fn new() -> Self {
        Self
    }
}

impl<'a, 'b> GcScope<'a, 'b> {
    /// SAFETY: Only one GcScope root should exist at any point in time.
    ///
    /// The caller must make sure to only create a new root when a new
    /// native call stack is initialized.
    #[inline]
    pub(crate) unsafe fn create_root() -> (GcToken, ScopeToken) {
        // SAFETY: Forwarded to caller.
        unsafe { (GcToken::new(), ScopeToken::new()) }
    }

    #[inline]
    pub(crate) fn new(_: &'a mut GcToken, _: &'b mut ScopeToken) -> Self {
        Self {
            _gc: GcToken,
            _scope: ScopeToken,
            _gc_marker: PhantomData,
            _scope_marker: PhantomData,
        }
    }

    /// Reborrow the scope for a call that may suspend. Values bound to the
    /// current scope cannot be used while the reborrow is alive.
    #[inline]
    pub fn reborrow(&mut self) -> GcScope<'_, 'b> {
        GcScope {
            _gc: GcToken,
            _scope: ScopeToken,
            _gc_marker: PhantomData,
            _scope_marker: PhantomData,
        }
    }

    #[inline]
    pub fn nogc(&self) -> NoGcScope<'_, 'b> {
        NoGcScope {
            _gc_marker: PhantomData,
            _scope_marker: PhantomData,
        }
    }

    #[inline]
    pub fn into_nogc(self) -> NoGcScope<'a, 'b> {
        NoGcScope {
            _gc_marker: PhantomData,
            _scope_marker: PhantomData,
        }
    }
}

impl NoGcScope<'static, 'static> {
    /// Scope used while creating intrinsics, before any native call stack
    /// exists. Intrinsics live as long as the agent.
    #[inline]
    pub(crate) const fn intrinsic() -> Self {
        NoGcScope {
            _gc_marker: PhantomData,
            _scope_marker: PhantomData,
        }
    }
}

/// # Lifetime-branded heap references
///
/// Handles into the heap carry the lifetime of the [`NoGcScope`] they were
/// bound to. Unbinding erases the lifetime so that a handle can be passed
/// through a call that takes the [`GcScope`], after which it must be bound
/// again (if the call could not have invalidated it) or re-read from a
/// [`Scoped`](crate::engine::Scoped) root.
///
/// # Safety
///
/// `Of<'a>` must be the same type as `Self` with only its lifetime changed.
pub unsafe trait Bindable: Sized {
    type Of<'a>;

    fn unbind(self) -> Self::Of<'static>;
    fn bind<'a>(self, gc: NoGcScope<'a, '_>) -> Self::Of<'a>;
}

/// Implements [`Bindable`] for a handle type with a single lifetime
/// parameter.
macro_rules! bindable_handle {
    ($name: ident) => {
        // SAFETY: The handle's lifetime is only carried in PhantomData.
        unsafe impl $crate::engine::context::Bindable for $name<'_> {
            type Of<'a> = $name<'a>;

            #[inline(always)]
            fn unbind(self) -> Self::Of<'static> {
                // SAFETY: Only the lifetime changes.
                unsafe { core::mem::transmute::<Self, Self::Of<'static>>(self) }
            }

            #[inline(always)]
            fn bind<'a>(self, _gc: $crate::engine::context::NoGcScope<'a, '_>) -> Self::Of<'a> {
                // SAFETY: Only the lifetime changes.
                unsafe { core::mem::transmute::<Self, Self::Of<'a>>(self) }
            }
        }
    };
}
pub(crate) use bindable_handle;

macro_rules! trivially_bindable {
    ($($name: ty),* $(,)?) => {
        $(
            // SAFETY: The type carries no lifetime.
            unsafe impl Bindable for $name {
                type Of<'a> = $name;

                #[inline(always)]
                fn unbind(self) -> Self::Of<'static> {
                    self
                }

                #[inline(always)]
                fn bind<'a>(self, _gc: NoGcScope<'a, '_>) -> Self::Of<'a> {
                    self
                }
            }
        )*
    };
}

trivially_bindable!(
    (),
    bool,
    u8,
    u32,
    u64,
    usize,
    i64,
    f64,
    core::cmp::Ordering,
    std::string::String,
    crate::ecmascript::types::ElementValue,
);

// SAFETY: Both variants are Bindable.
unsafe impl<T: Bindable, E: Bindable> Bindable for Result<T, E> {
    type Of<'a> = Result<T::Of<'a>, E::Of<'a>>;

    #[inline(always)]
    fn unbind(self) -> Self::Of<'static> {
        match self {
            Ok(t) => Ok(t.unbind()),
            Err(e) => Err(e.unbind()),
        }
    }

    #[inline(always)]
    fn bind<'a>(self, gc: NoGcScope<'a, '_>) -> Self::Of<'a> {
        match self {
            Ok(t) => Ok(t.bind(gc)),
            Err(e) => Err(e.bind(gc)),
        }
    }
}

// SAFETY: Both fields are Bindable.
unsafe impl<T: Bindable, U: Bindable> Bindable for (T, U) {
    type Of<'a> = (T::Of<'a>, U::Of<'a>);

    #[inline(always)]
    fn unbind(self) -> Self::Of<'static> {
        (self.0.unbind(), self.1.unbind())
    }

    #[inline(always)]
    fn bind<'a>(self, gc: NoGcScope<'a, '_>) -> Self::Of<'a> {
        (self.0.bind(gc), self.1.bind(gc))
    }
}

// SAFETY: The inner value is Bindable.
unsafe impl<T: Bindable> Bindable for Option<T> {
    type Of<'a> = Option<T::Of<'a>>;

    #[inline(always)]
    fn unbind(self) -> Self::Of<'static> {
        self.map(T::unbind)
    }

    #[inline(always)]
    fn bind<'a>(self, gc: NoGcScope<'a, '_>) -> Self::Of<'a> {
        self.map(|t| t.bind(gc))
    }
}

// SAFETY: The elements are Bindable.
unsafe impl<T: Bindable> Bindable for Vec<T> {
    type Of<'a> = Vec<T::Of<'a>>;

    fn unbind(self) -> Self::Of<'static> {
        self.into_iter().map(T::unbind).collect()
    }

    fn bind<'a>(self, gc: NoGcScope<'a, '_>) -> Self::Of<'a> {
        self.into_iter().map(|t| t.bind(gc)).collect()
    }
}

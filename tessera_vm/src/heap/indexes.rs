// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::fmt::Debug;
use std::{
    hash::{Hash, Hasher},
    marker::PhantomData,
    mem::size_of,
    num::NonZeroU32,
};

use crate::{
    ecmascript::{
        builtins::{
            ArrayBufferHeapData, ArrayHeapData, FunctionHeapData, error::ErrorHeapData,
            indexed_collections::array_objects::array_iterator_objects::ArrayIteratorHeapData,
            typed_array::TypedArrayHeapData,
        },
        types::{BigIntHeapData, ObjectHeapData, StringHeapData},
    },
    engine::context::GcToken,
};

/// A struct containing a non-zero index into an array or
/// vector of `T`s. Due to the non-zero value, the offset
/// in the vector is offset by one.
///
/// The `'a` lifetime brands the index to the garbage collector scope it was
/// bound to.
pub struct BaseIndex<'a, T: ?Sized>(NonZeroU32, PhantomData<T>, PhantomData<&'a GcToken>);

const _INDEX_SIZE_IS_U32: () = assert!(size_of::<BaseIndex<()>>() == size_of::<u32>());
const _OPTION_INDEX_SIZE_IS_U32: () =
    assert!(size_of::<Option<BaseIndex<()>>>() == size_of::<u32>());

impl<T: ?Sized> Debug for BaseIndex<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        (self.0.get() - 1).fmt(f)
    }
}

impl<T: ?Sized> Clone for BaseIndex<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for BaseIndex<'_, T> {}

impl<T: ?Sized> PartialEq for BaseIndex<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: ?Sized> Eq for BaseIndex<'_, T> {}

impl<T: ?Sized> Hash for BaseIndex<'_, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T: ?Sized> BaseIndex<'_, T> {
    pub const fn into_index(self) -> usize {
        self.0.get() as usize - 1
    }

    pub const fn into_u32_index(self) -> u32 {
        self.0.get() - 1
    }

    pub const fn from_index(value: usize) -> Self {
        assert!(value < u32::MAX as usize);
        let value = value as u32;
        // SAFETY: Number is not max value and will not overflow to zero.
        // This check is done manually to allow const context.
        Self(
            unsafe { NonZeroU32::new_unchecked(value + 1) },
            PhantomData,
            PhantomData,
        )
    }

    /// Index of the most recently pushed entry.
    pub fn last<U: Sized>(vec: &[U]) -> Self {
        assert!(!vec.is_empty());
        Self::from_index(vec.len() - 1)
    }
}

pub type ArrayIndex<'a> = BaseIndex<'a, ArrayHeapData>;
pub type ArrayBufferIndex<'a> = BaseIndex<'a, ArrayBufferHeapData>;
pub type ArrayIteratorIndex<'a> = BaseIndex<'a, ArrayIteratorHeapData>;
pub type BigIntIndex<'a> = BaseIndex<'a, BigIntHeapData>;
pub type ErrorIndex<'a> = BaseIndex<'a, ErrorHeapData>;
pub type FunctionIndex<'a> = BaseIndex<'a, FunctionHeapData>;
pub type ObjectIndex<'a> = BaseIndex<'a, ObjectHeapData>;
pub type StringIndex<'a> = BaseIndex<'a, StringHeapData>;
pub type TypedArrayIndex<'a> = BaseIndex<'a, TypedArrayHeapData>;
